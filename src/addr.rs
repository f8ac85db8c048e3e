//! IPv4 address arithmetic.
//!
//! Dotted-quad parsing plus the prefix-mask operations the subnet model is
//! built on: containment checks and broadcast (last address) computation.

use std::net::Ipv4Addr;

use crate::error::NetworkError;

/// Parse a strict dotted-quad IPv4 address.
///
/// Accepts exactly four dot-separated decimal octets in 0..=255. Anything
/// else (missing octets, out-of-range values, stray characters) is an
/// `AddressFormat` error.
pub fn parse_ipv4(input: &str) -> Result<Ipv4Addr, NetworkError> {
    let reject = || NetworkError::AddressFormat(input.to_string());
    let mut octets = [0u8; 4];
    let mut parts = input.split('.');

    for octet in octets.iter_mut() {
        let part = parts.next().ok_or_else(reject)?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(reject());
        }
        *octet = part.parse().map_err(|_| reject())?;
    }
    if parts.next().is_some() {
        return Err(reject());
    }

    Ok(Ipv4Addr::from(octets))
}

/// Parse a `base/prefix` CIDR expression
pub fn parse_cidr(input: &str) -> Result<(Ipv4Addr, u8), NetworkError> {
    let (base_part, prefix_part) = input
        .split_once('/')
        .ok_or_else(|| NetworkError::AddressFormat(input.to_string()))?;
    let base = parse_ipv4(base_part)?;
    let prefix_len: u8 = prefix_part
        .parse()
        .map_err(|_| NetworkError::AddressFormat(input.to_string()))?;
    if prefix_len > 32 {
        return Err(NetworkError::PrefixLength(prefix_len));
    }
    Ok((base, prefix_len))
}

/// Network mask for a prefix length: `prefix_len` leading one-bits.
///
/// `/0` masks nothing and therefore matches every address; `/32` matches
/// only the exact address.
pub fn mask(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        len => u32::MAX << (32 - u32::from(len.min(32))),
    }
}

/// True when `addr` falls inside `base/<prefix_len>`
pub fn contains(base: Ipv4Addr, prefix_len: u8, addr: Ipv4Addr) -> bool {
    let m = mask(prefix_len);
    u32::from(base) & m == u32::from(addr) & m
}

/// Last (broadcast) address of `base/<prefix_len>`.
///
/// The base address with every host bit set, filled in byte-wise from the
/// least significant octet upward.
pub fn last_address(base: Ipv4Addr, prefix_len: u8) -> Ipv4Addr {
    let mut octets = base.octets();
    let mut host_bits = 32u8.saturating_sub(prefix_len);

    for octet in octets.iter_mut().rev() {
        if host_bits == 0 {
            break;
        }
        let bits = host_bits.min(8);
        *octet |= ((1u16 << bits) - 1) as u8;
        host_bits -= bits;
    }

    Ipv4Addr::from(octets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_addresses() {
        assert_eq!(
            parse_ipv4("192.168.1.1").unwrap(),
            Ipv4Addr::new(192, 168, 1, 1)
        );
        assert_eq!(parse_ipv4("0.0.0.0").unwrap(), Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(
            parse_ipv4("255.255.255.255").unwrap(),
            Ipv4Addr::new(255, 255, 255, 255)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        let invalid = [
            "",
            "192.168.1",
            "192.168.1.1.5",
            "256.1.1.1",
            "192.168.1.256",
            "a.b.c.d",
            "192.168..1",
            "192.168.1.1 ",
            "1921.6.8.1",
        ];
        for input in invalid {
            assert!(
                matches!(parse_ipv4(input), Err(NetworkError::AddressFormat(_))),
                "input '{}' should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_parse_cidr() {
        let (base, prefix_len) = parse_cidr("10.0.0.0/24").unwrap();
        assert_eq!(base, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(prefix_len, 24);

        assert!(parse_cidr("10.0.0.0").is_err());
        assert!(parse_cidr("10.0.0.0/33").is_err());
        assert!(parse_cidr("10.0.0/24").is_err());
    }

    #[test]
    fn test_mask_values() {
        assert_eq!(mask(0), 0);
        assert_eq!(mask(8), 0xFF00_0000);
        assert_eq!(mask(24), 0xFFFF_FF00);
        assert_eq!(mask(32), 0xFFFF_FFFF);
    }

    #[test]
    fn test_contains() {
        let base = Ipv4Addr::new(192, 168, 1, 0);
        assert!(contains(base, 24, Ipv4Addr::new(192, 168, 1, 200)));
        assert!(!contains(base, 24, Ipv4Addr::new(192, 168, 2, 1)));
        // /0 matches everything, /32 only the exact address
        assert!(contains(base, 0, Ipv4Addr::new(8, 8, 8, 8)));
        assert!(contains(base, 32, base));
        assert!(!contains(base, 32, Ipv4Addr::new(192, 168, 1, 1)));
    }

    #[test]
    fn test_last_address() {
        assert_eq!(
            last_address(Ipv4Addr::new(192, 168, 1, 0), 24),
            Ipv4Addr::new(192, 168, 1, 255)
        );
        assert_eq!(
            last_address(Ipv4Addr::new(10, 0, 0, 0), 16),
            Ipv4Addr::new(10, 0, 255, 255)
        );
        assert_eq!(
            last_address(Ipv4Addr::new(172, 16, 0, 16), 28),
            Ipv4Addr::new(172, 16, 0, 31)
        );
        assert_eq!(
            last_address(Ipv4Addr::new(1, 2, 3, 4), 32),
            Ipv4Addr::new(1, 2, 3, 4)
        );
        assert_eq!(
            last_address(Ipv4Addr::new(0, 0, 0, 0), 0),
            Ipv4Addr::new(255, 255, 255, 255)
        );
    }
}
