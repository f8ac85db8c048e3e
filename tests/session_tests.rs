#[cfg(test)]
mod session_tests {
    use std::io::Write;
    use std::net::Ipv4Addr;

    use tempfile::NamedTempFile;

    use routesim::commands::{self, Command};
    use routesim::error::NetworkError;
    use routesim::registry::NetworkRegistry;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    const TOPOLOGY: &str = r#"
graph
    subgraph 192.168.1.0/24
        Router1[192.168.1.1]
        PC1[192.168.1.2]
        PC2[192.168.1.3]
        Router1 <-->|2| PC1
        PC1 <-->|3| PC2
    end
    subgraph 10.0.0.0/24
        Router2[10.0.0.1]
        Server1[10.0.0.2]
        Server1 <-->|4| Router2
    end
    Router1 <--> Router2
"#;

    fn run(registry: &mut NetworkRegistry, line: &str) -> Result<String, NetworkError> {
        let command = commands::parse(line)?.expect("blank command line");
        commands::execute(registry, command)
    }

    fn loaded_session() -> NetworkRegistry {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", TOPOLOGY).unwrap();

        let mut registry = NetworkRegistry::new();
        let line = format!("load network {}", file.path().display());
        run(&mut registry, &line).unwrap();
        registry
    }

    #[test]
    fn test_load_and_list() {
        let mut registry = loaded_session();
        assert_eq!(
            run(&mut registry, "list subnets").unwrap(),
            "10.0.0.0/24 192.168.1.0/24"
        );
        assert_eq!(
            run(&mut registry, "list range 192.168.1.0/24").unwrap(),
            "192.168.1.0 192.168.1.255"
        );
        assert_eq!(
            run(&mut registry, "list systems 10.0.0.0/24").unwrap(),
            "10.0.0.1 10.0.0.2"
        );
    }

    #[test]
    fn test_load_missing_file_reports_error() {
        let mut registry = NetworkRegistry::new();
        let result = run(&mut registry, "load network /nonexistent/topo.txt");
        assert!(matches!(result, Err(NetworkError::Parse { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_send_packet_within_subnet() {
        let mut registry = loaded_session();
        assert_eq!(
            run(&mut registry, "send packet 192.168.1.3 192.168.1.1").unwrap(),
            "packet path: 192.168.1.3 192.168.1.2 192.168.1.1"
        );
    }

    #[test]
    fn test_send_packet_across_subnets() {
        let mut registry = loaded_session();
        assert_eq!(
            run(&mut registry, "send packet 192.168.1.3 10.0.0.2").unwrap(),
            "packet path: 192.168.1.3 192.168.1.2 192.168.1.1 10.0.0.1 10.0.0.2"
        );
    }

    #[test]
    fn test_add_computer_and_route_to_it() {
        let mut registry = loaded_session();
        run(&mut registry, "add computer 192.168.1.0/24 192.168.1.9").unwrap();
        run(&mut registry, "add connection 192.168.1.9 192.168.1.1 6").unwrap();
        assert_eq!(
            run(&mut registry, "send packet 10.0.0.2 192.168.1.9").unwrap(),
            "packet path: 10.0.0.2 10.0.0.1 192.168.1.1 192.168.1.9"
        );
    }

    #[test]
    fn test_remove_connection_breaks_route() {
        let mut registry = loaded_session();
        run(&mut registry, "remove connection 192.168.1.1 10.0.0.1").unwrap();
        let result = run(&mut registry, "send packet 192.168.1.2 10.0.0.2");
        assert!(matches!(result, Err(NetworkError::NoPathFound { .. })));
    }

    #[test]
    fn test_inter_subnet_connection_between_hosts_is_rejected() {
        let mut registry = loaded_session();
        let result = run(&mut registry, "add connection 192.168.1.2 10.0.0.2 3");
        assert_eq!(result, Err(NetworkError::ConnectionTypeMismatch));
        // session continues: the registry still answers queries
        assert!(run(&mut registry, "list subnets").is_ok());
    }

    #[test]
    fn test_unknown_address_in_send() {
        let mut registry = loaded_session();
        let result = run(&mut registry, "send packet 192.168.1.2 172.16.0.5");
        assert_eq!(result, Err(NetworkError::SubnetNotFound(ip("172.16.0.5"))));
    }

    #[test]
    fn test_error_messages_render() {
        let mut registry = loaded_session();
        let err = run(&mut registry, "remove computer 192.168.1.0 192.168.1.1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot remove router 192.168.1.1 from its subnet"
        );

        let err = run(&mut registry, "send packet 192.168.1.300 10.0.0.2").unwrap_err();
        assert_eq!(err.to_string(), "invalid IPv4 address '192.168.1.300'");
    }

    #[test]
    fn test_quit_parses() {
        assert_eq!(commands::parse("quit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_reload_replaces_topology() {
        let mut registry = loaded_session();
        run(&mut registry, "add computer 192.168.1.0 192.168.1.50").unwrap();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", TOPOLOGY).unwrap();
        run(&mut registry, &format!("load network {}", file.path().display())).unwrap();

        // the ad-hoc host is gone after the reload
        let systems = registry.list_systems(ip("192.168.1.0")).unwrap();
        assert!(!systems.contains(&ip("192.168.1.50")));
    }
}
