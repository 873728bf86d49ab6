//! Host configuration

use jarnet_shared::{literals, ports};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Where replies go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerConfig {
    /// Client address (one active peer at a time)
    pub ip: IpAddr,
    /// Port for acks and catalogs
    pub data_port: u16,
    /// Port for text status messages
    pub message_port: u16,
}

impl PeerConfig {
    pub fn data_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.data_port)
    }

    pub fn message_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.message_port)
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            data_port: ports::CLIENT_DATA_PORT,
            message_port: ports::CLIENT_MESSAGE_PORT,
        }
    }
}

/// External program used to start a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub program: String,
    /// Arguments placed before the package path
    pub args: Vec<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            program: "java".into(),
            args: vec!["-jar".into()],
        }
    }
}

/// Configuration for the package host
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Command socket address
    pub bind_addr: SocketAddr,
    /// Reply destination
    pub peer: PeerConfig,
    /// Restart signal socket address
    pub control_addr: SocketAddr,
    /// Package store directory
    pub store_dir: PathBuf,
    /// Package launcher
    pub launcher: LauncherConfig,
    /// Pause before the supervisor rebinds after a failure
    pub restart_delay: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), ports::HOST_COMMAND_PORT),
            peer: PeerConfig::default(),
            control_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), ports::CONTROL_PORT),
            store_dir: cwd.join(literals::STORE_DIR),
            launcher: LauncherConfig::default(),
            restart_delay: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HostConfig::default();
        assert_eq!(config.bind_addr.port(), 4213);
        assert_eq!(config.control_addr.port(), 5431);
        assert!(config.store_dir.ends_with("jars"));
        assert_eq!(config.launcher.program, "java");
        assert_eq!(config.launcher.args, vec!["-jar".to_string()]);
    }

    #[test]
    fn test_peer_addresses() {
        let peer = PeerConfig::default();
        assert_eq!(peer.data_addr(), "127.0.0.1:3198".parse().unwrap());
        assert_eq!(peer.message_addr(), "127.0.0.1:108".parse().unwrap());
    }
}
