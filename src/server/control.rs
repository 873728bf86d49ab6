//! Out-of-band restart trigger
//!
//! A separate socket accepts the restart literal. On receipt the current
//! instance is closed (its socket released first) and a new one is started.

use super::instance::ServerInstance;
use crate::config::HostConfig;
use crate::transport::{DatagramChannel, UdpChannel};
use anyhow::{Context, Result};
use jarnet_shared::{limits, literals};
use tracing::{debug, info};

/// Whether a control datagram asks for a restart
pub fn is_restart_signal(data: &[u8]) -> bool {
    data == literals::RESTART.as_bytes()
}

/// Owns the running instance and replaces it on demand
pub struct Supervisor {
    config: HostConfig,
    current: Option<ServerInstance>,
    generation: u32,
}

impl Supervisor {
    pub fn start(config: HostConfig) -> Self {
        let current = ServerInstance::start(config.clone());
        Self {
            config,
            current: Some(current),
            generation: 0,
        }
    }

    pub fn current(&self) -> Option<&ServerInstance> {
        self.current.as_ref()
    }

    /// How many times the instance was replaced
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Close the running instance and start a fresh one
    pub async fn restart(&mut self) {
        // The old socket must be released before the new instance binds
        if let Some(old) = self.current.take() {
            old.close().await;
        }
        self.current = Some(ServerInstance::start(self.config.clone()));
        self.generation += 1;
        info!("Server instance restarted (generation {})", self.generation);
    }

    pub async fn shutdown(mut self) {
        if let Some(current) = self.current.take() {
            current.close().await;
        }
    }
}

/// Listens on the control port for restart signals
pub struct ControlListener {
    channel: UdpChannel,
}

impl ControlListener {
    pub async fn bind(config: &HostConfig) -> Result<Self> {
        let channel = UdpChannel::bind(config.control_addr)
            .await
            .context("control listener bind failed")?;
        Ok(Self { channel })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.channel.local_addr()
    }

    /// Handle control datagrams forever; returns only on a socket error
    pub async fn run(&self, supervisor: &mut Supervisor) -> Result<()> {
        let mut buf = vec![0u8; limits::MAX_COMMAND_DATAGRAM];
        loop {
            let (n, from) = self.channel.recv(&mut buf).await?;
            if is_restart_signal(&buf[..n]) {
                info!(
                    "Restart requested by {} (generation {})",
                    from,
                    supervisor.generation()
                );
                supervisor.restart().await;
            } else {
                debug!("Ignoring {} byte control datagram from {}", n, from);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::time::timeout;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    fn test_config(dir: &tempfile::TempDir, client: &UdpChannel) -> HostConfig {
        let port = client.local_addr().unwrap().port();
        HostConfig {
            bind_addr: loopback(),
            control_addr: loopback(),
            peer: crate::config::PeerConfig {
                ip: "127.0.0.1".parse().unwrap(),
                data_port: port,
                message_port: port,
            },
            store_dir: dir.path().join("jars"),
            restart_delay: Duration::from_millis(20),
            ..Default::default()
        }
    }

    async fn ping(client: &UdpChannel, host: SocketAddr) -> Option<Vec<u8>> {
        client.send_to(b"Estado conexion", host).await.unwrap();
        let mut buf = [0u8; 64];
        match timeout(Duration::from_millis(500), client.recv(&mut buf)).await {
            Ok(Ok((n, _))) => Some(buf[..n].to_vec()),
            _ => None,
        }
    }

    #[test]
    fn test_restart_signal() {
        assert!(is_restart_signal(b"Reiniciar"));
        assert!(!is_restart_signal(b"Reiniciar\n"));
        assert!(!is_restart_signal(b"R"));
        assert!(!is_restart_signal(b""));
    }

    #[tokio::test]
    async fn test_restart_replaces_instance() {
        let dir = tempfile::tempdir().unwrap();
        let client = UdpChannel::bind(loopback()).await.unwrap();
        let mut supervisor = Supervisor::start(test_config(&dir, &client));

        let first = supervisor.current().unwrap().listening_addr().await.unwrap();
        assert_eq!(ping(&client, first).await.unwrap(), b"recibido");

        supervisor.restart().await;
        assert_eq!(supervisor.generation(), 1);

        let second = supervisor.current().unwrap().listening_addr().await.unwrap();
        assert_eq!(ping(&client, second).await.unwrap(), b"recibido");

        supervisor.shutdown().await;
    }

    #[tokio::test]
    async fn test_control_signal_discards_in_flight_command() {
        let dir = tempfile::tempdir().unwrap();
        let client = UdpChannel::bind(loopback()).await.unwrap();
        let config = test_config(&dir, &client);
        let mut supervisor = Supervisor::start(config.clone());
        let listener = ControlListener::bind(&config).await.unwrap();
        let control = listener.local_addr().unwrap();

        let first = supervisor.current().unwrap().listening_addr().await.unwrap();
        // Upload announced, body never sent: the instance is stuck waiting
        client.send_to(b"stuck.jar&8:", first).await.unwrap();

        client.send_to(b"something else", control).await.unwrap();
        client.send_to(b"Reiniciar", control).await.unwrap();

        // The listener never returns on its own; give it time to act
        let _ = timeout(Duration::from_millis(500), listener.run(&mut supervisor)).await;
        assert_eq!(supervisor.generation(), 1);

        let second = supervisor.current().unwrap().listening_addr().await.unwrap();
        assert_eq!(ping(&client, second).await.unwrap(), b"recibido");

        let stored = std::fs::read(config.store_dir.join("stuck.jar")).unwrap_or_default();
        assert!(stored.is_empty());

        supervisor.shutdown().await;
    }
}
