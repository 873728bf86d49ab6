//! Supervised server instance
//!
//! The supervisor task owns the lifecycle: it binds a fresh socket, hands it to
//! a [`Worker`], and rebinds after any transport failure. Whatever command was
//! in flight at that point is lost.

use super::worker::Worker;
use crate::config::HostConfig;
use crate::transport::{DatagramChannel, UdpChannel};
use anyhow::{anyhow, Result};
use jarnet_shared::{Lifecycle, LifecycleEvent, ServerState, TransitionResult};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Handle to a running server instance
pub struct ServerInstance {
    shutdown_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<ServerState>,
    task: JoinHandle<()>,
}

impl ServerInstance {
    /// Create a new instance and start its supervisor loop
    pub fn start(config: HostConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(ServerState::Created);

        let task = tokio::spawn(async move {
            supervise(config, shutdown_rx, state_tx).await;
        });

        Self {
            shutdown_tx,
            state_rx,
            task,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServerState {
        *self.state_rx.borrow()
    }

    /// Wait until the instance is listening and return the bound address
    pub async fn listening_addr(&self) -> Result<SocketAddr> {
        let mut state_rx = self.state_rx.clone();
        let state = *state_rx
            .wait_for(|s| matches!(s, ServerState::Listening { .. } | ServerState::Closed))
            .await
            .map_err(|_| anyhow!("server instance is gone"))?;

        match state {
            ServerState::Listening { addr } => Ok(addr),
            _ => Err(anyhow!("server instance closed")),
        }
    }

    /// Close the socket and stop the instance, abandoning any in-flight command
    pub async fn close(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!("Server task ended abnormally: {}", e);
        }
    }
}

/// Bind, serve, rebind on failure, until shutdown
async fn supervise(
    config: HostConfig,
    mut shutdown_rx: watch::Receiver<bool>,
    state_tx: watch::Sender<ServerState>,
) {
    let mut lifecycle = Lifecycle::new();

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let outcome = tokio::select! {
            _ = shutdown_rx.changed() => break,
            outcome = run_once(&config, &mut lifecycle, &state_tx) => outcome,
        };

        if let Err(e) = outcome {
            error!("Listener failed: {:#}", e);
            transition(&mut lifecycle, &state_tx, LifecycleEvent::TransportFailed);
            warn!(
                "Restarting listener in {:?} (restart #{})",
                config.restart_delay,
                lifecycle.restarts()
            );

            tokio::select! {
                _ = shutdown_rx.changed() => break,
                _ = tokio::time::sleep(config.restart_delay) => {}
            }
        }
    }

    // Socket and in-flight command futures were dropped with the select arm
    transition(&mut lifecycle, &state_tx, LifecycleEvent::CloseRequested);
    info!("Server instance closed");
}

/// One listening session on a freshly bound socket
async fn run_once(
    config: &HostConfig,
    lifecycle: &mut Lifecycle,
    state_tx: &watch::Sender<ServerState>,
) -> Result<()> {
    let channel = Arc::new(UdpChannel::bind(config.bind_addr).await?);
    let addr = channel.local_addr()?;

    transition(lifecycle, state_tx, LifecycleEvent::Bound(addr));
    info!("Listening for commands on {}", addr);

    Worker::new(channel, config).serve().await
}

fn transition(lifecycle: &mut Lifecycle, state_tx: &watch::Sender<ServerState>, event: LifecycleEvent) {
    match lifecycle.process_event(event) {
        TransitionResult::Success(state) => {
            debug!("Server state -> {:?}", state);
            let _ = state_tx.send(state);
        }
        TransitionResult::Invalid { from, event } => {
            warn!("Ignoring {:?} in state {:?}", event, from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn test_config(dir: &tempfile::TempDir, peer: &UdpChannel) -> HostConfig {
        let data_port = peer.local_addr().unwrap().port();
        HostConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            peer: crate::config::PeerConfig {
                ip: "127.0.0.1".parse().unwrap(),
                data_port,
                message_port: data_port,
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

    #[tokio::test]
    async fn test_start_ping_close() {
        let dir = tempfile::tempdir().unwrap();
        let client = UdpChannel::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let instance = ServerInstance::start(test_config(&dir, &client));

        let addr = instance.listening_addr().await.unwrap();
        assert!(matches!(instance.state(), ServerState::Listening { .. }));
        assert_eq!(ping(&client, addr).await.unwrap(), b"recibido");

        instance.close().await;
        // Port is free again once closed
        assert!(UdpChannel::bind(addr).await.is_ok());
    }

    #[tokio::test]
    async fn test_close_abandons_pending_upload() {
        let dir = tempfile::tempdir().unwrap();
        let client = UdpChannel::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let config = test_config(&dir, &client);
        let instance = ServerInstance::start(config.clone());
        let addr = instance.listening_addr().await.unwrap();

        // Body never arrives; the worker blocks in the upload receive
        client.send_to(b"late.jar&4:", addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        timeout(Duration::from_secs(2), instance.close())
            .await
            .expect("close must not wait for the upload body");

        let stored = std::fs::read(config.store_dir.join("late.jar")).unwrap_or_default();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_bind_failure_keeps_retrying_until_closed() {
        let dir = tempfile::tempdir().unwrap();
        let client = UdpChannel::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let squatter = UdpChannel::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();

        let config = HostConfig {
            bind_addr: squatter.local_addr().unwrap(),
            ..test_config(&dir, &client)
        };
        let instance = ServerInstance::start(config);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(instance.state(), ServerState::Recovering);

        // Freeing the port lets the supervisor bind on a later attempt
        let port_addr = squatter.local_addr().unwrap();
        drop(squatter);
        let addr = timeout(Duration::from_secs(2), instance.listening_addr())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(addr, port_addr);

        instance.close().await;
    }
}
