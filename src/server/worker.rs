//! Listening worker: receive, classify, dispatch, one command at a time

use crate::command::CommandExecutor;
use crate::config::HostConfig;
use crate::transport::DatagramChannel;
use anyhow::{Context, Result};
use jarnet_shared::{limits, Command};
use std::sync::Arc;
use tracing::debug;

/// Owns the command channel for one listening session
pub struct Worker<C: DatagramChannel> {
    channel: Arc<C>,
    executor: CommandExecutor<C>,
}

impl<C: DatagramChannel> Worker<C> {
    pub fn new(channel: Arc<C>, config: &HostConfig) -> Self {
        Self {
            executor: CommandExecutor::new(channel.clone(), config),
            channel,
        }
    }

    /// Serve commands until the channel fails.
    ///
    /// Only transport errors end the loop; command failures are answered and
    /// the loop keeps going.
    pub async fn serve(&self) -> Result<()> {
        let mut buf = vec![0u8; limits::MAX_COMMAND_DATAGRAM];

        loop {
            let (n, from) = self
                .channel
                .recv(&mut buf)
                .await
                .context("command receive failed")?;
            debug!("Datagram of {} bytes from {}", n, from);

            match Command::from_datagram(&buf[..n]) {
                Ok(command) => {
                    self.executor.execute(&command).await;
                }
                Err(e) => self.executor.report_protocol_error(&e).await,
            }
        }
    }
}
