//! Reply sender for the known client address
//!
//! Acks and catalogs go to the peer's data port, text status goes to its
//! message port. Clients depend on that split.

use crate::config::PeerConfig;
use crate::transport::DatagramChannel;
use anyhow::Result;
use jarnet_shared::{codec, literals, StatusReply};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ReplySender<C: DatagramChannel> {
    channel: Arc<C>,
    peer: PeerConfig,
}

impl<C: DatagramChannel> ReplySender<C> {
    pub fn new(channel: Arc<C>, peer: PeerConfig) -> Self {
        Self { channel, peer }
    }

    /// Send an informational line to the message port
    pub async fn send_status(&self, text: &str) {
        self.send_reply(&StatusReply::Info(text.to_string())).await;
    }

    /// Send an error line (prefixed with the error marker) to the message port
    pub async fn send_error(&self, text: &str) {
        self.send_reply(&StatusReply::Error(text.to_string())).await;
    }

    async fn send_reply(&self, reply: &StatusReply) {
        let target = self.peer.message_addr();
        let rendered = reply.render();
        debug!("Status to {}: {}", target, rendered);

        if let Err(e) = self.channel.send_to(rendered.as_bytes(), target).await {
            warn!("Failed to send status to {}: {:#}", target, e);
        }
    }

    /// Answer a liveness check on the data port
    pub async fn send_ack(&self) {
        let target = self.peer.data_addr();
        if let Err(e) = self.channel.send_to(literals::STATUS_ACK, target).await {
            warn!("Failed to send ack to {}: {:#}", target, e);
        }
    }

    /// Send the encoded catalog to the data port as one datagram
    pub async fn send_catalog(&self, packages: &[String]) -> Result<()> {
        let encoded = codec::encode_catalog(packages)?;
        self.channel.send_to(&encoded, self.peer.data_addr()).await?;
        debug!("Catalog of {} packages sent ({} bytes)", packages.len(), encoded.len());
        Ok(())
    }
}
