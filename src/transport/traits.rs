//! Transport trait abstraction for the datagram channel

use anyhow::Result;
use async_trait::async_trait;
use std::net::SocketAddr;

/// A bound, packet-oriented channel
#[async_trait]
pub trait DatagramChannel: Send + Sync + 'static {
    /// Block until one datagram arrives; bytes beyond `buf` are dropped
    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)>;

    /// Send one datagram to `target`
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()>;

    /// Address the channel is bound to
    fn local_addr(&self) -> Result<SocketAddr>;
}
