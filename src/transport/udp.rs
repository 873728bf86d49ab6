//! UDP transport implementation
//!
//! A datagram longer than the receive buffer is cut to the buffer length and
//! the rest is dropped. That holds on Unix only. On Windows `recv_from` fails
//! with `WSAEMSGSIZE` instead, so an oversized command ends the listening
//! session and the supervisor rebinds; the command is lost either way.

use crate::transport::traits::DatagramChannel;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// UDP socket wrapper implementing DatagramChannel
pub struct UdpChannel {
    inner: UdpSocket,
}

impl UdpChannel {
    /// Bind a new channel; port 0 picks an ephemeral port
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let inner = UdpSocket::bind(addr)
            .await
            .with_context(|| format!("failed to bind UDP socket on {}", addr))?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl DatagramChannel for UdpChannel {
    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        let received = self.inner.recv_from(buf).await.context("UDP receive failed")?;
        Ok(received)
    }

    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()> {
        self.inner
            .send_to(data, target)
            .await
            .with_context(|| format!("UDP send to {} failed", target))?;
        Ok(())
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn test_send_and_receive() {
        let a = UdpChannel::bind(loopback()).await.unwrap();
        let b = UdpChannel::bind(loopback()).await.unwrap();

        a.send_to(b"hello", b.local_addr().unwrap()).await.unwrap();

        let mut buf = [0u8; 64];
        let (n, from) = b.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello");
        assert_eq!(from, a.local_addr().unwrap());
    }

    // Windows reports WSAEMSGSIZE here instead of truncating
    #[cfg(unix)]
    #[tokio::test]
    async fn test_oversized_datagram_is_truncated() {
        let a = UdpChannel::bind(loopback()).await.unwrap();
        let b = UdpChannel::bind(loopback()).await.unwrap();

        a.send_to(&[7u8; 32], b.local_addr().unwrap()).await.unwrap();

        let mut buf = [0u8; 8];
        let (n, _) = b.recv(&mut buf).await.unwrap();
        assert_eq!(n, 8);
        assert_eq!(buf, [7u8; 8]);
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let a = UdpChannel::bind(loopback()).await.unwrap();
        let taken = a.local_addr().unwrap();
        assert!(UdpChannel::bind(taken).await.is_err());
    }
}
