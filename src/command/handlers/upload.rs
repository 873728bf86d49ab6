//! Upload handler
//!
//! The body must fit in the single datagram that follows the request; there is
//! no reassembly. A shorter datagram writes fewer bytes, a longer one is cut at
//! the declared size. That datagram is consumed even when the request is
//! rejected, so a body is never mistaken for a command.

use super::HandlerContext;
use crate::command::CommandResult;
use crate::transport::DatagramChannel;
use anyhow::Result;
use jarnet_shared::{limits, messages};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Handle an upload request, blocking until the body datagram arrives
pub async fn handle_upload<C: DatagramChannel>(
    ctx: &HandlerContext<'_, C>,
    file_name: &str,
    declared_size: u64,
) -> CommandResult {
    debug!("  [UPLOAD] {} ({} bytes declared)", file_name, declared_size);

    match store_next_datagram(ctx, file_name, declared_size).await {
        Ok(written) => {
            if written as u64 != declared_size {
                warn!(
                    "  [UPLOAD] {}: declared {} bytes, stored {}",
                    file_name, declared_size, written
                );
            }
            info!("Stored {} bytes into {}", written, file_name);
            CommandResult::Completed {
                message: messages::UPLOAD_STORED.into(),
            }
        }
        Err(e) => {
            warn!("  [UPLOAD] {} failed: {:#}", file_name, e);
            CommandResult::Failed {
                message: messages::upload_failed(format_args!("{:#}", e)),
            }
        }
    }
}

async fn store_next_datagram<C: DatagramChannel>(
    ctx: &HandlerContext<'_, C>,
    file_name: &str,
    declared_size: u64,
) -> Result<usize> {
    // The file exists (possibly empty) before the body shows up
    let file = ctx.store.open_append(file_name).await;

    let mut buf = vec![0u8; limits::upload_buffer_len(declared_size)];
    let (n, from) = ctx.channel.recv(&mut buf).await?;
    debug!("  [UPLOAD] body of {} bytes from {}", n, from);

    let mut file = file?;
    file.write_all(&buf[..n]).await?;
    file.flush().await?;
    Ok(n)
}
