//! Handshake handler and catalog publishing

use super::HandlerContext;
use crate::command::CommandResult;
use crate::store::StoreError;
use crate::transport::DatagramChannel;
use jarnet_shared::{literals, messages};
use tracing::{info, warn};

/// Handle the handshake: catalog first, then the connected confirmation
pub async fn handle_handshake<C: DatagramChannel>(ctx: &HandlerContext<'_, C>) -> CommandResult {
    publish_catalog(ctx).await;
    CommandResult::Completed {
        message: literals::CONNECTED.into(),
    }
}

/// Rescan the store and send the catalog to the client.
///
/// Exactly one catalog datagram is attempted; store failures are reported on
/// the message port and an empty catalog goes out instead.
pub async fn publish_catalog<C: DatagramChannel>(ctx: &HandlerContext<'_, C>) {
    let packages = match ctx.store.list().await {
        Ok(packages) => packages,
        Err(StoreError::CreateDir(e)) => {
            warn!("Failed to create package store: {}", e);
            ctx.reply
                .send_error(&format!("{}{}", messages::STORE_CREATE_FAILED, e))
                .await;
            Vec::new()
        }
        Err(e) => {
            warn!("Failed to list package store: {}", e);
            ctx.reply
                .send_error(&format!("{}{}", messages::STORE_LIST_FAILED, e))
                .await;
            Vec::new()
        }
    };

    match ctx.reply.send_catalog(&packages).await {
        Ok(()) => info!(
            "Catalog published: {} packages in {}",
            packages.len(),
            ctx.store.root().display()
        ),
        Err(e) => {
            warn!("Failed to send catalog: {:#}", e);
            ctx.reply
                .send_error(&format!("{}{:#}", messages::CATALOG_SEND_FAILED, e))
                .await;
        }
    }
}
