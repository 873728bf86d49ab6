//! Command executor - dispatches classified commands and sends the outcome

use super::handlers::{self, HandlerContext};
use crate::config::{HostConfig, LauncherConfig};
use crate::reply::ReplySender;
use crate::store::PackageStore;
use crate::transport::DatagramChannel;
use jarnet_shared::{literals, messages, Command, ProtocolError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Succeeded; the message goes to the client's message port
    Completed { message: String },
    /// Failed; the message goes out with the error marker
    Failed { message: String },
    /// The handler already answered on the data port
    Replied,
}

/// Executes commands received from the client
pub struct CommandExecutor<C: DatagramChannel> {
    channel: Arc<C>,
    reply: ReplySender<C>,
    store: PackageStore,
    launcher: LauncherConfig,
}

impl<C: DatagramChannel> CommandExecutor<C> {
    /// Create a new command executor on the given command channel
    pub fn new(channel: Arc<C>, config: &HostConfig) -> Self {
        Self {
            reply: ReplySender::new(channel.clone(), config.peer),
            channel,
            store: PackageStore::new(config.store_dir.clone(), literals::PACKAGE_EXTENSION),
            launcher: config.launcher.clone(),
        }
    }

    fn context(&self) -> HandlerContext<'_, C> {
        HandlerContext {
            channel: self.channel.as_ref(),
            reply: &self.reply,
            store: &self.store,
            launcher: &self.launcher,
        }
    }

    /// Execute a command and send its replies
    pub async fn execute(&self, command: &Command) -> CommandResult {
        let started = Instant::now();
        debug!("Executing command: {:?}", command);

        let ctx = self.context();
        let result = match command {
            Command::StatusPing => handlers::handle_status_ping(&ctx).await,
            Command::Handshake => handlers::handle_handshake(&ctx).await,
            Command::Upload {
                file_name,
                declared_size,
            } => handlers::handle_upload(&ctx, file_name, *declared_size).await,
            Command::Execute { file_name } => handlers::handle_execute(&ctx, file_name).await,
        };

        match &result {
            CommandResult::Completed { message } => {
                info!("Command {} completed: {}", command.kind(), message);
                self.reply.send_status(message).await;
            }
            CommandResult::Failed { message } => {
                warn!("Command {} failed: {}", command.kind(), message);
                self.reply.send_error(message).await;
            }
            CommandResult::Replied => {}
        }

        // A stored upload changes the catalog
        if matches!(command, Command::Upload { .. })
            && matches!(result, CommandResult::Completed { .. })
        {
            handlers::publish_catalog(&ctx).await;
        }

        debug!("Command {} took {:?}", command.kind(), started.elapsed());
        result
    }

    /// Tell the client about a malformed command; unrecognized ones stay silent.
    ///
    /// A malformed upload request still owns the next datagram, which is
    /// received and discarded before the error goes out.
    pub async fn report_protocol_error(&self, error: &ProtocolError) {
        if !error.is_reportable() {
            debug!("Dropping unrecognized datagram");
            return;
        }

        warn!("Malformed command: {}", error);
        if let Some(len) = error.pending_body_len() {
            self.discard_next_datagram(len).await;
        }
        self.reply.send_error(&messages::upload_failed(error)).await;
    }

    async fn discard_next_datagram(&self, len: usize) {
        let mut buf = vec![0u8; len];
        match self.channel.recv(&mut buf).await {
            Ok((n, from)) => debug!("Discarded {} byte upload body from {}", n, from),
            Err(e) => warn!("Failed to receive rejected upload body: {:#}", e),
        }
    }
}
