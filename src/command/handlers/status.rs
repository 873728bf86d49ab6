//! Status ping handler

use super::HandlerContext;
use crate::command::CommandResult;
use crate::transport::DatagramChannel;

/// Handle the liveness check: fixed ack on the data port, nothing else
pub async fn handle_status_ping<C: DatagramChannel>(ctx: &HandlerContext<'_, C>) -> CommandResult {
    ctx.reply.send_ack().await;
    CommandResult::Replied
}
