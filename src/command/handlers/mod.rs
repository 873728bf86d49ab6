//! Command handlers for the four command kinds

mod execute;
mod handshake;
mod status;
mod upload;

pub use execute::handle_execute;
pub use handshake::{handle_handshake, publish_catalog};
pub use status::handle_status_ping;
pub use upload::handle_upload;

use crate::config::LauncherConfig;
use crate::reply::ReplySender;
use crate::store::PackageStore;
use crate::transport::DatagramChannel;

/// Context passed to command handlers
pub struct HandlerContext<'a, C: DatagramChannel> {
    /// Command socket, for the upload body receive
    pub channel: &'a C,
    pub reply: &'a ReplySender<C>,
    pub store: &'a PackageStore,
    pub launcher: &'a LauncherConfig,
}
