//! Execute handler
//!
//! Packages are launched with the configured launcher and left running on
//! their own: no sandbox, no working directory isolation, no output capture,
//! no exit tracking. Anyone who can reach the command port can run any stored
//! package.

use super::HandlerContext;
use crate::command::CommandResult;
use crate::config::LauncherConfig;
use crate::transport::DatagramChannel;
use jarnet_shared::messages;
use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

/// Handle an execute request; replies as soon as the process has spawned
pub async fn handle_execute<C: DatagramChannel>(
    ctx: &HandlerContext<'_, C>,
    file_name: &str,
) -> CommandResult {
    let path = match ctx.store.package_path(file_name).await {
        Ok(path) => path,
        Err(e) => {
            warn!("  [EXECUTE] {}: {}", file_name, e);
            return CommandResult::Failed {
                message: messages::EXECUTE_FAILED.into(),
            };
        }
    };

    match spawn_detached(ctx.launcher, &path) {
        Ok(pid) => {
            info!("Launched {} (pid {:?})", path.display(), pid);
            CommandResult::Completed {
                message: messages::executed(file_name),
            }
        }
        Err(e) => {
            warn!("  [EXECUTE] launcher {:?} failed: {}", ctx.launcher.program, e);
            CommandResult::Failed {
                message: messages::EXECUTE_FAILED.into(),
            }
        }
    }
}

/// Start `launcher <args> <path>` without keeping a handle to it
fn spawn_detached(launcher: &LauncherConfig, path: &Path) -> io::Result<Option<u32>> {
    let child = Command::new(&launcher.program)
        .args(&launcher.args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Dropping the handle leaves the process running; tokio reaps it
    Ok(child.id())
}
