//! Command execution infrastructure for the package host
//!
//! This module handles:
//! - Dispatching classified commands to their handlers
//! - Turning handler results into status replies
//! - Republishing the catalog after a stored upload

mod executor;
pub mod handlers;

pub use executor::{CommandExecutor, CommandResult};
