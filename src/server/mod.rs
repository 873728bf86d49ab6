//! Server lifecycle for the command endpoint
//!
//! This module handles:
//! - The listening worker (receive, classify, dispatch)
//! - Supervised instances that rebind after transport failures
//! - The restart control listener that swaps instances

mod control;
mod instance;
mod worker;

pub use control::{ControlListener, Supervisor};
