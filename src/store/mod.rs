//! Package store on the local filesystem
//!
//! This module handles:
//! - Listing packages for the catalog (pure directory scan, no cached list)
//! - Creating the hidden store directory on first use
//! - Opening upload targets and resolving packages to launch

mod package_store;

pub use package_store::{PackageStore, StoreError};
