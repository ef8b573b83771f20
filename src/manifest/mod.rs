//! Manifest factory collaborator trait.
//!
//! The mount resolver needs one thing from the manifest layer: a throwaway
//! helper system (from the shared manifest) to run remote-asset fetches in.

use crate::error::Result;
use crate::system::System;
use std::sync::Arc;

/// Factory for systems declared in a manifest.
pub trait Manifest: Send + Sync {
    /// Build the system named `name`. With `throwaway` set the system is
    /// not registered anywhere and exists only for one-shot runs.
    fn system(&self, name: &str, throwaway: bool) -> Result<Arc<dyn System>>;
}
