//! Load balancer collaborator trait.
//!
//! Only the `clear` contract is consumed here: routing entries for a system
//! must be withdrawn before its containers are torn down, so traffic is
//! never directed at dying containers.

use crate::error::Result;
use crate::system::System;
use async_trait::async_trait;

/// Routing table maintenance capability.
#[async_trait]
pub trait Balancer: Send + Sync {
    /// Remove every routing entry pointing at `system`.
    async fn clear(&self, system: &dyn System) -> Result<()>;
}
