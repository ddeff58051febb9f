pub mod lease;
pub mod schedule;

pub use lease::{Lease, Role};
pub use schedule::ScheduleState;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque per-process identity, written as the owner value in leases.
///
/// Generated once at startup and discarded on termination. Two processes
/// never share an identity, so a lease record always names at most one
/// live owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentIdentity(Uuid);

impl AgentIdentity {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
