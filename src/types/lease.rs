use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::AgentIdentity;

use crate::storage::keys;

/// The two distinguished roles agents compete for. At most one agent at a
/// time should hold each for any sustained interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Drives the periodic background task.
    Driver,
    /// Owns the visible control surface.
    SurfaceOwner,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Driver => "Driver",
            Role::SurfaceOwner => "SurfaceOwner",
        }
    }

    /// Store key the lease record for this role is persisted under.
    pub fn store_key(&self) -> &'static str {
        match self {
            Role::Driver => keys::DRIVER_LEASE,
            Role::SurfaceOwner => keys::SURFACE_LEASE,
        }
    }
}

/// A claim record on a role. `owner == None` means unclaimed.
///
/// `last_renewed_at` is monotonically non-decreasing while one owner holds
/// the role; a record older than the role's TTL is stale and eligible for
/// reclamation by any agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    pub owner: Option<AgentIdentity>,
    pub last_renewed_at: DateTime<Utc>,
}

impl Lease {
    pub fn claimed_by(owner: AgentIdentity, now: DateTime<Utc>) -> Self {
        Self {
            owner: Some(owner),
            last_renewed_at: now,
        }
    }

    pub fn is_unclaimed(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_held_by(&self, identity: AgentIdentity) -> bool {
        self.owner == Some(identity)
    }

    /// Staleness is strictly greater-than: a lease renewed exactly `ttl`
    /// ago is still live.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.last_renewed_at) > ttl
    }
}

impl Default for Lease {
    fn default() -> Self {
        Self {
            owner: None,
            last_renewed_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}
