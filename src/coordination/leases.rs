use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::providers::Clock;
use crate::storage::StoreHandle;
use crate::types::{AgentIdentity, Lease, Role};

/// Claim, renew, release and reclaim the two coordinated roles on behalf
/// of one agent.
///
/// Ownership is a derived fact, re-evaluated on every check against the
/// shared store; no standing leader designation exists anywhere. The
/// claim path reads then writes without any cross-process atomicity, so
/// two agents can both pass the staleness check in the same interval and
/// both record themselves as owner. The protocol accepts this: renewals
/// keep overwriting, last writer wins within a cycle, and callers act on
/// a role only immediately after an ownership check.
pub struct LeaseManager {
    store: StoreHandle,
    identity: AgentIdentity,
    clock: Arc<dyn Clock>,
    driver_ttl: Duration,
    surface_ttl: Duration,
}

impl LeaseManager {
    pub fn new(
        store: StoreHandle,
        identity: AgentIdentity,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            identity,
            clock,
            driver_ttl: config.driver_ttl(),
            surface_ttl: config.surface_ttl(),
        }
    }

    pub fn identity(&self) -> AgentIdentity {
        self.identity
    }

    pub fn ttl(&self, role: Role) -> Duration {
        match role {
            Role::Driver => self.driver_ttl,
            Role::SurfaceOwner => self.surface_ttl,
        }
    }

    pub fn current(&self, role: Role) -> Lease {
        self.store.get_or(role.store_key(), Lease::default())
    }

    /// Claim the role if it is unclaimed, already ours, or stale.
    /// Returns whether this agent is the recorded owner afterwards.
    pub fn try_claim(&self, role: Role) -> bool {
        let now = self.clock.now();
        let lease = self.current(role);
        let claimable = lease.is_unclaimed()
            || lease.is_held_by(self.identity)
            || lease.is_stale(now, self.ttl(role));
        if claimable {
            self.store
                .put(role.store_key(), &Lease::claimed_by(self.identity, now));
            log::debug!("{} claimed {}", self.identity, role.as_str());
        }
        claimable
    }

    /// Refresh our claim timestamp. A no-op unless the store currently
    /// records this agent as owner. Must run at an interval well under
    /// the role's TTL so a live owner is never misclassified as stale.
    pub fn renew(&self, role: Role) {
        let lease = self.current(role);
        if lease.is_held_by(self.identity) {
            self.store
                .put(role.store_key(), &Lease::claimed_by(self.identity, self.clock.now()));
        }
    }

    /// Clear our claim. Best effort only: an agent that dies without
    /// releasing is handled by staleness reclamation, which is the
    /// primary liveness mechanism rather than an optimization.
    pub fn release(&self, role: Role) {
        let lease = self.current(role);
        if lease.is_held_by(self.identity) {
            self.store.put(
                role.store_key(),
                &Lease {
                    owner: None,
                    last_renewed_at: self.clock.now(),
                },
            );
            log::debug!("{} released {}", self.identity, role.as_str());
        }
    }

    pub fn is_owner(&self, role: Role) -> bool {
        self.current(role).is_held_by(self.identity)
    }

    /// Claim an abandoned role: attempts `try_claim` only when the lease
    /// is unclaimed or stale. Returns whether this agent owns the role
    /// after the call, so a surviving agent eventually repopulates a role
    /// whose owner disappeared without cleanup.
    pub fn reclaim_if_unclaimed(&self, role: Role) -> bool {
        let now = self.clock.now();
        let lease = self.current(role);
        if lease.is_unclaimed() || lease.is_stale(now, self.ttl(role)) {
            self.try_claim(role)
        } else {
            lease.is_held_by(self.identity)
        }
    }
}
