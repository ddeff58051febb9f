use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::providers::SurfaceOwnershipNotifier;
use crate::storage::{keys, StoreHandle};
use crate::types::{Role, ScheduleState};

use super::LeaseManager;

/// Low-frequency loop that keeps this agent's claims alive and picks up
/// roles whose owner disappeared without cleanup.
///
/// Each tick renews currently owned roles, always competes for the
/// surface role, and competes for the driver role only while the
/// persisted schedule is enabled: an abandoned driver matters only when
/// there is a periodic task to drive. Surface ownership edges are
/// reported to the notifier so the rendering collaborator can show or
/// hide its UI.
pub struct LeaseMonitor {
    leases: Arc<LeaseManager>,
    store: StoreHandle,
    notifier: Arc<dyn SurfaceOwnershipNotifier>,
    tick: Duration,
    shutdown: Arc<Notify>,
}

impl LeaseMonitor {
    pub fn new(
        leases: Arc<LeaseManager>,
        store: StoreHandle,
        notifier: Arc<dyn SurfaceOwnershipNotifier>,
        tick: Duration,
    ) -> Self {
        Self {
            leases,
            store,
            notifier,
            tick,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle for requesting a cooperative stop of [`run`](Self::run).
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// One renew/reclaim pass. Returns whether this agent owns the
    /// surface role afterwards; the caller tracks the previous value to
    /// detect edges.
    pub fn tick_once(&self, owned_surface: bool) -> bool {
        for role in [Role::Driver, Role::SurfaceOwner] {
            if self.leases.is_owner(role) {
                self.leases.renew(role);
            }
        }

        let owns_surface = self.leases.reclaim_if_unclaimed(Role::SurfaceOwner);
        if owns_surface && !owned_surface {
            self.notifier.gained();
        } else if !owns_surface && owned_surface {
            self.notifier.lost();
        }

        let schedule: ScheduleState = self
            .store
            .get_or(keys::SCHEDULE, ScheduleState::stopped(0));
        if schedule.enabled {
            self.leases.reclaim_if_unclaimed(Role::Driver);
        }

        owns_surface
    }

    /// Run until shutdown is requested, then release owned roles.
    pub async fn run(self) {
        let mut owned_surface = false;
        loop {
            owned_surface = self.tick_once(owned_surface);
            tokio::select! {
                _ = tokio::time::sleep(self.tick) => {}
                _ = self.shutdown.notified() => break,
            }
        }

        if owned_surface {
            self.notifier.lost();
        }
        self.leases.release(Role::SurfaceOwner);
        self.leases.release(Role::Driver);
        log::debug!("lease monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::providers::{Clock, ManualClock};
    use crate::storage::InMemoryStore;
    use crate::types::AgentIdentity;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingNotifier {
        gained: AtomicUsize,
        lost: AtomicUsize,
    }

    impl SurfaceOwnershipNotifier for CountingNotifier {
        fn gained(&self) {
            self.gained.fetch_add(1, Ordering::SeqCst);
        }

        fn lost(&self) {
            self.lost.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn monitor_for(
        store: &StoreHandle,
        clock: &Arc<ManualClock>,
        notifier: Arc<CountingNotifier>,
    ) -> (LeaseMonitor, Arc<LeaseManager>) {
        let config = Config::default();
        let leases = Arc::new(LeaseManager::new(
            store.clone(),
            AgentIdentity::generate(),
            clock.clone() as Arc<dyn Clock>,
            &config,
        ));
        let monitor = LeaseMonitor::new(
            leases.clone(),
            store.clone(),
            notifier,
            config.monitor_tick(),
        );
        (monitor, leases)
    }

    #[test]
    fn test_first_tick_claims_surface_and_notifies_once() {
        let store = StoreHandle::new(Arc::new(InMemoryStore::new()));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let notifier = Arc::new(CountingNotifier::default());
        let (monitor, leases) = monitor_for(&store, &clock, notifier.clone());

        let mut owned = false;
        owned = monitor.tick_once(owned);
        owned = monitor.tick_once(owned);
        assert!(owned);
        assert!(leases.is_owner(Role::SurfaceOwner));
        assert_eq!(notifier.gained.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.lost.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_driver_not_reclaimed_while_schedule_disabled() {
        let store = StoreHandle::new(Arc::new(InMemoryStore::new()));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let notifier = Arc::new(CountingNotifier::default());
        let (monitor, leases) = monitor_for(&store, &clock, notifier);

        monitor.tick_once(false);
        assert!(!leases.is_owner(Role::Driver));

        let mut schedule = ScheduleState::stopped(30);
        schedule.enabled = true;
        schedule.next_deadline = clock.now();
        store.put(keys::SCHEDULE, &schedule);

        monitor.tick_once(true);
        assert!(leases.is_owner(Role::Driver));
    }

    #[test]
    fn test_losing_surface_to_a_fresher_owner_notifies_lost() {
        let store = StoreHandle::new(Arc::new(InMemoryStore::new()));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let notifier = Arc::new(CountingNotifier::default());
        let (monitor, _leases) = monitor_for(&store, &clock, notifier.clone());

        let mut owned = monitor.tick_once(false);
        assert!(owned);

        // Another agent overwrote the lease (racing claim, last writer
        // wins); our next tick observes the loss.
        let other = AgentIdentity::generate();
        store.put(
            Role::SurfaceOwner.store_key(),
            &crate::types::Lease::claimed_by(other, clock.now()),
        );

        owned = monitor.tick_once(owned);
        assert!(!owned);
        assert_eq!(notifier.lost.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_and_releases_roles() {
        let store = StoreHandle::new(Arc::new(InMemoryStore::new()));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let notifier = Arc::new(CountingNotifier::default());
        let (monitor, leases) = monitor_for(&store, &clock, notifier);

        let shutdown = monitor.shutdown_handle();
        let handle = tokio::spawn(monitor.run());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(leases.is_owner(Role::SurfaceOwner));

        shutdown.notify_one();
        handle.await.unwrap();
        assert!(!leases.is_owner(Role::SurfaceOwner));
    }
}
