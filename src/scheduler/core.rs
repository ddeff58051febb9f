use std::sync::Arc;

use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::config::Config;
use crate::coordination::LeaseManager;
use crate::generator::ContentGenerator;
use crate::providers::{Action, Clock, ReadinessCheck};
use crate::storage::{keys, StoreHandle};
use crate::types::{Role, ScheduleState};

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The injected readiness check refused; surfaced to the caller and
    /// not retried automatically.
    #[error("target application is not ready")]
    NotReady,
    /// Starting requires the driver lease to already be held.
    #[error("driver lease is not held by this agent")]
    NotDriver,
}

/// Outcome of a deadline firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePhase {
    /// Action performed, next deadline drawn and persisted.
    Rescheduled,
    /// Another agent owns the driver role; nothing was done.
    Suspended,
    /// The schedule is disabled (count limit reached or explicit stop).
    Stopped,
}

/// What the scheduling loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// Schedule disabled; nothing to arm.
    Idle,
    /// Deadline is in the future; wait exactly this long.
    Wait(std::time::Duration),
    /// Deadline had already passed; the firing ran immediately.
    Fired(SchedulePhase),
}

/// Periodic-action state machine. Deadlines and counters live in the
/// shared store, so any agent holding the driver lease can pick the
/// schedule up exactly where the previous driver left it.
///
/// All waiting is the caller's job ([`SchedulerRunner`] in production);
/// this type only computes transitions against the injected clock.
///
/// [`SchedulerRunner`]: crate::scheduler::SchedulerRunner
pub struct SchedulerCore {
    store: StoreHandle,
    leases: Arc<LeaseManager>,
    generator: ContentGenerator,
    action: Arc<dyn Action>,
    readiness: Arc<dyn ReadinessCheck>,
    clock: Arc<dyn Clock>,
    config: Config,
    rng: StdRng,
}

impl SchedulerCore {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: StoreHandle,
        leases: Arc<LeaseManager>,
        generator: ContentGenerator,
        action: Arc<dyn Action>,
        readiness: Arc<dyn ReadinessCheck>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Self {
        Self::with_rng(
            store,
            leases,
            generator,
            action,
            readiness,
            clock,
            config,
            StdRng::from_entropy(),
        )
    }

    /// Like [`new`](Self::new) with a caller-supplied RNG for
    /// deterministic interval and content draws.
    #[allow(clippy::too_many_arguments)]
    pub fn with_rng(
        store: StoreHandle,
        leases: Arc<LeaseManager>,
        generator: ContentGenerator,
        action: Arc<dyn Action>,
        readiness: Arc<dyn ReadinessCheck>,
        clock: Arc<dyn Clock>,
        config: Config,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            leases,
            generator,
            action,
            readiness,
            clock,
            config,
            rng,
        }
    }

    pub fn current_state(&self) -> ScheduleState {
        self.store
            .get_or(keys::SCHEDULE, ScheduleState::stopped(self.config.max_actions))
    }

    fn persist(&self, state: &ScheduleState) {
        self.store.put(keys::SCHEDULE, state);
    }

    /// Uniform integer seconds in `[min_interval, max_interval]`
    /// inclusive, re-drawn before every firing.
    fn random_interval(&mut self) -> Duration {
        let secs = self
            .rng
            .gen_range(self.config.min_interval_secs..=self.config.max_interval_secs);
        Duration::seconds(secs as i64)
    }

    /// Begin a fresh run. The caller must already hold the driver lease.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if !self.readiness.is_ready() {
            return Err(SchedulerError::NotReady);
        }
        if !self.leases.is_owner(Role::Driver) {
            return Err(SchedulerError::NotDriver);
        }

        let deadline = self.clock.now() + self.random_interval();
        let state = ScheduleState {
            enabled: true,
            next_deadline: deadline,
            action_count: 0,
            max_actions: self.config.max_actions,
        };
        self.persist(&state);
        log::info!("schedule started, first action at {}", deadline);
        Ok(())
    }

    /// Disable the schedule and give up the driver role.
    pub fn stop(&mut self) {
        let mut state = self.current_state();
        state.enabled = false;
        self.persist(&state);
        self.leases.release(Role::Driver);
        log::info!("schedule stopped after {} actions", state.action_count);
    }

    /// Fire the periodic action for an elapsed deadline.
    ///
    /// Ownership is re-checked on entry and once more right before the
    /// externally visible effect, narrowing the race window to a single
    /// store round trip. Losing the role is not an error: another agent
    /// is presumed to be driving and this one suspends silently.
    pub async fn on_deadline_elapsed(&mut self) -> SchedulePhase {
        let mut state = self.current_state();
        if !state.enabled {
            return SchedulePhase::Stopped;
        }
        if !self.leases.is_owner(Role::Driver) {
            log::debug!("driver role lost; suspending");
            return SchedulePhase::Suspended;
        }

        let item = self.generator.generate(&mut self.rng);

        if !self.leases.is_owner(Role::Driver) {
            log::debug!("driver role lost before acting; suspending");
            return SchedulePhase::Suspended;
        }
        if let Err(e) = self.action.perform(&item).await {
            log::warn!("action failed for {:?}: {:#}; continuing", item, e);
        }

        state.action_count += 1;
        self.persist(&state);
        log::info!(
            "performed action {}/{} for: {}",
            state.action_count,
            state.max_actions,
            item
        );

        if state.is_exhausted() {
            state.enabled = false;
            self.persist(&state);
            self.leases.release(Role::Driver);
            log::info!("action limit reached; schedule stopped");
            return SchedulePhase::Stopped;
        }

        state.next_deadline = self.clock.now() + self.random_interval();
        self.persist(&state);
        SchedulePhase::Rescheduled
    }

    /// Recompute what to do from persisted state, typically after a
    /// process (re)start or at the top of the scheduling loop. A missed
    /// deadline is caught up immediately rather than skipped or
    /// double-scheduled.
    pub async fn resume(&mut self) -> Resume {
        let state = self.current_state();
        if !state.enabled {
            return Resume::Idle;
        }

        let remaining = state.remaining(self.clock.now());
        if remaining <= Duration::zero() {
            Resume::Fired(self.on_deadline_elapsed().await)
        } else {
            Resume::Wait(remaining.to_std().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ContentTemplate;
    use crate::providers::ManualClock;
    use crate::storage::InMemoryStore;
    use crate::types::{AgentIdentity, Lease};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAction {
        items: Mutex<Vec<String>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl Action for RecordingAction {
        async fn perform(&self, item: &str) -> anyhow::Result<()> {
            self.items.lock().unwrap().push(item.to_string());
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("target rejected the action"));
            }
            Ok(())
        }
    }

    struct Readiness(bool);

    impl ReadinessCheck for Readiness {
        fn is_ready(&self) -> bool {
            self.0
        }
    }

    struct Fixture {
        store: StoreHandle,
        clock: Arc<ManualClock>,
        leases: Arc<LeaseManager>,
        action: Arc<RecordingAction>,
    }

    fn fixture(config: &Config, ready: bool) -> (Fixture, SchedulerCore) {
        let store = StoreHandle::new(Arc::new(InMemoryStore::new()));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let leases = Arc::new(LeaseManager::new(
            store.clone(),
            AgentIdentity::generate(),
            clock.clone() as Arc<dyn Clock>,
            config,
        ));
        let action = Arc::new(RecordingAction::default());
        let generator = ContentGenerator::new(
            store.clone(),
            ContentTemplate::builtin(),
            config.max_history,
            config.max_generate_attempts,
        );
        let core = SchedulerCore::with_rng(
            store.clone(),
            leases.clone(),
            generator,
            action.clone(),
            Arc::new(Readiness(ready)),
            clock.clone() as Arc<dyn Clock>,
            config.clone(),
            StdRng::seed_from_u64(99),
        );
        (
            Fixture {
                store,
                clock,
                leases,
                action,
            },
            core,
        )
    }

    fn one_second_config(max_actions: u32) -> Config {
        Config {
            min_interval_secs: 1,
            max_interval_secs: 1,
            max_actions,
            ..Config::default()
        }
    }

    #[test]
    fn test_start_refused_when_not_ready() {
        let (fx, mut core) = fixture(&one_second_config(3), false);
        assert!(fx.leases.try_claim(Role::Driver));
        assert!(matches!(core.start(), Err(SchedulerError::NotReady)));
        assert!(!core.current_state().enabled);
    }

    #[test]
    fn test_start_requires_driver_lease() {
        let (_fx, mut core) = fixture(&one_second_config(3), true);
        assert!(matches!(core.start(), Err(SchedulerError::NotDriver)));
    }

    #[test]
    fn test_start_persists_jittered_deadline() {
        let config = Config {
            min_interval_secs: 15,
            max_interval_secs: 40,
            ..Config::default()
        };
        let (fx, mut core) = fixture(&config, true);
        assert!(fx.leases.try_claim(Role::Driver));
        core.start().unwrap();

        let state = core.current_state();
        assert!(state.enabled);
        assert_eq!(state.action_count, 0);
        let gap = state.next_deadline.signed_duration_since(fx.clock.now());
        assert!(gap >= Duration::seconds(15) && gap <= Duration::seconds(40));
    }

    #[tokio::test]
    async fn test_runs_to_the_action_limit_and_releases_driver() {
        let (fx, mut core) = fixture(&one_second_config(3), true);
        assert!(fx.leases.try_claim(Role::Driver));
        core.start().unwrap();

        for expected in 1..=3u32 {
            fx.clock.advance(Duration::seconds(1));
            let step = core.resume().await;
            let state = core.current_state();
            assert_eq!(state.action_count, expected);
            if expected < 3 {
                assert_eq!(step, Resume::Fired(SchedulePhase::Rescheduled));
            } else {
                assert_eq!(step, Resume::Fired(SchedulePhase::Stopped));
            }
        }

        let state = core.current_state();
        assert!(!state.enabled);
        assert_eq!(fx.action.items.lock().unwrap().len(), 3);
        assert!(!fx.leases.is_owner(Role::Driver));
    }

    #[tokio::test]
    async fn test_suspends_silently_when_driver_is_lost() {
        let (fx, mut core) = fixture(&one_second_config(3), true);
        assert!(fx.leases.try_claim(Role::Driver));
        core.start().unwrap();

        let other = AgentIdentity::generate();
        fx.store.put(
            Role::Driver.store_key(),
            &Lease::claimed_by(other, fx.clock.now()),
        );

        fx.clock.advance(Duration::seconds(1));
        assert_eq!(core.resume().await, Resume::Fired(SchedulePhase::Suspended));
        assert!(fx.action.items.lock().unwrap().is_empty());
        assert_eq!(core.current_state().action_count, 0);
    }

    #[tokio::test]
    async fn test_action_failure_is_recoverable() {
        let (fx, mut core) = fixture(&one_second_config(3), true);
        assert!(fx.leases.try_claim(Role::Driver));
        core.start().unwrap();
        fx.action.fail.store(true, Ordering::SeqCst);

        fx.clock.advance(Duration::seconds(1));
        assert_eq!(
            core.resume().await,
            Resume::Fired(SchedulePhase::Rescheduled)
        );

        let state = core.current_state();
        assert!(state.enabled);
        assert_eq!(state.action_count, 1);
        assert!(state.next_deadline > fx.clock.now());
    }

    #[tokio::test]
    async fn test_resume_waits_exactly_the_remaining_time() {
        let (fx, mut core) = fixture(&one_second_config(3), true);
        assert!(fx.leases.try_claim(Role::Driver));
        core.start().unwrap();

        match core.resume().await {
            Resume::Wait(remaining) => {
                assert_eq!(remaining, std::time::Duration::from_secs(1));
            }
            other => panic!("expected a wait, got {:?}", other),
        }
        assert!(fx.action.items.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resume_is_idle_while_disabled() {
        let (_fx, mut core) = fixture(&one_second_config(3), true);
        assert_eq!(core.resume().await, Resume::Idle);
    }

    #[tokio::test]
    async fn test_stop_disables_and_releases() {
        let (fx, mut core) = fixture(&one_second_config(3), true);
        assert!(fx.leases.try_claim(Role::Driver));
        core.start().unwrap();

        core.stop();
        assert!(!core.current_state().enabled);
        assert!(!fx.leases.is_owner(Role::Driver));
        assert_eq!(core.resume().await, Resume::Idle);
    }
}
