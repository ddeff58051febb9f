use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::storage::{keys, StoreHandle};
use crate::types::{Lease, ScheduleState};

/// Snapshot of everything the coordination layer persists, for status
/// display and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationStatus {
    pub driver: Lease,
    pub surface: Lease,
    pub schedule: ScheduleState,
    pub history_len: usize,
    pub diagnostics: bool,
}

pub fn status(store: &StoreHandle, config: &Config) -> CoordinationStatus {
    let history: Vec<String> = store.get_or(keys::HISTORY, Vec::new());
    CoordinationStatus {
        driver: store.get_or(keys::DRIVER_LEASE, Lease::default()),
        surface: store.get_or(keys::SURFACE_LEASE, Lease::default()),
        schedule: store.get_or(keys::SCHEDULE, ScheduleState::stopped(config.max_actions)),
        history_len: history.len(),
        diagnostics: diagnostics_enabled(store),
    }
}

/// Clear every coordination key back to its default. Any agent may invoke
/// this; running agents observe the reset on their next poll.
pub fn reset_coordination(store: &StoreHandle, config: &Config) {
    store.put(keys::DRIVER_LEASE, &Lease::default());
    store.put(keys::SURFACE_LEASE, &Lease::default());
    store.put(keys::SCHEDULE, &ScheduleState::stopped(config.max_actions));
    store.put(keys::HISTORY, &Vec::<String>::new());
    store.put(keys::DIAGNOSTICS, &false);
    log::info!("coordination state reset");
}

/// Forget the deduplication window without touching leases or schedule.
pub fn clear_history(store: &StoreHandle) {
    store.put(keys::HISTORY, &Vec::<String>::new());
    log::info!("content history cleared");
}

pub fn diagnostics_enabled(store: &StoreHandle) -> bool {
    store.get_or(keys::DIAGNOSTICS, false)
}

/// Flip the persisted diagnostics flag; returns the new value.
pub fn toggle_diagnostics(store: &StoreHandle) -> bool {
    let enabled = !diagnostics_enabled(store);
    store.put(keys::DIAGNOSTICS, &enabled);
    enabled
}

/// Enable the schedule from outside the driving process. The current
/// driver (or whichever agent reclaims the role) picks the state up on
/// its next poll; the first deadline carries the same jitter a local
/// start would draw.
pub fn enable_schedule<R: Rng>(
    store: &StoreHandle,
    config: &Config,
    now: DateTime<Utc>,
    rng: &mut R,
) -> ScheduleState {
    let secs = rng.gen_range(config.min_interval_secs..=config.max_interval_secs);
    let state = ScheduleState {
        enabled: true,
        next_deadline: now + Duration::seconds(secs as i64),
        action_count: 0,
        max_actions: config.max_actions,
    };
    store.put(keys::SCHEDULE, &state);
    state
}

/// Disable the schedule from outside the driving process. The driver
/// observes the flag on its next firing and suspends.
pub fn disable_schedule(store: &StoreHandle, config: &Config) -> ScheduleState {
    let mut state: ScheduleState =
        store.get_or(keys::SCHEDULE, ScheduleState::stopped(config.max_actions));
    state.enabled = false;
    store.put(keys::SCHEDULE, &state);
    state
}
