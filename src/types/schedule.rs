use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Persisted state of the periodic-action schedule.
///
/// `next_deadline` is meaningful only while `enabled`. When `action_count`
/// reaches `max_actions` the schedule must be disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
    pub enabled: bool,
    pub next_deadline: DateTime<Utc>,
    pub action_count: u32,
    pub max_actions: u32,
}

impl ScheduleState {
    pub fn stopped(max_actions: u32) -> Self {
        Self {
            enabled: false,
            next_deadline: DateTime::<Utc>::UNIX_EPOCH,
            action_count: 0,
            max_actions,
        }
    }

    /// Time left until the deadline; negative when the deadline has passed.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.next_deadline.signed_duration_since(now)
    }

    pub fn is_exhausted(&self) -> bool {
        self.action_count >= self.max_actions
    }
}
