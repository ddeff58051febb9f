pub mod core;
pub mod runner;

pub use self::core::{Resume, SchedulePhase, SchedulerCore, SchedulerError};
pub use runner::SchedulerRunner;
