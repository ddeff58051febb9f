pub mod action;
pub mod clock;
pub mod notify;
pub mod readiness;

pub use action::{Action, LogAction};
pub use clock::{Clock, ManualClock, SystemClock};
pub use notify::{LogNotifier, SurfaceOwnershipNotifier};
pub use readiness::{AlwaysReady, ReadinessCheck};
