pub mod leases;
pub mod monitor;

pub use leases::LeaseManager;
pub use monitor::LeaseMonitor;
