pub mod config;
pub mod coordination;
pub mod generator;
pub mod ops;
pub mod providers;
pub mod scheduler;
pub mod storage;
pub mod types;

pub use config::Config;
pub use types::*;
