use anyhow::Result;
use async_trait::async_trait;

/// The externally visible periodic effect, performed once per firing with
/// a freshly generated item. Failures are recoverable: the scheduler logs
/// them and keeps its cadence.
#[async_trait]
pub trait Action: Send + Sync {
    async fn perform(&self, item: &str) -> Result<()>;
}

/// Default action: log the item and do nothing else. Hosts that drive a
/// real target application install their own implementation.
pub struct LogAction;

#[async_trait]
impl Action for LogAction {
    async fn perform(&self, item: &str) -> Result<()> {
        log::info!("action fired: {}", item);
        Ok(())
    }
}
