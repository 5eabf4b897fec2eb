//! Destinations for accepted signals.

pub mod api;
pub mod log;

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::signal::SignalRecord;

pub use api::ApiDispatcher;
pub use log::SignalLog;

/// Something an accepted signal is handed to.
#[async_trait]
pub trait SignalSink: Send + Sync {
    /// Sink name for logs.
    fn name(&self) -> &str;

    /// Deliver one record. `Ok(false)` means the sink was reached but declined
    /// the record; `Err` means it could not be reached at all.
    async fn deliver(&self, record: &SignalRecord) -> Result<bool, DispatchError>;
}
