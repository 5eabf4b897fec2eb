//! Message processing pipeline.
//!
//! All inbound messages from the active channel flow through:
//! 1. `Channel::start()` — channel-specific I/O
//! 2. `SignalProcessor::process()` — extraction and validation
//! 3. Sinks — API dispatch, then the JSON-lines backup log
//!
//! Rejected messages go nowhere.

pub mod processor;

pub use processor::{ProcessOutcome, ProcessStats, ProcessorDeps, SignalProcessor};
