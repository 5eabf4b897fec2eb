//! Signal Listener — turns broadcast chat posts into structured trading signals.

pub mod channels;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod signal;
pub mod sinks;
