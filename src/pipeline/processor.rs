//! Signal processor — runs every inbound message through extract → validate →
//! dispatch.
//!
//! Flow per message:
//! 1. `extract()` builds a `SignalRecord` (never fails)
//! 2. `is_actionable()` accepts or rejects it
//! 3. Accepted records go to the API dispatcher, then to the backup log,
//!    whatever the dispatcher said
//!
//! Sink failures are logged and never stop the loop.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, error, info, warn};

use crate::channels::{IncomingMessage, MessageStream};
use crate::signal::{SignalExtractor, SignalRecord};
use crate::sinks::SignalSink;

/// Maximum characters of a message shown in logs.
const PREVIEW_CHARS: usize = 200;

/// Collaborators the processor hands accepted signals to.
#[derive(Clone)]
pub struct ProcessorDeps {
    /// HTTP endpoint dispatcher.
    pub dispatcher: Arc<dyn SignalSink>,
    /// Append-only backup log.
    pub log: Arc<dyn SignalSink>,
}

/// What happened to one message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Not a signal. Nothing was sent anywhere.
    Rejected,
    /// A signal. `dispatched` is the endpoint's `success` flag (false on
    /// transport failure), `logged` whether the backup line was written.
    Accepted {
        record: SignalRecord,
        dispatched: bool,
        logged: bool,
    },
}

impl ProcessOutcome {
    /// Whether the message was a signal, whatever the sinks did with it.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Running totals kept by [`SignalProcessor::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStats {
    pub received: usize,
    pub accepted: usize,
    pub dispatched: usize,
}

/// Drives messages through the extraction core and into the sinks.
pub struct SignalProcessor {
    extractor: SignalExtractor,
    deps: ProcessorDeps,
}

impl SignalProcessor {
    /// Processor with the built-in extraction rules.
    pub fn new(deps: ProcessorDeps) -> Self {
        Self::with_extractor(SignalExtractor::default_rules(), deps)
    }

    pub fn with_extractor(extractor: SignalExtractor, deps: ProcessorDeps) -> Self {
        Self { extractor, deps }
    }

    /// Process one message.
    pub async fn process(&self, message: &IncomingMessage) -> ProcessOutcome {
        info!(
            id = %message.id,
            channel = %message.channel,
            received_at = %message.received_at,
            preview = %preview(&message.content),
            "New message"
        );

        let record = self.extractor.extract(&message.content);

        if !record.is_actionable() {
            debug!(id = %message.id, "Not a valid trading signal");
            return ProcessOutcome::Rejected;
        }

        info!(
            symbol = record.symbol.as_deref().unwrap_or_default(),
            direction = %record.direction,
            entry = ?record.entry_price,
            targets = ?record.target_prices,
            stop_loss = ?record.stop_loss,
            "Valid signal detected"
        );

        let dispatched = match self.deps.dispatcher.deliver(&record).await {
            Ok(true) => {
                info!(sink = self.deps.dispatcher.name(), "Signal sent successfully");
                true
            }
            Ok(false) => {
                warn!(sink = self.deps.dispatcher.name(), "Signal was not accepted");
                false
            }
            Err(e) => {
                error!(sink = self.deps.dispatcher.name(), error = %e, "Failed to send signal");
                false
            }
        };

        let logged = match self.deps.log.deliver(&record).await {
            Ok(written) => written,
            Err(e) => {
                error!(sink = self.deps.log.name(), error = %e, "Failed to log signal");
                false
            }
        };

        ProcessOutcome::Accepted {
            record,
            dispatched,
            logged,
        }
    }

    /// Consume a message stream until it ends or Ctrl+C is received.
    pub async fn run(&self, mut stream: MessageStream) -> ProcessStats {
        let mut stats = ProcessStats::default();

        info!("Listening for signals...");

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            info!("Message stream ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            stats.received += 1;
            let outcome = self.process(&message).await;
            if outcome.is_accepted() {
                stats.accepted += 1;
            }
            if let ProcessOutcome::Accepted {
                dispatched: true, ..
            } = outcome
            {
                stats.dispatched += 1;
            }
        }

        info!(
            received = stats.received,
            accepted = stats.accepted,
            dispatched = stats.dispatched,
            "Listener stopped"
        );
        stats
    }
}

/// First [`PREVIEW_CHARS`] characters, with `...` when cut.
fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
