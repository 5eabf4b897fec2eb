//! Text to `SignalRecord` extraction.
//!
//! Every rule runs against the full message, independently of the others, so
//! fields may appear in any order and missing fields leave a partial record.
//! Extraction never fails.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::trace;

use crate::signal::model::{Direction, Exchange, PairType, QUOTE_ASSET, SignalRecord};
use crate::signal::rules::{RuleField, SignalRule, default_rules};

static DEFAULT_EXTRACTOR: LazyLock<SignalExtractor> = LazyLock::new(SignalExtractor::default_rules);

/// Extract a signal from `text` with the built-in rule table.
pub fn extract(text: &str) -> SignalRecord {
    DEFAULT_EXTRACTOR.extract(text)
}

/// Applies an ordered rule table to message text.
#[derive(Debug, Clone)]
pub struct SignalExtractor {
    rules: Vec<SignalRule>,
}

impl SignalExtractor {
    /// Extractor over the built-in rules.
    pub fn default_rules() -> Self {
        Self::with_rules(default_rules())
    }

    /// Extractor over a caller-supplied table, applied in the given order.
    pub fn with_rules(rules: Vec<SignalRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SignalRule] {
        &self.rules
    }

    /// Build a record for `text`, stamped with the current time.
    pub fn extract(&self, text: &str) -> SignalRecord {
        self.extract_at(text, Utc::now())
    }

    /// Build a record for `text` with a fixed capture time.
    pub fn extract_at(&self, text: &str, captured_at: DateTime<Utc>) -> SignalRecord {
        let mut record = SignalRecord::captured(text, captured_at);

        for rule in &self.rules {
            match rule.field {
                RuleField::Symbol => {
                    if record.symbol.is_none() {
                        record.symbol = first_capture(&rule.regex, text)
                            .map(|base| format!("{base}{QUOTE_ASSET}"));
                    }
                }
                RuleField::Direction => {
                    if rule.regex.is_match(text) {
                        record.direction = Direction::Short;
                    }
                }
                RuleField::Entry => {
                    if record.entry_price.is_none() {
                        record.entry_price = decimals(&rule.regex, text).next();
                    }
                }
                RuleField::Targets => {
                    record.target_prices.extend(decimals(&rule.regex, text));
                }
                RuleField::StopLoss => {
                    if record.stop_loss.is_none() {
                        record.stop_loss = decimals(&rule.regex, text).next();
                    }
                }
                RuleField::PairType => {
                    if rule.regex.is_match(text) {
                        record.pair_type = PairType::Futures;
                    }
                }
                RuleField::Exchange => {
                    if rule.regex.is_match(text) {
                        record.exchange = Exchange::Binance;
                    }
                }
            }
            trace!(rule = rule.name, "Applied extraction rule");
        }

        record
    }
}

fn first_capture<'t>(regex: &Regex, text: &'t str) -> Option<&'t str> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Decimal values of every capture in textual order. Captures that do not
/// parse exactly (e.g. `1.2.3`, a bare `.`, or more fractional digits than
/// `Decimal` holds) are skipped rather than rounded.
fn decimals<'a>(regex: &'a Regex, text: &'a str) -> impl Iterator<Item = Decimal> + 'a {
    regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| Decimal::from_str_exact(m.as_str()).ok())
}
