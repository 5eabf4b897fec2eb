//! Declarative lexical rules for signal extraction.
//!
//! Each rule pairs a compiled regex with the record field it fills. Rules are
//! kept in priority order: when two rules fill the same single-valued field
//! (the two symbol patterns), the earlier one wins and the later one is only
//! consulted while the field is still empty.

use regex::Regex;

/// Which record field a rule fills, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    /// First capture, suffixed with the quote asset.
    Symbol,
    /// Any match marks the signal SHORT.
    Direction,
    /// First capture that parses as a decimal.
    Entry,
    /// Every capture that parses as a decimal, in textual order.
    Targets,
    /// First capture that parses as a decimal.
    StopLoss,
    /// Any match marks the pair FUTURES.
    PairType,
    /// Any match marks the exchange BINANCE.
    Exchange,
}

/// A single extraction rule with a compiled regex.
#[derive(Debug, Clone)]
pub struct SignalRule {
    /// Short name used in debug logs.
    pub name: &'static str,
    /// Compiled pattern. Value-carrying rules capture into group 1.
    pub regex: Regex,
    /// Field this rule fills.
    pub field: RuleField,
}

impl SignalRule {
    /// Compile a rule from a pattern string.
    pub fn new(name: &'static str, pattern: &str, field: RuleField) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            regex: Regex::new(pattern)?,
            field,
        })
    }
}

/// `$` followed by an upper-case ticker, e.g. `$BTC`.
pub const CASHTAG_PATTERN: &str = r"\$([A-Z]{3,10})";
/// Upper-case ticker quoted against USDT, e.g. `ETH/USDT`.
pub const USDT_PAIR_PATTERN: &str = r"([A-Z]{3,10})/USDT";
pub const SHORT_PATTERN: &str = r"(?i)\bSHORT\b";
pub const ENTRY_PATTERN: &str = r"(?i)Entry[:\s]+([0-9.]+)";
// Keywords are not word-anchored: "TP" also fires inside longer words.
pub const TARGET_PATTERN: &str = r"(?i)(?:Target|TP)[:\s]*([0-9.]+)";
pub const STOP_LOSS_PATTERN: &str = r"(?i)(?:Stop|SL)[:\s]+([0-9.]+)";
pub const FUTURES_PATTERN: &str = r"(?i)\bFUTURES?\b";
pub const BINANCE_PATTERN: &str = r"(?i)\bBINANCE\b";

/// The built-in rule table in priority order.
pub fn default_rules() -> Vec<SignalRule> {
    [
        ("cashtag", CASHTAG_PATTERN, RuleField::Symbol),
        ("usdt_pair", USDT_PAIR_PATTERN, RuleField::Symbol),
        ("short", SHORT_PATTERN, RuleField::Direction),
        ("entry", ENTRY_PATTERN, RuleField::Entry),
        ("target", TARGET_PATTERN, RuleField::Targets),
        ("stop_loss", STOP_LOSS_PATTERN, RuleField::StopLoss),
        ("futures", FUTURES_PATTERN, RuleField::PairType),
        ("binance", BINANCE_PATTERN, RuleField::Exchange),
    ]
    .into_iter()
    .map(|(name, pattern, field)| {
        // Patterns are compile-time constants covered by tests.
        SignalRule::new(name, pattern, field).unwrap_or_else(|e| panic!("rule {name}: {e}"))
    })
    .collect()
}
