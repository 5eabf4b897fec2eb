//! Structured signal record produced by the extractor.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade direction stated by the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Venue the signal targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    Mexc,
    Binance,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Mexc => "MEXC",
            Exchange::Binance => "BINANCE",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market the pair trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PairType {
    Spot,
    Futures,
}

impl PairType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairType::Spot => "SPOT",
            PairType::Futures => "FUTURES",
        }
    }
}

impl fmt::Display for PairType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction used when the message never says SHORT.
pub const DEFAULT_DIRECTION: Direction = Direction::Long;
/// Exchange used when the message never names BINANCE.
pub const DEFAULT_EXCHANGE: Exchange = Exchange::Mexc;
/// Pair type used when the message never says FUTURES.
pub const DEFAULT_PAIR_TYPE: PairType = PairType::Spot;
/// Quote asset appended to every extracted base ticker.
pub const QUOTE_ASSET: &str = "USDT";

/// A trading signal extracted from one chat message.
///
/// Always fully constructed. Optional fields are `None` when no rule matched,
/// enum fields fall back to the `DEFAULT_*` constants. Serializes to the JSON
/// shape the signals endpoint accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Wall-clock time of extraction.
    #[serde(rename = "timestamp")]
    captured_at: DateTime<Utc>,
    /// The message exactly as received.
    #[serde(rename = "raw_message")]
    raw_text: String,
    pub symbol: Option<String>,
    pub direction: Direction,
    #[serde(rename = "entry")]
    pub entry_price: Option<Decimal>,
    #[serde(rename = "targets")]
    pub target_prices: Vec<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub exchange: Exchange,
    pub pair_type: PairType,
}

impl SignalRecord {
    /// An empty record for `raw_text`, stamped now, every field at its default.
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self::captured(raw_text, Utc::now())
    }

    /// Like [`SignalRecord::new`] with an explicit capture time.
    pub fn captured(raw_text: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            captured_at,
            raw_text: raw_text.into(),
            symbol: None,
            direction: DEFAULT_DIRECTION,
            entry_price: None,
            target_prices: Vec::new(),
            stop_loss: None,
            exchange: DEFAULT_EXCHANGE,
            pair_type: DEFAULT_PAIR_TYPE,
        }
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
