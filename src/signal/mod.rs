//! Signal extraction and validation core.
//!
//! Pure and synchronous. Each message is handled independently:
//! 1. `extract()` — lexical rules → `SignalRecord` (never fails)
//! 2. `is_actionable()` — symbol + entry + at least one target

pub mod extractor;
pub mod model;
pub mod rules;
pub mod validator;

pub use extractor::{SignalExtractor, extract};
pub use model::{
    DEFAULT_DIRECTION, DEFAULT_EXCHANGE, DEFAULT_PAIR_TYPE, Direction, Exchange, PairType,
    SignalRecord,
};
pub use rules::{RuleField, SignalRule};
pub use validator::is_actionable;
