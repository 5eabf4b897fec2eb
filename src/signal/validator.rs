//! Actionability check for extracted signals.

use crate::signal::model::SignalRecord;

/// A record is actionable when it names a symbol, an entry price and at least
/// one target. Direction, exchange, pair type and stop loss never matter.
pub fn is_actionable(record: &SignalRecord) -> bool {
    record.symbol.is_some() && record.entry_price.is_some() && !record.target_prices.is_empty()
}

impl SignalRecord {
    /// See [`is_actionable`].
    pub fn is_actionable(&self) -> bool {
        is_actionable(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::extractor::extract;
    use crate::signal::model::{Direction, Exchange, PairType};
    use rust_decimal_macros::dec;

    fn complete() -> SignalRecord {
        let mut record = SignalRecord::new("test");
        record.symbol = Some("SOLUSDT".into());
        record.entry_price = Some(dec!(20.5));
        record.target_prices = vec![dec!(22)];
        record
    }

    #[test]
    fn complete_record_is_actionable() {
        assert!(is_actionable(&complete()));
    }

    #[test]
    fn missing_symbol() {
        let mut record = complete();
        record.symbol = None;
        assert!(!is_actionable(&record));
    }

    #[test]
    fn missing_entry() {
        let mut record = complete();
        record.entry_price = None;
        assert!(!is_actionable(&record));
    }

    #[test]
    fn no_targets() {
        let mut record = complete();
        record.target_prices.clear();
        assert!(!is_actionable(&record));
    }

    #[test]
    fn enrichment_fields_do_not_matter() {
        let mut record = complete();
        record.stop_loss = Some(dec!(19));
        record.direction = Direction::Short;
        record.exchange = Exchange::Binance;
        record.pair_type = PairType::Futures;
        assert!(record.is_actionable());
    }

    #[test]
    fn minimal_message_is_actionable() {
        let record = extract("$SOL Entry: 20.5 TP 22");
        assert!(record.is_actionable());
        assert_eq!(record.stop_loss, None);
    }

    #[test]
    fn missing_entry_message_rejected() {
        let record = extract("$SOL TP 22 TP 24");
        assert_eq!(record.symbol.as_deref(), Some("SOLUSDT"));
        assert_eq!(record.target_prices.len(), 2);
        assert!(!record.is_actionable());
    }

    #[test]
    fn ordinary_chat_rejected() {
        assert!(!extract("Good morning, weekly recap coming soon").is_actionable());
    }
}
