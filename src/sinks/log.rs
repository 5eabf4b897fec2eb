//! Append-only JSON-lines log of accepted signals.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::DispatchError;
use crate::signal::SignalRecord;
use crate::sinks::SignalSink;

/// Writes one JSON object per line. Existing content is never rewritten.
pub struct SignalLog {
    path: PathBuf,
    // Serializes appends from concurrent deliveries.
    write_lock: Mutex<()>,
}

impl SignalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a JSON line.
    pub async fn append(&self, record: &SignalRecord) -> Result<(), DispatchError> {
        let mut line = record.to_json_line()?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl SignalSink for SignalLog {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, record: &SignalRecord) -> Result<bool, DispatchError> {
        self.append(record).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::signal::extract;

    #[tokio::test]
    async fn appends_one_line_per_record() {
        let tmp = TempDir::new().unwrap();
        let log = SignalLog::new(tmp.path().join("signals_log.json"));

        log.append(&extract("$SOL Entry: 20.5 TP 22")).await.unwrap();
        log.append(&extract("$BTC Entry: 60000\nTP 62000")).await.unwrap();

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["symbol"], "SOLUSDT");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["symbol"], "BTCUSDT");
        assert_eq!(second["raw_message"], "$BTC Entry: 60000\nTP 62000");
    }

    #[tokio::test]
    async fn keeps_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("signals_log.json");
        tokio::fs::write(&path, "{\"old\":true}\n").await.unwrap();

        let log = SignalLog::new(&path);
        log.deliver(&extract("$SOL Entry: 20.5 TP 22")).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.starts_with("{\"old\":true}\n"));
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let log = SignalLog::new(tmp.path().join("nested/dir/signals.jsonl"));
        assert!(log.deliver(&extract("$SOL Entry: 1 TP 2")).await.unwrap());
        assert!(log.path().exists());
    }

    #[tokio::test]
    async fn round_trips_record() {
        let tmp = TempDir::new().unwrap();
        let log = SignalLog::new(tmp.path().join("signals.jsonl"));
        let record = extract("$ARB SHORT futures binance Entry 1.25 TP 1.1 SL 1.3");
        log.append(&record).await.unwrap();

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        let back: SignalRecord = serde_json::from_str(content.trim_end()).unwrap();
        assert_eq!(back, record);
    }
}
