//! CLI channel — reads messages from stdin for local testing and replay.
//!
//! One message per line. A literal `\n` inside a line becomes a newline, so
//! multi-line channel posts can be replayed from a file.

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::channels::{Channel, IncomingMessage, MessageStream};
use crate::error::ChannelError;

/// A channel that reads messages from stdin.
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        Ok(line_stream(BufReader::new(tokio::io::stdin())))
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// Messages from any line-oriented reader. Blank lines are skipped and the
/// stream ends at EOF or on a read error.
pub fn line_stream<R>(reader: R) -> MessageStream
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut lines = reader.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let content = line.replace("\\n", "\n");
                    let msg = IncomingMessage::new("cli", "local-user", &content);
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    let stream = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|msg| (msg, rx))
    });

    Box::pin(stream)
}
