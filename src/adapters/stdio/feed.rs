use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::ports::{EventFeed, FeedError, GatewayEvent};

const DEFAULT_CAPACITY: usize = 1024;

enum Source {
    Stdin,
    File(PathBuf),
    Reader(Box<dyn AsyncBufRead + Unpin + Send>),
}

/// Reads one JSON gateway event per line.
///
/// Blank lines and lines starting with `#` are ignored; lines that do not
/// parse are logged and skipped.
pub struct JsonLinesFeed {
    source: Option<Source>,
    name: String,
    capacity: usize,
}

impl JsonLinesFeed {
    pub fn stdin() -> Self {
        Self::with_source(Source::Stdin, "stdin".to_string())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self::with_source(Source::File(path), name)
    }

    /// `-` means stdin, anything else is a file path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::stdin()
        } else {
            Self::file(shellexpand::tilde(arg).into_owned())
        }
    }

    pub fn from_reader(reader: impl AsyncBufRead + Unpin + Send + 'static) -> Self {
        Self::with_source(Source::Reader(Box::new(reader)), "reader".to_string())
    }

    /// Channel capacity between the reader task and the consumer
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    fn with_source(source: Source, name: String) -> Self {
        Self {
            source: Some(source),
            name,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[async_trait]
impl EventFeed for JsonLinesFeed {
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<GatewayEvent>, FeedError> {
        let source = self.source.take().ok_or(FeedError::AlreadySubscribed)?;
        let reader: Box<dyn AsyncBufRead + Unpin + Send> = match source {
            Source::Stdin => Box::new(BufReader::new(tokio::io::stdin())),
            Source::File(path) => Box::new(BufReader::new(tokio::fs::File::open(&path).await?)),
            Source::Reader(reader) => reader,
        };

        let (tx, rx) = mpsc::channel(self.capacity);
        let name = self.name.clone();
        tokio::spawn(async move {
            let forwarded = forward_lines(reader, tx).await;
            tracing::debug!(feed = %name, events = forwarded, "Feed exhausted");
        });
        Ok(rx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Parse lines into events until EOF, a read error, or the receiver drops
async fn forward_lines<R>(reader: R, tx: mpsc::Sender<GatewayEvent>) -> u64
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_number = 0u64;
    let mut forwarded = 0u64;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(line = line_number + 1, "Feed read error: {}", e);
                break;
            }
        };
        line_number += 1;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<GatewayEvent>(trimmed) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    break;
                }
                forwarded += 1;
            }
            Err(e) => tracing::warn!(line = line_number, "Skipping malformed event: {}", e),
        }
    }
    forwarded
}
