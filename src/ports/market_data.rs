use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::models::GatewayEvent;

/// Event feed error type
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to open feed source: {0}")]
    Open(#[from] std::io::Error),

    #[error("Feed already subscribed")]
    AlreadySubscribed,
}

/// Inbound side of the exchange gateway.
///
/// Events are delivered in order through a single channel; the consumer
/// must finish one event before taking the next.
#[async_trait]
pub trait EventFeed: Send {
    /// Start delivering events. Can be called once.
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<GatewayEvent>, FeedError>;

    /// Short label for logs
    fn name(&self) -> &str;
}
