use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{Lifespan, OrderId, Price, Side, Volume};

use super::execution::{GatewayError, OrderCommand, OrderGateway};
use super::market_data::{EventFeed, FeedError};
use super::models::GatewayEvent;

/// Gateway double that records every command it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    commands: Arc<Mutex<Vec<OrderCommand>>>,
    fail_next: Arc<Mutex<Option<String>>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next submission with the given reason
    pub fn fail_next(&self, reason: &str) {
        *self.fail_next.lock().unwrap() = Some(reason.to_string());
    }

    /// All accepted commands in submission order
    pub fn commands(&self) -> Vec<OrderCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Accepted primary orders only
    pub fn orders(&self) -> Vec<OrderCommand> {
        self.commands().into_iter().filter(|c| !c.is_hedge()).collect()
    }

    /// Accepted hedge orders only
    pub fn hedges(&self) -> Vec<OrderCommand> {
        self.commands().into_iter().filter(|c| c.is_hedge()).collect()
    }

    pub fn clear(&self) {
        self.commands.lock().unwrap().clear();
    }

    fn record(&self, command: OrderCommand) -> Result<(), GatewayError> {
        if let Some(reason) = self.fail_next.lock().unwrap().take() {
            return Err(GatewayError::Rejected(reason));
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

impl OrderGateway for RecordingGateway {
    fn submit_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    ) -> Result<(), GatewayError> {
        self.record(OrderCommand::InsertOrder {
            order_id,
            side,
            price,
            volume,
            lifespan,
        })
    }

    fn submit_hedge_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
    ) -> Result<(), GatewayError> {
        self.record(OrderCommand::HedgeOrder {
            order_id,
            side,
            price,
            volume,
        })
    }
}

/// Feed double that replays a scripted event list
#[derive(Debug, Default)]
pub struct ScriptedFeed {
    events: Option<VecDeque<GatewayEvent>>,
}

impl ScriptedFeed {
    pub fn new(events: impl IntoIterator<Item = GatewayEvent>) -> Self {
        Self {
            events: Some(events.into_iter().collect()),
        }
    }
}

#[async_trait]
impl EventFeed for ScriptedFeed {
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<GatewayEvent>, FeedError> {
        let events = self.events.take().ok_or(FeedError::AlreadySubscribed)?;
        let (tx, rx) = mpsc::channel(events.len().max(1));
        tokio::spawn(async move {
            for event in events {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_gateway() {
        let recorder = RecordingGateway::new();
        let mut gateway = recorder.clone();
        gateway
            .submit_order(1, Side::Buy, 9_900, 10, Lifespan::FillAndKill)
            .unwrap();
        gateway.submit_hedge_order(2, Side::Sell, 100, 10).unwrap();

        assert_eq!(recorder.commands().len(), 2);
        assert_eq!(recorder.orders()[0].order_id(), 1);
        assert_eq!(recorder.hedges()[0].order_id(), 2);
    }

    #[test]
    fn test_recording_gateway_failure() {
        let mut gateway = RecordingGateway::new();
        gateway.fail_next("halted");
        let result = gateway.submit_hedge_order(1, Side::Buy, 100, 1);
        assert!(matches!(result, Err(GatewayError::Rejected(_))));
        assert!(gateway.commands().is_empty());
        assert!(gateway.submit_hedge_order(2, Side::Buy, 100, 1).is_ok());
    }

    #[tokio::test]
    async fn test_scripted_feed_delivers_in_order() {
        let mut feed = ScriptedFeed::new(vec![
            GatewayEvent::Error {
                order_id: 0,
                message: "a".into(),
            },
            GatewayEvent::Error {
                order_id: 0,
                message: "b".into(),
            },
        ]);
        let mut rx = feed.subscribe().await.unwrap();
        let mut messages = Vec::new();
        while let Some(GatewayEvent::Error { message, .. }) = rx.recv().await {
            messages.push(message);
        }
        assert_eq!(messages, vec!["a", "b"]);
        assert!(matches!(feed.subscribe().await, Err(FeedError::AlreadySubscribed)));
    }
}
