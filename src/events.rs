use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the service layer after durable state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SaleConfirmed {
        sale_id: Uuid,
        user_id: Uuid,
        total: Decimal,
    },
    StockDecremented {
        product_id: Uuid,
        quantity: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    /// Event delivery is best-effort and never blocks the request path outcome.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event: {}", e);
        }
    }
}

/// Background loop consuming events from the channel.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::SaleConfirmed {
                sale_id,
                user_id,
                total,
            } => {
                info!(%sale_id, %user_id, %total, "sale confirmed");
            }
            Event::StockDecremented {
                product_id,
                quantity,
            } => {
                info!(%product_id, quantity, "stock decremented");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::StockDecremented {
                product_id: Uuid::new_v4(),
                quantity: 2,
            })
            .await
            .expect("send should succeed");

        assert!(matches!(
            rx.recv().await,
            Some(Event::StockDecremented { quantity: 2, .. })
        ));
    }

    #[tokio::test]
    async fn send_or_log_survives_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or error out.
        sender
            .send_or_log(Event::SaleConfirmed {
                sale_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                total: Decimal::ZERO,
            })
            .await;
    }
}
