//! Live heart rate feed over WebSocket
//!
//! Connect: `ws://<host>/ws`
//!
//! On connect the server sends the latest sample, then one text frame per
//! accepted `POST /api/heartrate`:
//!
//! ```json
//! { "heartRate": 82, "timestamp": "2024-05-01T08:30:00.000Z", "sampleCount": 2 }
//! ```
//!
//! Before the first sample the fields are `null` and `sampleCount` is `0`.
//! Client frames other than close are ignored.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use health_coach_domain::entities::heart_rate::LatestHeartRate;
use health_coach_domain::relay::SharedRelay;

/// Upgrade to a WebSocket streaming heart rate updates
pub async fn heart_rate_ws(ws: WebSocketUpgrade, State(relay): State<SharedRelay>) -> Response {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_socket(socket, relay).await {
            warn!("Heart rate WebSocket ended with error: {}", e);
        }
    })
}

fn encode(update: &LatestHeartRate) -> Result<Message, serde_json::Error> {
    serde_json::to_string(update).map(Message::Text)
}

async fn handle_socket(socket: WebSocket, relay: SharedRelay) -> Result<(), axum::Error> {
    let (mut sender, mut receiver) = socket.split();

    let (snapshot, mut updates) = relay.subscribe().await;
    info!("Heart rate WebSocket client connected ({} subscriber(s))", relay.subscriber_count());

    match encode(&snapshot) {
        Ok(message) => sender.send(message).await?,
        Err(e) => warn!("Could not encode heart rate snapshot: {}", e),
    }

    loop {
        tokio::select! {
            update = updates.recv() => {
                match update {
                    Ok(update) => {
                        let message = match encode(&update) {
                            Ok(message) => message,
                            Err(e) => {
                                warn!("Could not encode heart rate update: {}", e);
                                continue;
                            }
                        };
                        if sender.send(message).await.is_err() {
                            debug!("Heart rate WebSocket send failed, dropping client");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Heart rate WebSocket client lagged, skipped {} update(s)", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!("Heart rate WebSocket receive error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    info!("Heart rate WebSocket client disconnected");
    Ok(())
}
