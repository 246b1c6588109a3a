// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use super::SessionError;
use futures::{SinkExt, StreamExt};
use serde_json::{Value as JsonValue, json};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Text frames to and from one node.
///
/// The socket itself is driven by two background tasks; the session only
/// sees a pair of channels. Closing either side ends the connection.
#[derive(Debug)]
pub struct Transport {
    pub(crate) outgoing: mpsc::UnboundedSender<String>,
    pub(crate) incoming: mpsc::UnboundedReceiver<String>,
}

impl Transport {
    /// Open a WebSocket connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, SessionError> {
        tracing::debug!("Connecting to {}", url);
        let (ws_stream, _) = connect_async(url).await?;
        let (mut write, mut read) = ws_stream.split();

        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<String>();
        let (incoming_tx, incoming) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(text) = outgoing_rx.recv().await {
                if let Err(e) = write.send(Message::Text(text)).await {
                    tracing::warn!("Failed to send to node: {}", e);
                    break;
                }
            }
            let _ = write.close().await;
        });

        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let text = match message {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(_) => {
                            tracing::warn!("Ignoring non UTF-8 binary frame");
                            continue;
                        }
                    },
                    Ok(Message::Close(frame)) => {
                        tracing::info!("Node closed the connection: {:?}", frame);
                        break;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!("WebSocket error: {}", e);
                        break;
                    }
                };

                if incoming_tx.send(text).is_err() {
                    break;
                }
            }
        });

        Ok(Self { outgoing, incoming })
    }

    /// In-process transport; the returned [`Loopback`] plays the node.
    pub fn pair() -> (Self, Loopback) {
        let (outgoing, from_client) = mpsc::unbounded_channel();
        let (to_client, incoming) = mpsc::unbounded_channel();
        (
            Self { outgoing, incoming },
            Loopback {
                to_client,
                from_client,
            },
        )
    }
}

/// Node side of [`Transport::pair`].
#[derive(Debug)]
pub struct Loopback {
    to_client: mpsc::UnboundedSender<String>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl Loopback {
    /// Next request sent by the client, or `None` once the client is gone.
    pub async fn recv(&mut self) -> Option<JsonValue> {
        while let Some(text) = self.from_client.recv().await {
            match serde_json::from_str(&text) {
                Ok(request) => return Some(request),
                Err(e) => tracing::warn!("Client sent invalid JSON: {}", e),
            }
        }
        None
    }

    /// A request already sent by the client, without waiting.
    pub fn try_recv(&mut self) -> Option<JsonValue> {
        let text = self.from_client.try_recv().ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Deliver a raw message to the client.
    pub fn send(&self, message: JsonValue) -> bool {
        self.to_client.send(message.to_string()).is_ok()
    }

    pub fn respond(&self, id: &JsonValue, result: JsonValue) -> bool {
        self.send(json!({"jsonrpc": "2.0", "id": id, "result": result}))
    }

    pub fn respond_error(&self, id: &JsonValue, code: i64, message: &str) -> bool {
        self.send(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": code, "message": message}
        }))
    }

    /// Subscription push.
    pub fn notify(&self, method: &str, subscription: &str, result: JsonValue) -> bool {
        self.send(json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": {"subscription": subscription, "result": result}
        }))
    }
}
