//! CDP WebSocket connection implementation
//!
//! One connection per DevTools target. The socket is split on connect: the
//! write half lives behind a mutex, the read half is owned by a spawned
//! dispatch task that routes responses back to callers through a
//! pending-command map. Command/response pairing is by request id.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::traits::{CdpCommandResult, CdpConnection};
use super::types::{CdpNotification, CdpRequest, CdpRpcResponse};
use crate::Error;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<CdpCommandResult>>>>;

/// Default deadline for a single CDP command round-trip
const COMMAND_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// CDP WebSocket connection implementation
pub struct CdpWebSocketConnection {
    /// WebSocket URL of the target
    url: String,
    /// Write half of the socket
    writer: Arc<Mutex<WsSink>>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending: PendingMap,
    /// Is connection active
    is_active: Arc<AtomicBool>,
}

impl std::fmt::Debug for CdpWebSocketConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpWebSocketConnection")
            .field("url", &self.url)
            .field("is_active", &self.is_active.load(Ordering::SeqCst))
            .finish()
    }
}

impl CdpWebSocketConnection {
    /// Connect to a DevTools target
    ///
    /// # Arguments
    /// * `url` - target WebSocket URL (e.g., "ws://127.0.0.1:9222/devtools/page/ABC123")
    pub async fn connect<S: Into<String>>(url: S) -> Result<Arc<Self>, Error> {
        let url = url.into();
        info!("Connecting to DevTools target at {}", url);

        let (ws_stream, _) = connect_async(&url)
            .await
            .map_err(|e| Error::websocket(format!("Failed to connect to {}: {}", url, e)))?;

        let (sink, source) = ws_stream.split();

        let connection = Arc::new(Self {
            url,
            writer: Arc::new(Mutex::new(sink)),
            next_id: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(HashMap::new())),
            is_active: Arc::new(AtomicBool::new(true)),
        });

        tokio::spawn(Self::read_loop(
            source,
            Arc::clone(&connection.writer),
            Arc::clone(&connection.pending),
            Arc::clone(&connection.is_active),
        ));

        Ok(connection)
    }

    /// Message dispatch loop
    ///
    /// Owns the read half of the socket. Responses resolve their pending
    /// command; events are logged and dropped (waits poll DOM state instead
    /// of consuming protocol events).
    async fn read_loop(
        mut source: WsSource,
        writer: Arc<Mutex<WsSink>>,
        pending: PendingMap,
        is_active: Arc<AtomicBool>,
    ) {
        while let Some(message) = source.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    Self::dispatch_message(&text, &pending).await;
                }
                Ok(Message::Ping(data)) => {
                    let mut sink = writer.lock().await;
                    if let Err(e) = sink.send(Message::Pong(data)).await {
                        warn!("Failed to send pong: {}", e);
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket close frame received");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket read error: {}", e);
                    break;
                }
            }
        }

        is_active.store(false, Ordering::SeqCst);

        // Dropping the senders wakes every in-flight caller with an error
        pending.lock().await.clear();
        debug!("CDP dispatch loop exited");
    }

    /// Route one incoming frame
    async fn dispatch_message(text: &str, pending: &PendingMap) {
        if let Ok(response) = serde_json::from_str::<CdpRpcResponse>(text) {
            let sender = pending.lock().await.remove(&response.id);
            match sender {
                Some(sender) => {
                    let _ = sender.send(CdpCommandResult {
                        result: response.result,
                        error: response.error,
                    });
                }
                None => warn!("Response for unknown command ID: {}", response.id),
            }
            return;
        }

        if let Ok(event) = serde_json::from_str::<CdpNotification>(text) {
            debug!("Ignoring CDP event: {}", event.method);
            return;
        }

        warn!("Unknown CDP message format: {}", text);
    }
}

#[async_trait::async_trait]
impl CdpConnection for CdpWebSocketConnection {
    async fn send_command(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<CdpCommandResult, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::websocket("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
        };

        let json = serde_json::to_string(&request)
            .map_err(|e| Error::cdp(format!("Failed to serialize request: {}", e)))?;

        let (sender, receiver) = oneshot::channel();
        self.pending.lock().await.insert(id, sender);

        debug!("Sending CDP command {}: {}", id, method);

        {
            let mut sink = self.writer.lock().await;
            if let Err(e) = sink.send(Message::Text(json)).await {
                self.pending.lock().await.remove(&id);
                return Err(Error::websocket(format!("Failed to send command: {}", e)));
            }
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, receiver).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(Error::websocket(format!(
                "Connection closed before response to {} ({})",
                method, id
            ))),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(Error::timeout(format!("CDP command {} timed out", method)))
            }
        }
    }

    async fn close(&self) -> Result<(), Error> {
        if !self.is_active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        info!("Closing CDP connection to {}", self.url);

        let mut sink = self.writer.lock().await;
        sink.close()
            .await
            .map_err(|e| Error::websocket(format!("Failed to close WebSocket: {}", e)))?;

        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}
