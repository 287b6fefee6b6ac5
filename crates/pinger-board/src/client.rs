use crate::error::TransportError;
use futures_util::StreamExt;
use pinger_core::{decode_frame, StatusMessage};
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

pub const FEED_QUEUE_CAPACITY: usize = 256;

type FeedSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug)]
pub enum FeedEvent {
    Connected,
    Message(StatusMessage),
    Disconnected(Option<String>),
}

/// Single feed connection. Decoded messages and lifecycle changes arrive on
/// the event channel handed to [`StreamClient::connect`].
pub struct StreamClient {
    endpoint: Url,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl StreamClient {
    pub fn connect(endpoint: Url, events: mpsc::Sender<FeedEvent>) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(feed_loop(endpoint.clone(), events, shutdown_rx));
        Self {
            endpoint,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Closes the connection and waits for the reader to stop. Close failures
    /// are not reported.
    pub async fn shutdown(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Decodes one inbound payload; malformed payloads are logged and dropped.
pub fn on_message(payload: &[u8]) -> Option<StatusMessage> {
    match decode_frame(payload) {
        Ok(message) => {
            debug!(event = "feed_message", kind = message.kind());
            Some(message)
        }
        Err(err) => {
            warn!(
                event = "feed_decode_error",
                error = %err,
                raw = %String::from_utf8_lossy(payload)
            );
            None
        }
    }
}

async fn feed_loop(
    endpoint: Url,
    events: mpsc::Sender<FeedEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let reason = match run_feed(&endpoint, &events, &mut shutdown_rx).await {
        Ok(FeedEnd::Stopped) => {
            if events.try_send(FeedEvent::Disconnected(None)).is_err() {
                debug!(event = "feed_disconnect_dropped", endpoint = %endpoint);
            }
            return;
        }
        Ok(FeedEnd::Closed) => None,
        Err(err) => {
            warn!(event = "feed_transport_error", endpoint = %endpoint, error = %err);
            Some(err.to_string())
        }
    };
    forward(&events, FeedEvent::Disconnected(reason), &mut shutdown_rx).await;
}

/// Why the reader stopped without a transport error.
enum FeedEnd {
    /// Shutdown was requested or the receiver went away; `shutdown_rx` may be spent.
    Stopped,
    /// The server closed the connection.
    Closed,
}

async fn run_feed(
    endpoint: &Url,
    events: &mpsc::Sender<FeedEvent>,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> Result<FeedEnd, TransportError> {
    let connected = tokio::select! {
        result = connect_async(endpoint.as_str()) => result,
        _ = &mut *shutdown_rx => return Ok(FeedEnd::Stopped),
    };
    let (mut ws, _) = connected.map_err(|source| TransportError::Connect {
        endpoint: endpoint.to_string(),
        source,
    })?;
    info!(event = "feed_connected", endpoint = %endpoint);
    if !forward(events, FeedEvent::Connected, shutdown_rx).await {
        close_quietly(&mut ws).await;
        return Ok(FeedEnd::Stopped);
    }

    loop {
        tokio::select! {
            _ = &mut *shutdown_rx => {
                close_quietly(&mut ws).await;
                return Ok(FeedEnd::Stopped);
            }
            frame = ws.next() => {
                let payload = match frame {
                    Some(Ok(Message::Text(text))) => text.into_bytes(),
                    Some(Ok(Message::Binary(bytes))) => bytes,
                    Some(Ok(Message::Close(frame))) => {
                        info!(event = "feed_closed", frame = ?frame);
                        return Ok(FeedEnd::Closed);
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => return Err(TransportError::Read(err)),
                    None => {
                        info!(event = "feed_closed", frame = "eof");
                        return Ok(FeedEnd::Closed);
                    }
                };
                let Some(message) = on_message(&payload) else {
                    continue;
                };
                if !forward(events, FeedEvent::Message(message), shutdown_rx).await {
                    close_quietly(&mut ws).await;
                    return Ok(FeedEnd::Stopped);
                }
            }
        }
    }
}

/// Queues one event unless shutdown arrives first. Returns `false` when the
/// reader should stop, either on shutdown or because the receiver is gone.
async fn forward(
    events: &mpsc::Sender<FeedEvent>,
    event: FeedEvent,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> bool {
    tokio::select! {
        sent = events.send(event) => sent.is_ok(),
        _ = &mut *shutdown_rx => false,
    }
}

async fn close_quietly(ws: &mut FeedSocket) {
    if let Err(err) = ws.close(None).await {
        debug!(event = "feed_close_error", error = %err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinger_core::ApplicationStatus;

    #[test]
    fn on_message_forwards_decoded_snapshot() {
        let message = on_message(br#"[{"app":"svc-a","isOk":true}]"#).expect("snapshot");
        assert_eq!(
            message,
            StatusMessage::Snapshot(vec![ApplicationStatus::new("svc-a", true)])
        );
    }

    #[test]
    fn on_message_drops_malformed_payload() {
        assert!(on_message(b"definitely not json").is_none());
        assert!(on_message(b"true").is_none());
    }

    #[tokio::test]
    async fn unreachable_endpoint_reports_disconnect() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let (tx, mut rx) = mpsc::channel(4);
        let endpoint = Url::parse(&format!("ws://{addr}/ws")).expect("url");
        let client = StreamClient::connect(endpoint.clone(), tx);
        assert_eq!(client.endpoint(), &endpoint);

        match rx.recv().await {
            Some(FeedEvent::Disconnected(Some(reason))) => {
                assert!(reason.contains("connect to"), "reason: {reason}");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        client.shutdown().await;
    }
}
