//! WebSocket JSON-RPC client with bounded auto-reconnect.
//!
//! A background task owns the socket. Callers hand it calls over a channel
//! and wait on a oneshot for the matching reply. Wire ids are assigned by
//! the client so a caller that gives up can tell the task to forget its
//! entry. Every in-flight call fails when the connection drops.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::TransportError;
use crate::eth::RpcTransport;
use crate::wire::{RpcCall, RpcReply};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type ReplySender = oneshot::Sender<Result<RpcReply, TransportError>>;

/// Configuration for the WebSocket client.
#[derive(Debug, Clone)]
pub struct WsClientConfig {
    /// Delay before the first reconnect attempt.
    pub reconnect_initial: Duration,
    /// Maximum reconnect backoff.
    pub reconnect_max: Duration,
    /// Consecutive failed reconnects before the client gives up.
    pub max_reconnects: u32,
    /// Per-request deadline.
    pub request_timeout: Duration,
}

impl Default for WsClientConfig {
    fn default() -> Self {
        Self {
            reconnect_initial: Duration::from_secs(2),
            reconnect_max: Duration::from_secs(30),
            max_reconnects: 5,
            request_timeout: Duration::from_secs(10),
        }
    }
}

enum WsCommand {
    Send { call: RpcCall, tx: ReplySender },
    /// The caller of this wire id stopped waiting.
    Forget(u64),
    Close,
}

/// WebSocket JSON-RPC client.
pub struct WsRpcClient {
    url: String,
    cmd_tx: mpsc::UnboundedSender<WsCommand>,
    next_wire_id: AtomicU64,
    request_timeout: Duration,
}

impl WsRpcClient {
    /// Connect to `url` and start the background task.
    ///
    /// The first connection is made eagerly so an unreachable endpoint is
    /// reported here rather than on the first request.
    pub async fn connect(
        url: impl Into<String>,
        config: WsClientConfig,
    ) -> Result<Self, TransportError> {
        let url = url.into();
        let (socket, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::WebSocket(format!("connect {url}: {e}")))?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<WsCommand>();
        let request_timeout = config.request_timeout;
        let task_url = url.clone();
        tokio::spawn(async move {
            ws_task(task_url, socket, cmd_rx, config).await;
        });

        Ok(Self {
            url,
            cmd_tx,
            next_wire_id: AtomicU64::new(1),
            request_timeout,
        })
    }
}

impl Drop for WsRpcClient {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(WsCommand::Close);
    }
}

#[async_trait]
impl RpcTransport for WsRpcClient {
    async fn roundtrip(&self, mut call: RpcCall) -> Result<RpcReply, TransportError> {
        let wire_id = self.next_wire_id.fetch_add(1, Ordering::Relaxed);
        let caller_id = std::mem::replace(&mut call.id, wire_id);

        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(WsCommand::Send { call, tx })
            .map_err(|_| TransportError::WebSocket("WS task closed".into()))?;

        match time::timeout(self.request_timeout, rx).await {
            Err(_) => {
                let _ = self.cmd_tx.send(WsCommand::Forget(wire_id));
                Err(TransportError::Timeout {
                    ms: self.request_timeout.as_millis() as u64,
                })
            }
            Ok(Err(_)) => Err(TransportError::WebSocket("WS response dropped".into())),
            Ok(Ok(reply)) => reply.map(|mut reply| {
                reply.id = Some(caller_id);
                reply
            }),
        }
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// In-flight calls keyed by wire id.
#[derive(Default)]
struct Pending {
    waiting: HashMap<u64, ReplySender>,
}

impl Pending {
    /// Track `wire_id`, dropping entries whose callers are gone (cancelled
    /// futures, such as the losers of a lookup race).
    fn register(&mut self, wire_id: u64, tx: ReplySender) {
        self.waiting.retain(|_, waiter| !waiter.is_closed());
        self.waiting.insert(wire_id, tx);
    }

    fn forget(&mut self, wire_id: u64) {
        self.waiting.remove(&wire_id);
    }

    fn resolve(&mut self, reply: RpcReply) {
        let Some(tx) = reply.id.and_then(|id| self.waiting.remove(&id)) else {
            return;
        };
        let _ = tx.send(Ok(reply));
    }

    fn fail_all(&mut self, reason: &str) {
        for (_, tx) in self.waiting.drain() {
            let _ = tx.send(Err(TransportError::WebSocket(reason.to_string())));
        }
    }
}

enum Disconnect {
    /// The client was dropped or closed; stop for good.
    Closed,
    /// The socket failed; try to reconnect.
    Lost,
}

enum Reconnect {
    Connected(Socket),
    Closed,
    Exhausted,
}

async fn ws_task(
    url: String,
    socket: Socket,
    mut cmd_rx: mpsc::UnboundedReceiver<WsCommand>,
    config: WsClientConfig,
) {
    let mut pending = Pending::default();
    let mut socket = socket;

    loop {
        match dispatch(socket, &mut cmd_rx, &mut pending).await {
            Disconnect::Closed => {
                pending.fail_all("WS client closed");
                return;
            }
            Disconnect::Lost => {
                pending.fail_all("WS connection lost");
                tracing::warn!(url = %url, "WS disconnected");
            }
        }

        socket = match reconnect(&url, &config, &mut cmd_rx).await {
            Reconnect::Connected(next) => next,
            Reconnect::Closed => {
                tracing::debug!(url = %url, "WS client closed while reconnecting");
                return;
            }
            Reconnect::Exhausted => {
                tracing::error!(
                    url = %url,
                    attempts = config.max_reconnects,
                    "WS reconnect attempts exhausted"
                );
                cmd_rx.close();
                while let Some(cmd) = cmd_rx.recv().await {
                    if let WsCommand::Send { tx, .. } = cmd {
                        let _ = tx.send(Err(TransportError::WebSocket(
                            "WS reconnect attempts exhausted".into(),
                        )));
                    }
                }
                return;
            }
        };
    }
}

async fn reconnect(
    url: &str,
    config: &WsClientConfig,
    cmd_rx: &mut mpsc::UnboundedReceiver<WsCommand>,
) -> Reconnect {
    let mut backoff = config.reconnect_initial;
    for attempt in 1..=config.max_reconnects {
        if until_closed(time::sleep(backoff), cmd_rx).await.is_none() {
            return Reconnect::Closed;
        }
        tracing::info!(url = %url, attempt, "reconnecting via WebSocket");
        match until_closed(tokio_tungstenite::connect_async(url), cmd_rx).await {
            None => return Reconnect::Closed,
            Some(Ok((socket, _))) => return Reconnect::Connected(socket),
            Some(Err(e)) => {
                tracing::warn!(url = %url, attempt, error = %e, "WS reconnect failed");
                backoff = (backoff * 2).min(config.reconnect_max);
            }
        }
    }
    Reconnect::Exhausted
}

/// Drive `fut` while there is no socket, answering commands as they come.
/// `None` once the client is closed or dropped.
async fn until_closed<F: Future>(
    fut: F,
    cmd_rx: &mut mpsc::UnboundedReceiver<WsCommand>,
) -> Option<F::Output> {
    tokio::pin!(fut);
    loop {
        tokio::select! {
            out = &mut fut => return Some(out),
            cmd = cmd_rx.recv() => match cmd {
                None | Some(WsCommand::Close) => return None,
                Some(WsCommand::Send { tx, .. }) => {
                    let _ = tx.send(Err(TransportError::WebSocket("WS reconnecting".into())));
                }
                Some(WsCommand::Forget(_)) => {}
            },
        }
    }
}

async fn dispatch(
    socket: Socket,
    cmd_rx: &mut mpsc::UnboundedReceiver<WsCommand>,
    pending: &mut Pending,
) -> Disconnect {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    None | Some(WsCommand::Close) => {
                        let _ = sink.close().await;
                        return Disconnect::Closed;
                    }
                    Some(WsCommand::Forget(wire_id)) => pending.forget(wire_id),
                    Some(WsCommand::Send { call, tx }) => {
                        let wire_id = call.id;
                        match serde_json::to_string(&call) {
                            Ok(msg) => {
                                pending.register(wire_id, tx);
                                if sink.send(Message::Text(msg.into())).await.is_err() {
                                    return Disconnect::Lost;
                                }
                            }
                            Err(e) => {
                                let _ = tx.send(Err(TransportError::Deserialization(e)));
                            }
                        }
                    }
                }
            }
            msg = stream.next() => {
                match msg {
                    None | Some(Ok(Message::Close(_))) => return Disconnect::Lost,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "WS receive error");
                        return Disconnect::Lost;
                    }
                    Some(Ok(Message::Text(text))) => handle_message(text.as_str(), pending),
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

fn handle_message(text: &str, pending: &mut Pending) {
    match serde_json::from_str::<RpcReply>(text) {
        Ok(reply) => pending.resolve(reply),
        Err(e) => tracing::debug!(error = %e, "ignoring non-reply WS message"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn replies_reach_their_caller_only() {
        let mut pending = Pending::default();
        let (tx_a, mut rx_a) = oneshot::channel();
        let (tx_b, mut rx_b) = oneshot::channel();
        pending.register(1, tx_a);
        pending.register(2, tx_b);

        pending.resolve(RpcReply::success(2, Value::String("0x38".into())));
        assert!(rx_a.try_recv().is_err());
        let reply = rx_b.try_recv().unwrap().unwrap();
        assert_eq!(reply.result, Some(Value::String("0x38".into())));
        assert_eq!(pending.waiting.len(), 1);
    }

    #[test]
    fn fail_all_notifies_waiters() {
        let mut pending = Pending::default();
        let (tx, mut rx) = oneshot::channel();
        pending.register(9, tx);

        pending.fail_all("WS connection lost");
        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(err, TransportError::WebSocket(_)));
    }

    #[test]
    fn timed_out_calls_are_forgotten() {
        let mut pending = Pending::default();
        let (tx, _rx) = oneshot::channel();
        pending.register(4, tx);
        pending.forget(4);
        assert!(pending.waiting.is_empty());

        // A late reply for the forgotten id is dropped.
        pending.resolve(RpcReply::success(4, Value::Null));
        assert!(pending.waiting.is_empty());
    }

    #[test]
    fn abandoned_callers_are_pruned() {
        let mut pending = Pending::default();
        let (tx_gone, rx_gone) = oneshot::channel();
        pending.register(1, tx_gone);
        drop(rx_gone);

        let (tx_live, _rx_live) = oneshot::channel();
        pending.register(2, tx_live);
        assert_eq!(pending.waiting.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut pending = Pending::default();
        handle_message(r#"{"jsonrpc":"2.0","id":42,"result":"0x1"}"#, &mut pending);
        handle_message(r#"{"jsonrpc":"2.0","method":"eth_subscription"}"#, &mut pending);
        assert!(pending.waiting.is_empty());
    }

    #[tokio::test]
    async fn close_interrupts_reconnect_backoff() {
        let config = WsClientConfig {
            reconnect_initial: Duration::from_secs(60),
            ..Default::default()
        };
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        cmd_tx.send(WsCommand::Close).unwrap();

        let outcome = time::timeout(
            Duration::from_secs(1),
            reconnect("ws://127.0.0.1:1", &config, &mut cmd_rx),
        )
        .await
        .expect("reconnect should stop on close");
        assert!(matches!(outcome, Reconnect::Closed));
    }

    #[tokio::test]
    async fn calls_during_backoff_fail_fast() {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let (tx, rx) = oneshot::channel();
        cmd_tx
            .send(WsCommand::Send {
                call: RpcCall::new(1, "eth_chainId", vec![]),
                tx,
            })
            .unwrap();
        drop(cmd_tx);

        let out = until_closed(time::sleep(Duration::from_secs(60)), &mut cmd_rx).await;
        assert!(out.is_none());
        assert!(matches!(rx.await.unwrap(), Err(TransportError::WebSocket(_))));
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let res = WsRpcClient::connect("ws://127.0.0.1:1", WsClientConfig::default()).await;
        assert!(matches!(res, Err(TransportError::WebSocket(_))));
    }
}
