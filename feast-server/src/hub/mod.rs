//! Kitchen broadcast hub
//!
//! A single-writer actor owning the set of live kitchen-display
//! connections. The connection map is touched only by the run loop;
//! registration, removal and broadcasting all go through the actor's
//! inbox, so no lock is needed and the set can never be mutated while
//! it is being iterated.

use std::collections::HashMap;

use shared::error::{AppError, AppResult};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Outbound message for one display connection
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionMessage {
    /// Payload bytes to forward verbatim
    Data(Vec<u8>),
    /// The hub is shutting down; close the connection
    Close,
}

/// Handle to one live display connection
///
/// The transport side (websocket task) drains the receiving end; the
/// hub only ever sees the sender.
#[derive(Debug)]
pub struct DisplayConnection {
    pub id: i64,
    sender: mpsc::Sender<ConnectionMessage>,
}

impl DisplayConnection {
    pub fn new(id: i64, sender: mpsc::Sender<ConnectionMessage>) -> Self {
        Self { id, sender }
    }
}

enum HubCommand {
    Register(DisplayConnection),
    Unregister(i64),
    Broadcast(Vec<u8>),
    Count(oneshot::Sender<usize>),
}

/// Cloneable handle to the hub actor
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub async fn register(&self, conn: DisplayConnection) -> AppResult<()> {
        self.send(HubCommand::Register(conn)).await
    }

    pub async fn unregister(&self, connection_id: i64) -> AppResult<()> {
        self.send(HubCommand::Unregister(connection_id)).await
    }

    /// Relay a payload to every connected display.
    pub async fn broadcast(&self, payload: Vec<u8>) -> AppResult<()> {
        self.send(HubCommand::Broadcast(payload)).await
    }

    /// Number of currently registered connections.
    pub async fn connection_count(&self) -> AppResult<usize> {
        let (tx, rx) = oneshot::channel();
        self.send(HubCommand::Count(tx)).await?;
        rx.await
            .map_err(|_| AppError::internal("Hub stopped before answering"))
    }

    async fn send(&self, cmd: HubCommand) -> AppResult<()> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| AppError::internal("Kitchen hub is not running"))
    }
}

/// The hub actor
pub struct KitchenHub {
    inbox: mpsc::Receiver<HubCommand>,
    /// Loopback sender used to self-enqueue unregistrations found
    /// during a broadcast pass.
    loopback: mpsc::Sender<HubCommand>,
    connections: HashMap<i64, DisplayConnection>,
    shutdown: CancellationToken,
}

impl KitchenHub {
    /// Inbox capacity; sized for command traffic, not payload volume.
    const INBOX_CAPACITY: usize = 256;

    pub fn new(shutdown: CancellationToken) -> (HubHandle, KitchenHub) {
        let (tx, rx) = mpsc::channel(Self::INBOX_CAPACITY);
        let hub = KitchenHub {
            inbox: rx,
            loopback: tx.clone(),
            connections: HashMap::new(),
            shutdown,
        };
        (HubHandle { tx }, hub)
    }

    /// Run loop. Single-threaded cooperative: all mutation of the
    /// connection set happens here.
    pub async fn run(mut self) {
        tracing::info!("Kitchen hub started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    self.close_all();
                    break;
                }

                cmd = self.inbox.recv() => match cmd {
                    Some(HubCommand::Register(conn)) => {
                        tracing::info!(connection = conn.id, "Display connected");
                        self.connections.insert(conn.id, conn);
                    }
                    Some(HubCommand::Unregister(id)) => {
                        if self.connections.remove(&id).is_some() {
                            tracing::info!(connection = id, "Display disconnected");
                        }
                    }
                    Some(HubCommand::Broadcast(payload)) => {
                        self.broadcast(payload);
                    }
                    Some(HubCommand::Count(reply)) => {
                        let _ = reply.send(self.connections.len());
                    }
                    None => {
                        self.close_all();
                        break;
                    }
                }
            }
        }

        tracing::info!("Kitchen hub stopped");
    }

    fn broadcast(&mut self, payload: Vec<u8>) {
        for (id, conn) in &self.connections {
            match conn.sender.try_send(ConnectionMessage::Data(payload.clone())) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    // Slow display: the frame is dropped, the connection
                    // stays; item ids let the display reconcile later.
                    tracing::warn!(connection = id, "Display outbox full, frame dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    // Dead connection: removal goes back through the
                    // inbox rather than mutating the map mid-iteration.
                    let _ = self.loopback.try_send(HubCommand::Unregister(*id));
                }
            }
        }
    }

    fn close_all(&mut self) {
        for (_, conn) in self.connections.drain() {
            let _ = conn.sender.try_send(ConnectionMessage::Close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn spawn_hub() -> (HubHandle, CancellationToken) {
        let token = CancellationToken::new();
        let (handle, hub) = KitchenHub::new(token.clone());
        tokio::spawn(hub.run());
        (handle, token)
    }

    async fn recv(
        rx: &mut mpsc::Receiver<ConnectionMessage>,
    ) -> ConnectionMessage {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out")
            .expect("connection channel closed")
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection_exactly_once() {
        let (handle, _token) = spawn_hub().await;

        let mut receivers = Vec::new();
        for id in 1..=3 {
            let (tx, rx) = mpsc::channel(8);
            handle
                .register(DisplayConnection::new(id, tx))
                .await
                .unwrap();
            receivers.push(rx);
        }

        handle.broadcast(b"M".to_vec()).await.unwrap();

        for rx in &mut receivers {
            assert_eq!(recv(rx).await, ConnectionMessage::Data(b"M".to_vec()));
            assert!(rx.try_recv().is_err(), "received more than once");
        }
    }

    #[tokio::test]
    async fn dead_connection_is_pruned_and_survivors_keep_receiving() {
        let (handle, _token) = spawn_hub().await;

        let (tx1, rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        let (tx3, mut rx3) = mpsc::channel(8);
        handle.register(DisplayConnection::new(1, tx1)).await.unwrap();
        handle.register(DisplayConnection::new(2, tx2)).await.unwrap();
        handle.register(DisplayConnection::new(3, tx3)).await.unwrap();

        // Kill connection 1, then broadcast: the write failure queues a
        // self-unregister.
        drop(rx1);
        handle.broadcast(b"first".to_vec()).await.unwrap();
        assert_eq!(recv(&mut rx2).await, ConnectionMessage::Data(b"first".to_vec()));
        assert_eq!(recv(&mut rx3).await, ConnectionMessage::Data(b"first".to_vec()));

        // Give the loopback unregister a chance to drain, then verify.
        let count = handle.connection_count().await.unwrap();
        assert_eq!(count, 2);

        handle.broadcast(b"second".to_vec()).await.unwrap();
        assert_eq!(recv(&mut rx2).await, ConnectionMessage::Data(b"second".to_vec()));
        assert_eq!(recv(&mut rx3).await, ConnectionMessage::Data(b"second".to_vec()));
    }

    #[tokio::test]
    async fn shutdown_sends_close_to_every_connection() {
        let (handle, token) = spawn_hub().await;

        let (tx, mut rx) = mpsc::channel(8);
        handle.register(DisplayConnection::new(1, tx)).await.unwrap();

        token.cancel();
        assert_eq!(recv(&mut rx).await, ConnectionMessage::Close);
    }
}
