//! Position publishing boundary between the simulator and its consumers.
//!
//! Built on a `tokio::sync::watch` slot: publishing never blocks and never
//! queues, so a slow consumer simply sees the most recent snapshot. Every
//! snapshot a consumer receives is its own copy.

use serde::Serialize;
use tokio::sync::watch;

use crate::graph::NodeId;

/// Node positions at one publish instant, indexed by node slot (`id - 1`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    /// Graph generation; bumped by every `init`/`set_graph`.
    pub epoch: u64,
    /// Publish counter within the simulator's lifetime.
    pub sequence: u64,
    /// X coordinates.
    pub x: Vec<f32>,
    /// Y coordinates.
    pub y: Vec<f32>,
}

impl PositionSnapshot {
    /// Number of nodes in the snapshot.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if the snapshot holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Position of a node, if it is part of the snapshot.
    pub fn position(&self, id: NodeId) -> Option<(f32, f32)> {
        let i = id.index(self.len())?;
        Some((self.x[i], *self.y.get(i)?))
    }
}

/// Publishing side of the channel, owned by the simulator host.
#[derive(Debug)]
pub struct PositionChannel {
    tx: watch::Sender<Option<PositionSnapshot>>,
}

impl PositionChannel {
    /// Create a channel with no snapshot yet.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current snapshot. Never blocks, never fails, and works
    /// with zero subscribers.
    pub fn publish(&self, snapshot: PositionSnapshot) {
        self.tx.send_replace(Some(snapshot));
    }

    /// Attach a consumer. It only observes snapshots published from now on.
    pub fn subscribe(&self) -> PositionReceiver {
        PositionReceiver {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live consumers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for PositionChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Consuming side of the channel.
#[derive(Debug, Clone)]
pub struct PositionReceiver {
    rx: watch::Receiver<Option<PositionSnapshot>>,
}

impl PositionReceiver {
    /// Wait for the next snapshot newer than the last one seen.
    ///
    /// Returns `None` once the publisher is gone.
    pub async fn recv(&mut self) -> Option<PositionSnapshot> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(snapshot) = self.rx.borrow_and_update().clone() {
                return Some(snapshot);
            }
        }
    }

    /// Take the latest snapshot if one arrived since the last call.
    pub fn try_recv(&mut self) -> Option<PositionSnapshot> {
        if !self.rx.has_changed().unwrap_or(false) {
            return None;
        }
        self.rx.borrow_and_update().clone()
    }
}
