//! The Broadcast Hub: registry of connected viewers and fan-out.
//!
//! Every viewer owns a bounded queue. [`BroadcastHub::broadcast`] pushes the
//! event's channel payload into each queue with `try_send`, so publishing
//! never waits on a viewer:
//!
//! - a full queue drops the message for that viewer only;
//! - a closed queue (the viewer went away) is pruned from the registry.
//!
//! Neither case is reported to the caller as an error. Viewers receive only
//! what is published after they connect; there is no replay.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use panel_core::ChangeSink;
use panel_types::{ChangeEvent, ChannelMessage, ViewerId};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// Default number of messages buffered per viewer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Outcome of one fan-out, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Viewers the message was queued for.
    pub delivered: usize,
    /// Viewers whose queue was full.
    pub dropped: usize,
    /// Viewers found disconnected and removed.
    pub pruned: usize,
}

/// The receiving end of one viewer's registration.
///
/// Held by the connection task for the connection's lifetime.
#[derive(Debug)]
pub struct ViewerConnection {
    id: ViewerId,
    rx: mpsc::Receiver<ChannelMessage>,
}

impl ViewerConnection {
    /// Identifier assigned by the hub.
    pub const fn id(&self) -> ViewerId {
        self.id
    }

    /// Wait for the next message. `None` once the hub has dropped this viewer.
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        self.rx.recv().await
    }

    /// Take the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<ChannelMessage> {
        self.rx.try_recv().ok()
    }
}

/// Registry of live viewer connections.
#[derive(Debug)]
pub struct BroadcastHub {
    viewers: RwLock<BTreeMap<ViewerId, mpsc::Sender<ChannelMessage>>>,
    capacity: usize,
}

impl BroadcastHub {
    /// Create a hub that buffers up to `capacity` messages per viewer.
    pub fn new(capacity: usize) -> Self {
        Self {
            viewers: RwLock::new(BTreeMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a new viewer.
    pub fn connect(&self) -> ViewerConnection {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = ViewerId::new();
        self.viewers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        ViewerConnection { id, rx }
    }

    /// Remove a viewer. Returns whether it was still registered.
    pub fn disconnect(&self, id: ViewerId) -> bool {
        self.viewers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    /// Number of registered viewers.
    pub fn viewer_count(&self) -> usize {
        self.viewers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Queue `message` for every registered viewer.
    pub fn send_all(&self, message: ChannelMessage) -> PublishReport {
        let mut report = PublishReport::default();
        self.viewers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|id, tx| match tx.try_send(message) {
                Ok(()) => {
                    report.delivered = report.delivered.saturating_add(1);
                    true
                }
                Err(TrySendError::Full(_)) => {
                    debug!(viewer = %id, "viewer queue full, message dropped");
                    report.dropped = report.dropped.saturating_add(1);
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    report.pruned = report.pruned.saturating_add(1);
                    false
                }
            });
        report
    }

    /// Project `event` onto its channel and queue it for every viewer.
    pub fn broadcast(&self, event: &ChangeEvent) -> PublishReport {
        self.send_all(event.message())
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl ChangeSink for BroadcastHub {
    fn publish(&self, event: &ChangeEvent) {
        let report = self.broadcast(event);
        debug!(
            cycle = event.cycle,
            channel = %event.channel,
            delivered = report.delivered,
            dropped = report.dropped,
            pruned = report.pruned,
            "change broadcast"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use panel_types::{Channel, Field, PanelState};

    use super::*;

    fn event(channel: Channel, snapshot: PanelState) -> ChangeEvent {
        ChangeEvent {
            cycle: 1,
            channel,
            changed: vec![Field::Accelerator],
            snapshot,
        }
    }

    #[test]
    fn every_viewer_receives_the_projection() {
        let hub = BroadcastHub::default();
        let mut a = hub.connect();
        let mut b = hub.connect();

        let snapshot = PanelState {
            accelerator: 512,
            ..PanelState::default()
        };
        let report = hub.broadcast(&event(Channel::State, snapshot));
        assert_eq!(report.delivered, 2);

        let expected = ChannelMessage::State {
            accelerator: 512,
            brake: 0,
        };
        assert_eq!(a.try_recv(), Some(expected));
        assert_eq!(b.try_recv(), Some(expected));
    }

    #[test]
    fn no_replay_on_connect() {
        let hub = BroadcastHub::default();
        let _ = hub.broadcast(&event(Channel::Alert, PanelState::default()));
        let mut late = hub.connect();
        assert_eq!(late.try_recv(), None);
    }

    #[test]
    fn full_queue_drops_for_that_viewer_only() {
        let hub = BroadcastHub::new(1);
        let mut slow = hub.connect();
        let mut fast = hub.connect();

        let first = hub.broadcast(&event(Channel::State, PanelState::default()));
        assert_eq!(first.delivered, 2);
        assert!(fast.try_recv().is_some());

        let second = hub.broadcast(&event(Channel::Alert, PanelState::default()));
        assert_eq!(second.delivered, 1);
        assert_eq!(second.dropped, 1);
        assert_eq!(fast.try_recv().map(|m| m.channel()), Some(Channel::Alert));
        assert_eq!(slow.try_recv().map(|m| m.channel()), Some(Channel::State));
        assert_eq!(hub.viewer_count(), 2);
    }

    #[test]
    fn closed_viewer_is_pruned() {
        let hub = BroadcastHub::default();
        let gone = hub.connect();
        let mut live = hub.connect();
        drop(gone);

        let report = hub.broadcast(&event(Channel::State, PanelState::default()));
        assert_eq!(report.pruned, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(hub.viewer_count(), 1);
        assert!(live.try_recv().is_some());
    }

    #[test]
    fn disconnect_removes_registration() {
        let hub = BroadcastHub::default();
        let viewer = hub.connect();
        assert!(hub.disconnect(viewer.id()));
        assert!(!hub.disconnect(viewer.id()));
        assert_eq!(hub.viewer_count(), 0);
    }

    #[test]
    fn publish_with_no_viewers_is_fine() {
        let hub = BroadcastHub::default();
        ChangeSink::publish(&hub, &event(Channel::State, PanelState::default()));
        assert_eq!(hub.viewer_count(), 0);
    }
}
