//! Listener set and broadcast primitive.
//!
//! [`Relay`] owns the set of connected listeners. Each entry holds only the
//! sending half of that listener's outbound queue; the connection task owns
//! the socket. Entries are added and removed exclusively by the connection
//! task's connect and close paths. Broadcast only reads the set.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use crate::domain::ListenerId;

/// Connection state of a listener as last observed by its connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// The socket accepts messages.
    Open,
    /// A send failed or the socket is closing; removal is pending.
    Closed,
}

/// Send-only handle to one listener.
#[derive(Debug)]
pub struct ListenerHandle {
    sender: mpsc::Sender<String>,
    state: ListenerState,
}

impl ListenerHandle {
    /// Wraps the sending half of a listener's outbound queue.
    #[must_use]
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self {
            sender,
            state: ListenerState::Open,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ListenerState {
        self.state
    }

    fn is_open(&self) -> bool {
        self.state == ListenerState::Open && !self.sender.is_closed()
    }
}

/// Mapping from listener id to handle. Iteration order is irrelevant.
#[derive(Debug, Default)]
pub struct ListenerSet {
    listeners: HashMap<ListenerId, ListenerHandle>,
}

impl ListenerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener.
    pub fn insert(&mut self, id: ListenerId, handle: ListenerHandle) {
        self.listeners.insert(id, handle);
    }

    /// Marks a listener closed without removing it.
    ///
    /// Returns `false` if the id is unknown.
    pub fn mark_closed(&mut self, id: ListenerId) -> bool {
        match self.listeners.get_mut(&id) {
            Some(handle) => {
                handle.state = ListenerState::Closed;
                true
            }
            None => false,
        }
    }

    /// Removes a listener, returning `true` if it was present.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// State of a listener, if present.
    #[must_use]
    pub fn state(&self, id: ListenerId) -> Option<ListenerState> {
        self.listeners.get(&id).map(ListenerHandle::state)
    }

    /// Number of tracked listeners, open or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if no listener is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Queues `text` for every open listener and returns how many accepted
    /// it. Closed listeners are skipped silently; a listener whose queue is
    /// full misses this message only.
    pub fn broadcast(&self, text: &str) -> usize {
        let mut delivered = 0;
        for (id, handle) in &self.listeners {
            if !handle.is_open() {
                continue;
            }
            match handle.sender.try_send(text.to_string()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(listener = %id, "listener queue full, message dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }
}

/// Local fan-out relay.
///
/// Cheap to clone; clones share the same listener set. Separate
/// `Relay::new` calls are fully independent.
#[derive(Debug, Clone)]
pub struct Relay {
    listeners: Arc<RwLock<ListenerSet>>,
    queue_capacity: usize,
}

impl Relay {
    /// Creates a relay whose listeners each buffer up to `queue_capacity`
    /// outbound messages.
    #[must_use]
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            listeners: Arc::new(RwLock::new(ListenerSet::new())),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Registers a new open listener and returns its id together with the
    /// receiving half of its outbound queue.
    pub async fn register(&self) -> (ListenerId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let id = ListenerId::new();
        self.listeners
            .write()
            .await
            .insert(id, ListenerHandle::new(tx));
        (id, rx)
    }

    /// Marks a listener closed; it stays in the set until [`Relay::remove`].
    pub async fn mark_closed(&self, id: ListenerId) -> bool {
        self.listeners.write().await.mark_closed(id)
    }

    /// Removes a listener.
    pub async fn remove(&self, id: ListenerId) -> bool {
        self.listeners.write().await.remove(id)
    }

    /// Sends `text` to every open listener; returns the delivery count.
    pub async fn broadcast(&self, text: &str) -> usize {
        self.listeners.read().await.broadcast(text)
    }

    /// Number of tracked listeners.
    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// State of one listener, if tracked.
    pub async fn listener_state(&self, id: ListenerId) -> Option<ListenerState> {
        self.listeners.read().await.state(id)
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(64)
    }
}
