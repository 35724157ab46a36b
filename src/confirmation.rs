//! Waiting for an invoker to confirm an error marker.
//!
//! Each wait is keyed on the message, the reaction symbol and the user that
//! must react. Incoming reactions are offered to the registry; the first of
//! "matching reaction" or "deadline" to claim a wait resolves it, and the
//! other side then finds nothing to claim.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use serenity::all::{MessageId, Reaction, UserId};
use tokio::time::Instant;

use crate::util;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WaitKey {
    pub message_id: MessageId,
    pub symbol: String,
    pub user_id: UserId,
}

/// A reaction added by someone, reduced to what waits are matched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub message_id: MessageId,
    pub user_id: UserId,
    pub symbol: String,
}

impl ReactionEvent {
    /// Returns `None` for reactions without a known user.
    pub fn from_reaction(reaction: &Reaction) -> Option<Self> {
        Some(Self {
            message_id: reaction.message_id,
            user_id: reaction.user_id?,
            symbol: reaction.emoji.to_string(),
        })
    }

    fn key(&self) -> WaitKey {
        WaitKey {
            message_id: self.message_id,
            symbol: self.symbol.clone(),
            user_id: self.user_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Confirmed,
    TimedOut,
}

struct Entry {
    id: u64,
    deadline: Instant,
    confirm_tx: flume::Sender<()>,
}

/// The set of confirmations currently being waited for.
#[derive(Default)]
pub struct Confirmations {
    waits: Mutex<HashMap<WaitKey, Entry>>,
    next_id: AtomicU64,
}

impl Confirmations {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Starts waiting for `key` until `timeout` from now.
    ///
    /// Returns `None` if an identical wait is already active.
    pub fn register(self: &Arc<Self>, key: WaitKey, timeout: Duration) -> Option<PendingConfirmation> {
        let mut waits = self.waits();
        if waits.contains_key(&key) {
            return None;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let deadline = util::deadline_after(timeout);
        let (confirm_tx, confirm_rx) = flume::bounded(1);
        waits.insert(
            key.clone(),
            Entry {
                id,
                deadline,
                confirm_tx,
            },
        );

        Some(PendingConfirmation {
            registry: self.clone(),
            key,
            id,
            deadline,
            confirm_rx,
        })
    }

    /// Offers a reaction to the active waits. Returns whether it resolved one.
    ///
    /// Only an exact match on message, symbol and user counts, and only
    /// strictly before the wait's deadline. Anything else leaves the waits
    /// untouched.
    pub fn offer(&self, event: &ReactionEvent) -> bool {
        let key = event.key();
        let mut waits = self.waits();
        match waits.get(&key) {
            Some(entry) if Instant::now() < entry.deadline => {}
            _ => return false,
        }

        if let Some(entry) = waits.remove(&key) {
            entry.confirm_tx.send(()).ok();
        }
        true
    }

    pub fn active(&self) -> usize {
        self.waits().len()
    }

    /// Removes the wait if it is still the one registered as `id`.
    fn claim(&self, key: &WaitKey, id: u64) -> bool {
        let mut waits = self.waits();
        if waits.get(key).is_some_and(|e| e.id == id) {
            waits.remove(key);
            true
        } else {
            false
        }
    }

    fn waits(&self) -> MutexGuard<'_, HashMap<WaitKey, Entry>> {
        self.waits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A registered wait. Dropping it without waiting withdraws the wait.
pub struct PendingConfirmation {
    registry: Arc<Confirmations>,
    key: WaitKey,
    id: u64,
    deadline: Instant,
    confirm_rx: flume::Receiver<()>,
}

impl PendingConfirmation {
    #[cfg(test)]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Suspends until the wait is confirmed or its deadline passes.
    pub async fn wait(self) -> Resolution {
        let received = tokio::time::timeout_at(self.deadline, self.confirm_rx.recv_async()).await;
        if let Ok(Ok(())) = received {
            return Resolution::Confirmed;
        }

        // A matching reaction may have claimed the wait just as the deadline hit.
        if self.registry.claim(&self.key, self.id) {
            Resolution::TimedOut
        } else {
            Resolution::Confirmed
        }
    }
}

impl Drop for PendingConfirmation {
    fn drop(&mut self) {
        self.registry.claim(&self.key, self.id);
    }
}
