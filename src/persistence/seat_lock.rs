//! In-process transaction-scoped keyed mutex.
//!
//! [`SeatLockManager`] maps each `(LockDomain, SeatKey)` to its own
//! [`tokio::sync::Mutex`]. A transaction holds one [`SeatLockGuard`] per
//! seat it touches and drops them all when it commits or rolls back, which
//! gives the same guarantees as a database's transaction-scoped advisory
//! lock for engines that have none.
//!
//! # Concurrency
//!
//! - Transactions contending for the same key are fully serialized.
//! - Different keys never contend.
//! - Slots are created on first use and pruned when the last holder or
//!   waiter goes away, including waiters that are cancelled mid-wait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

use super::LockDomain;
use crate::domain::SeatKey;

type Slot = Arc<tokio::sync::Mutex<()>>;

/// Registry of per-seat mutexes.
#[derive(Debug, Default)]
pub struct SeatLockManager {
    slots: Mutex<HashMap<(LockDomain, SeatKey), Slot>>,
}

impl SeatLockManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other guard exists for `key`, then returns one.
    ///
    /// The lock is released when the returned guard is dropped.
    pub async fn acquire(self: &Arc<Self>, domain: LockDomain, key: SeatKey) -> SeatLockGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry((domain, key)).or_default())
        };
        let mut pending = PendingAcquire {
            manager: self,
            slot_key: (domain, key),
            waiting: true,
        };
        let guard = slot.lock_owned().await;
        pending.waiting = false;
        SeatLockGuard {
            manager: Arc::clone(self),
            domain,
            key,
            guard: Some(guard),
        }
    }

    /// Removes the slot for `slot_key` if at most `refs` references to it
    /// remain, the map's own included.
    fn prune(
        slots: &mut HashMap<(LockDomain, SeatKey), Slot>,
        slot_key: &(LockDomain, SeatKey),
        refs: usize,
    ) {
        if slots
            .get(slot_key)
            .is_some_and(|slot| Arc::strong_count(slot) <= refs)
        {
            slots.remove(slot_key);
        }
    }

    /// Number of keys currently held or waited on.
    #[must_use]
    pub fn active_slots(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive hold on one seat key.
#[derive(Debug)]
pub struct SeatLockGuard {
    manager: Arc<SeatLockManager>,
    domain: LockDomain,
    key: SeatKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SeatLockGuard {
    /// The seat this guard holds.
    #[must_use]
    pub const fn key(&self) -> &SeatKey {
        &self.key
    }
}

impl Drop for SeatLockGuard {
    fn drop(&mut self) {
        let mut slots = self
            .manager
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference lives in the map and one in our guard; anything
        // beyond that is a waiter that still needs the slot.
        SeatLockManager::prune(&mut slots, &(self.domain, self.key), 2);
        // Release while the map is locked so a new acquirer cannot create a
        // fresh slot for this key before the old one is free.
        self.guard.take();
    }
}

/// Cleans up after a [`SeatLockManager::acquire`] future that is dropped
/// while still queued. The released holder may have left the slot in place
/// for this waiter, so the waiter prunes it on the way out.
struct PendingAcquire<'a> {
    manager: &'a SeatLockManager,
    slot_key: (LockDomain, SeatKey),
    waiting: bool,
}

impl Drop for PendingAcquire<'_> {
    fn drop(&mut self) {
        if !self.waiting {
            return;
        }
        let mut slots = self
            .manager
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // The abandoned lock future has already released its reference.
        SeatLockManager::prune(&mut slots, &self.slot_key, 1);
    }
}
