//! Persistence layer: transactional seat storage.
//!
//! The reservation engine talks to storage through two object-safe
//! traits. [`ReservationStore`] opens transactions and serves reads;
//! [`ReservationTx`] exposes the three per-seat primitives the engine
//! drives under one transaction:
//!
//! 1. [`ReservationTx::lock_seat`]: transaction-scoped keyed mutex.
//! 2. [`ReservationTx::reap_stale`]: delete expired pending holds.
//! 3. [`ReservationTx::claim_if_available`]: atomic check-and-insert.
//!
//! Two engines implement them: [`postgres::PgReservationStore`] on
//! advisory locks and [`memory::InMemoryStore`] on an in-process
//! [`seat_lock::SeatLockManager`].

pub mod memory;
pub mod models;
pub mod postgres;
pub mod seat_lock;

use std::fmt;

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::{EventId, SeatKey, Ticket, UserId};
use crate::error::GatewayError;

pub use memory::InMemoryStore;
pub use postgres::PgReservationStore;

/// Namespace for seat locks so unrelated lock users of the same engine
/// never collide with ticket locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockDomain {
    /// Seat holds on the ticket table.
    Tickets,
}

impl LockDomain {
    /// Numeric namespace passed to the storage engine.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Tickets => 1,
        }
    }
}

/// Source of reservation transactions and ticket reads.
#[async_trait]
pub trait ReservationStore: Send + Sync + fmt::Debug {
    /// Opens a new transaction.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the engine cannot
    /// start a transaction.
    async fn begin(&self) -> Result<Box<dyn ReservationTx>, GatewayError>;

    /// Returns every ticket currently active for the event, ordered by
    /// section then seat.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn active_tickets(&self, event_id: EventId) -> Result<Vec<Ticket>, GatewayError>;
}

/// One open reservation transaction.
///
/// Locks acquired through [`Self::lock_seat`] are held until the
/// transaction commits, rolls back, or is dropped. Dropping an open
/// transaction rolls it back.
#[async_trait]
pub trait ReservationTx: Send {
    /// Blocks until no other transaction holds the lock for `key`, then
    /// takes it for the rest of this transaction. Re-acquiring a key this
    /// transaction already holds returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn lock_seat(&mut self, domain: LockDomain, key: &SeatKey) -> Result<(), GatewayError>;

    /// Deletes pending tickets for exactly this seat whose hold window has
    /// elapsed. Purchased tickets are never touched. Returns the number of
    /// tickets removed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn reap_stale(&mut self, key: &SeatKey) -> Result<u64, GatewayError>;

    /// Inserts a pending ticket for `user_id` only if the seat has no
    /// active ticket and the event's pricing layout prices the seat.
    /// Check and insert are one atomic operation. Returns `None` when
    /// nothing was inserted.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn claim_if_available(
        &mut self,
        user_id: UserId,
        key: &SeatKey,
        hold: Duration,
    ) -> Result<Option<Ticket>, GatewayError>;

    /// Makes every write of this transaction visible and releases its
    /// locks.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the commit fails, in
    /// which case nothing was written.
    async fn commit(&mut self) -> Result<(), GatewayError>;

    /// Discards every write of this transaction and releases its locks.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the engine reports a
    /// rollback failure.
    async fn rollback(&mut self) -> Result<(), GatewayError>;
}
