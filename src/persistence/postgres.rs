//! PostgreSQL implementation of the reservation engine.
//!
//! Seat locks are transaction-scoped advisory locks
//! (`pg_advisory_xact_lock`) keyed by a 64-bit hash of the full
//! (event, section, seat) tuple, seeded with the [`LockDomain`]. Postgres
//! releases them at commit or rollback. Under `READ COMMITTED` each
//! statement issued after the lock is granted sees every change the
//! previous holder committed.

use async_trait::async_trait;
use chrono::Duration;
use sqlx::{PgPool, Postgres, Transaction};

use super::models::{TicketRow, ticket_columns};
use super::{LockDomain, ReservationStore, ReservationTx};
use crate::domain::{EventId, SeatKey, Ticket, UserId};
use crate::error::GatewayError;

const LOCK_SEAT: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, $2))";

const REAP_STALE: &str = "DELETE FROM tickets \
     WHERE event_id = $1 AND section_id = $2 AND seat_id = $3 \
       AND status = 'pending'::ticket_status AND reserved_until < NOW()";

// Availability check, price lookup, and insert in one statement: zero rows
// back means the seat is held or unpriced.
const CLAIM_IF_AVAILABLE: &str = concat!(
    "INSERT INTO tickets (user_id, event_id, section_id, seat_id, reserved_until, price_cents) \
     SELECT $1, e.id, $3, $4, NOW() + $5::bigint * INTERVAL '1 millisecond', sp.price_cents \
     FROM events e \
     JOIN seat_prices sp \
       ON sp.pricing_layout_id = e.pricing_layout_id \
      AND sp.section_id = $3 \
      AND sp.seat_id = $4 \
     WHERE e.id = $2 \
       AND NOT EXISTS ( \
           SELECT 1 FROM tickets t \
           WHERE t.event_id = $2 AND t.section_id = $3 AND t.seat_id = $4 \
             AND (t.status = 'purchased'::ticket_status OR t.reserved_until >= NOW()) \
       ) \
     RETURNING ",
    ticket_columns!()
);

const ACTIVE_TICKETS: &str = concat!(
    "SELECT ",
    ticket_columns!(),
    " FROM tickets \
     WHERE event_id = $1 \
       AND (status = 'purchased'::ticket_status OR reserved_until >= NOW()) \
     ORDER BY section_id, seat_id"
);

/// PostgreSQL-backed reservation store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), GatewayError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn begin(&self) -> Result<Box<dyn ReservationTx>, GatewayError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgReservationTx { tx: Some(tx) }))
    }

    async fn active_tickets(&self, event_id: EventId) -> Result<Vec<Ticket>, GatewayError> {
        let rows = sqlx::query_as::<_, TicketRow>(ACTIVE_TICKETS)
            .bind(event_id.get())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Ticket::try_from).collect()
    }
}

/// Open transaction on a [`PgReservationStore`].
///
/// Dropping it while open rolls the transaction back.
struct PgReservationTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgReservationTx {
    fn open(&mut self) -> Result<&mut Transaction<'static, Postgres>, GatewayError> {
        self.tx
            .as_mut()
            .ok_or_else(|| GatewayError::Internal("transaction already finished".to_string()))
    }
}

#[async_trait]
impl ReservationTx for PgReservationTx {
    async fn lock_seat(&mut self, domain: LockDomain, key: &SeatKey) -> Result<(), GatewayError> {
        let tx = self.open()?;
        sqlx::query(LOCK_SEAT)
            .bind(key.lock_text())
            .bind(domain.id())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn reap_stale(&mut self, key: &SeatKey) -> Result<u64, GatewayError> {
        let tx = self.open()?;
        let result = sqlx::query(REAP_STALE)
            .bind(key.event_id.get())
            .bind(key.section_id.get())
            .bind(key.seat_id.get())
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn claim_if_available(
        &mut self,
        user_id: UserId,
        key: &SeatKey,
        hold: Duration,
    ) -> Result<Option<Ticket>, GatewayError> {
        let tx = self.open()?;
        let row = sqlx::query_as::<_, TicketRow>(CLAIM_IF_AVAILABLE)
            .bind(user_id.get())
            .bind(key.event_id.get())
            .bind(key.section_id.get())
            .bind(key.seat_id.get())
            .bind(hold.num_milliseconds())
            .fetch_optional(&mut **tx)
            .await?;
        row.map(Ticket::try_from).transpose()
    }

    async fn commit(&mut self) -> Result<(), GatewayError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| GatewayError::Internal("transaction already finished".to_string()))?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), GatewayError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| GatewayError::Internal("transaction already finished".to_string()))?;
        tx.rollback().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_queries_return_every_row_column() {
        for sql in [CLAIM_IF_AVAILABLE, ACTIVE_TICKETS] {
            assert!(sql.contains("status::text AS status"));
            assert!(sql.contains("price_cents, created_at"));
        }
        assert!(CLAIM_IF_AVAILABLE.ends_with("reserved_until, price_cents, created_at"));
        assert!(ACTIVE_TICKETS.starts_with("SELECT id, user_id, event_id,"));
        assert!(ACTIVE_TICKETS.contains("created_at FROM tickets"));
    }
}
