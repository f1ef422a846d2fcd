//! Database row models for the `tickets` table.

use chrono::{DateTime, Utc};

use crate::domain::{EventId, Money, SeatId, SectionId, Ticket, TicketId, UserId};
use crate::error::GatewayError;

/// Column list every ticket query returns, matching [`TicketRow`].
///
/// A macro rather than a `const` so queries can be assembled with
/// `concat!` at compile time.
macro_rules! ticket_columns {
    () => {
        "id, user_id, event_id, section_id, seat_id, \
         status::text AS status, reserved_until, price_cents, created_at"
    };
}
pub(crate) use ticket_columns;

/// A row from the `tickets` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TicketRow {
    /// `BIGSERIAL` primary key.
    pub id: i64,
    /// Holder of the ticket.
    pub user_id: i64,
    /// Event the seat belongs to.
    pub event_id: i64,
    /// Section containing the seat.
    pub section_id: i64,
    /// Seat within the section.
    pub seat_id: i64,
    /// `ticket_status` enum rendered as text.
    pub status: String,
    /// End of the hold window.
    pub reserved_until: DateTime<Utc>,
    /// Price in cents; the column is constrained non-negative.
    pub price_cents: i64,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = GatewayError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(GatewayError::PersistenceError)?;
        let price = Money::from_storage(row.price_cents).ok_or_else(|| {
            GatewayError::PersistenceError(format!(
                "ticket {} has negative price {}",
                row.id, row.price_cents
            ))
        })?;
        Ok(Self {
            id: TicketId::new(row.id),
            user_id: UserId::new(row.user_id),
            event_id: EventId::new(row.event_id),
            section_id: SectionId::new(row.section_id),
            seat_id: SeatId::new(row.seat_id),
            status,
            reserved_until: row.reserved_until,
            price,
            created_at: row.created_at,
        })
    }
}
