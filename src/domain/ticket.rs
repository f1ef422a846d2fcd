//! Reservation / purchase records and the seat-activity predicate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, Money, SeatId, SeatKey, SectionId, TicketId, UserId};

/// Minutes a pending ticket holds its seat.
pub const RESERVATION_HOLD_MINUTES: i64 = 15;

/// Hold window applied uniformly to every seat of a successful request.
#[must_use]
pub fn reservation_hold() -> Duration {
    Duration::minutes(RESERVATION_HOLD_MINUTES)
}

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Held for the user until `reserved_until`.
    Pending,
    /// Paid for; holds the seat permanently.
    Purchased,
}

impl TicketStatus {
    /// Returns the storage / wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Purchased => "purchased",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "purchased" => Ok(Self::Purchased),
            other => Err(format!("unknown ticket status: {other}")),
        }
    }
}

/// A seat claimed by a user.
///
/// Created by the reservation engine as [`TicketStatus::Pending`]. The
/// transition to [`TicketStatus::Purchased`] belongs to payment capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Storage-assigned identifier.
    pub id: TicketId,
    /// Owner of the hold.
    pub user_id: UserId,
    /// Event the seat belongs to.
    pub event_id: EventId,
    /// Section containing the seat.
    pub section_id: SectionId,
    /// Seat within the section.
    pub seat_id: SeatId,
    /// Lifecycle state.
    pub status: TicketStatus,
    /// End of the hold window for pending tickets.
    pub reserved_until: DateTime<Utc>,
    /// Price resolved from the event's pricing layout at claim time.
    pub price: Money,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Returns the seat this ticket occupies.
    #[must_use]
    pub const fn seat_key(&self) -> SeatKey {
        SeatKey::new(self.event_id, self.section_id, self.seat_id)
    }

    /// `true` if the ticket occupies its seat at `now`.
    ///
    /// Active means purchased, or pending with the hold window not yet
    /// elapsed. At most one active ticket may exist per seat.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            TicketStatus::Purchased => true,
            TicketStatus::Pending => self.reserved_until >= now,
        }
    }

    /// `true` if the ticket is a pending hold whose window has elapsed.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.status == TicketStatus::Pending && self.reserved_until < now
    }
}
