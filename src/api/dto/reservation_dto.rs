//! Reservation request and ticket response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{SeatId, SeatRequest, SectionId, Ticket};

/// One seat in a reservation request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct SeatSelectionDto {
    /// Section containing the seat.
    pub section_id: i64,
    /// Seat within the section.
    pub seat_id: i64,
}

impl From<SeatSelectionDto> for SeatRequest {
    fn from(dto: SeatSelectionDto) -> Self {
        Self::new(SectionId::new(dto.section_id), SeatId::new(dto.seat_id))
    }
}

/// Request body for `POST /events/{event_id}/reservations`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReserveSeatsRequest {
    /// Seats to hold. Order is irrelevant; all or none are reserved.
    pub seats: Vec<SeatSelectionDto>,
}

/// A ticket as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketDto {
    /// Ticket identifier.
    pub id: i64,
    /// Holder of the ticket.
    pub user_id: i64,
    /// Event the seat belongs to.
    pub event_id: i64,
    /// Section containing the seat.
    pub section_id: i64,
    /// Seat within the section.
    pub seat_id: i64,
    /// `"pending"` or `"purchased"`.
    pub status: String,
    /// End of the hold window.
    pub reserved_until: DateTime<Utc>,
    /// Price as a decimal string.
    pub price: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Ticket> for TicketDto {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id.get(),
            user_id: ticket.user_id.get(),
            event_id: ticket.event_id.get(),
            section_id: ticket.section_id.get(),
            seat_id: ticket.seat_id.get(),
            status: ticket.status.to_string(),
            reserved_until: ticket.reserved_until,
            price: ticket.price.to_string(),
            created_at: ticket.created_at,
        }
    }
}

/// Response body for `POST /events/{event_id}/reservations`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReserveSeatsResponse {
    /// One pending ticket per requested seat, ordered by section then seat.
    pub tickets: Vec<TicketDto>,
}

/// Response body for `GET /events/{event_id}/tickets`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventTicketsResponse {
    /// Event queried.
    pub event_id: i64,
    /// Tickets currently holding a seat.
    pub tickets: Vec<TicketDto>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{EventId, Money, TicketId, TicketStatus, UserId};

    #[test]
    fn request_parses_seat_list() {
        let body = r#"{"seats":[{"section_id":1,"seat_id":7},{"section_id":2,"seat_id":3}]}"#;
        let Ok(req) = serde_json::from_str::<ReserveSeatsRequest>(body) else {
            panic!("parse failed");
        };
        let seats: Vec<SeatRequest> = req.seats.into_iter().map(SeatRequest::from).collect();
        assert_eq!(
            seats,
            vec![
                SeatRequest::new(SectionId::new(1), SeatId::new(7)),
                SeatRequest::new(SectionId::new(2), SeatId::new(3)),
            ]
        );
    }

    #[test]
    fn ticket_renders_price_and_status_as_strings() {
        let now = Utc::now();
        let ticket = Ticket {
            id: TicketId::new(1),
            user_id: UserId::new(2),
            event_id: EventId::new(3),
            section_id: SectionId::new(4),
            seat_id: SeatId::new(5),
            status: TicketStatus::Pending,
            reserved_until: now,
            price: Money::from_cents(4250),
            created_at: now,
        };
        let dto = TicketDto::from(&ticket);
        assert_eq!(dto.price, "42.50");
        assert_eq!(dto.status, "pending");
        assert_eq!(dto.seat_id, 5);
    }
}
