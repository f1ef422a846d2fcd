//! Domain layer: identifiers, seats, prices, and tickets.
//!
//! These types carry no storage or transport concerns. The reservation
//! engine in [`crate::service`] and both storage engines in
//! [`crate::persistence`] speak in terms of them.

pub mod ids;
pub mod money;
pub mod seat;
pub mod ticket;

pub use ids::{EventId, PricingLayoutId, SeatId, SectionId, TicketId, UserId};
pub use money::Money;
pub use seat::{SeatKey, SeatRequest};
pub use ticket::{RESERVATION_HOLD_MINUTES, Ticket, TicketStatus, reservation_hold};
