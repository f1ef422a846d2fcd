//! # ticketing-gateway
//!
//! Ticket-sale backend whose core is a seat reservation engine: a
//! request for several seats of one event either holds all of them for
//! 15 minutes or holds none, under any amount of concurrent, overlapping
//! demand. Expired holds are reclaimed lazily, the next time someone
//! contends for the same seat.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── ReservationService (service/)      sort seats, one transaction
//!     │       for each seat: lock → reap stale → conditional insert
//!     │
//!     ├── ReservationStore / ReservationTx (persistence/)
//!     │       ├── PostgreSQL: advisory xact locks + INSERT … WHERE NOT EXISTS
//!     │       └── In-memory: SeatLockManager + staged write sets
//!     │
//!     └── Domain types (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
