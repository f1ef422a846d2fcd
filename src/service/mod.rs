//! Service layer: business logic orchestration.
//!
//! [`ReservationService`] drives the seat reservation protocol over any
//! [`crate::persistence::ReservationStore`].

pub mod reservation_service;

pub use reservation_service::ReservationService;
