//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::ReservationService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Reservation engine.
    pub reservation_service: Arc<ReservationService>,
    /// Upper bound on seats in one reservation request.
    pub max_seats_per_request: usize,
}
