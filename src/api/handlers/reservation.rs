//! Seat reservation endpoint handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{EventTicketsResponse, ReserveSeatsRequest, ReserveSeatsResponse, TicketDto};
use crate::api::identity::AuthenticatedUser;
use crate::app_state::AppState;
use crate::domain::{EventId, SeatRequest};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /events/{event_id}/reservations` — Hold seats for 15 minutes.
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed path or body, an empty or
/// oversized seat list, a missing identity, an unavailable seat, or a
/// storage failure.
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/reservations",
    tag = "Reservations",
    summary = "Reserve seats",
    description = "Places a 15-minute hold on every requested seat, or on none of them if any seat is taken or unpriced.",
    params(
        ("event_id" = i64, Path, description = "Event identifier"),
        ("x-user-id" = i64, Header, description = "Authenticated user id forwarded by the auth proxy"),
    ),
    request_body = ReserveSeatsRequest,
    responses(
        (status = 201, description = "All seats reserved", body = ReserveSeatsResponse),
        (status = 400, description = "Malformed body, or an empty or oversized seat list", body = ErrorResponse),
        (status = 401, description = "Missing user identity", body = ErrorResponse),
        (status = 409, description = "A seat is unavailable; nothing was reserved", body = ErrorResponse),
    )
)]
pub async fn reserve_seats(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    event_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ReserveSeatsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Path(event_id) = event_id?;
    let Json(req) = body?;
    if req.seats.len() > state.max_seats_per_request {
        return Err(GatewayError::InvalidRequest(format!(
            "at most {} seats per request",
            state.max_seats_per_request
        )));
    }
    let seats: Vec<SeatRequest> = req.seats.into_iter().map(SeatRequest::from).collect();

    let tickets = state
        .reservation_service
        .reserve(user_id, EventId::new(event_id), &seats)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReserveSeatsResponse {
            tickets: tickets.iter().map(TicketDto::from).collect(),
        }),
    ))
}

/// `GET /events/{event_id}/tickets` — Tickets currently holding seats.
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed event id or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/tickets",
    tag = "Reservations",
    summary = "List active tickets",
    description = "Returns every purchased ticket and every pending ticket whose hold has not expired.",
    params(
        ("event_id" = i64, Path, description = "Event identifier"),
    ),
    responses(
        (status = 200, description = "Active tickets", body = EventTicketsResponse),
        (status = 400, description = "Malformed event id", body = ErrorResponse),
    )
)]
pub async fn event_tickets(
    State(state): State<AppState>,
    event_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Path(event_id) = event_id?;
    let tickets = state
        .reservation_service
        .active_tickets(EventId::new(event_id))
        .await?;

    Ok(Json(EventTicketsResponse {
        event_id,
        tickets: tickets.iter().map(TicketDto::from).collect(),
    }))
}

/// Reservation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/{event_id}/reservations", post(reserve_seats))
        .route("/events/{event_id}/tickets", get(event_tickets))
}
