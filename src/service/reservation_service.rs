//! Reservation service: all-or-nothing multi-seat holds.

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::domain::{EventId, SeatKey, SeatRequest, Ticket, UserId, reservation_hold};
use crate::error::GatewayError;
use crate::persistence::{LockDomain, ReservationStore, ReservationTx};

/// Orchestrates seat reservations.
///
/// Every call to [`Self::reserve`] runs in one storage transaction:
/// sort the seats, then for each seat lock → reap stale holds → claim.
/// The first seat that cannot be claimed aborts the transaction, so a
/// request is either fully reserved or leaves no trace.
#[derive(Debug, Clone)]
pub struct ReservationService {
    store: Arc<dyn ReservationStore>,
    hold: Duration,
}

impl ReservationService {
    /// Creates a service with the standard 15-minute hold window.
    #[must_use]
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self {
            store,
            hold: reservation_hold(),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ReservationStore> {
        &self.store
    }

    /// Reserves every seat in `seats` for `user_id`, or none of them.
    ///
    /// Seats are processed in ascending [`SeatKey`] order regardless of the
    /// order given, which is what keeps concurrent overlapping requests
    /// free of lock cycles. Returned tickets follow that same order and
    /// share one hold window.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidRequest`] if `seats` is empty.
    /// - [`GatewayError::SeatUnavailable`] naming the first seat (in sorted
    ///   order) that is actively held or unpriced.
    /// - [`GatewayError::TransactionAborted`] on a storage failure after
    ///   the transaction opened; nothing was persisted.
    /// - [`GatewayError::PersistenceError`] if no transaction could be
    ///   opened.
    pub async fn reserve(
        &self,
        user_id: UserId,
        event_id: EventId,
        seats: &[SeatRequest],
    ) -> Result<Vec<Ticket>, GatewayError> {
        if seats.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "at least one seat is required".to_string(),
            ));
        }

        let mut keys: Vec<SeatKey> = seats
            .iter()
            .map(|seat| SeatKey::for_request(event_id, *seat))
            .collect();
        keys.sort_unstable();

        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, %user_id, %event_id, seats = keys.len(), "reservation started");

        let mut tx = self.store.begin().await?;
        match self.claim_all(tx.as_mut(), user_id, &keys).await {
            Ok(tickets) => {
                tx.commit().await.map_err(GatewayError::into_aborted)?;
                tracing::info!(%request_id, %user_id, %event_id, seats = tickets.len(), "seats reserved");
                Ok(tickets)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(%request_id, error = %rollback_err, "rollback failed");
                }
                match &err {
                    GatewayError::SeatUnavailable {
                        section_id,
                        seat_id,
                    } => {
                        tracing::warn!(%request_id, %user_id, %event_id, %section_id, %seat_id, "seat unavailable, reservation rolled back");
                    }
                    other => {
                        tracing::error!(%request_id, %user_id, %event_id, error = %other, "reservation aborted");
                    }
                }
                Err(err.into_aborted())
            }
        }
    }

    /// Returns every ticket currently holding a seat of the event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    pub async fn active_tickets(&self, event_id: EventId) -> Result<Vec<Ticket>, GatewayError> {
        self.store.active_tickets(event_id).await
    }

    async fn claim_all(
        &self,
        tx: &mut dyn ReservationTx,
        user_id: UserId,
        keys: &[SeatKey],
    ) -> Result<Vec<Ticket>, GatewayError> {
        let mut tickets = Vec::with_capacity(keys.len());
        for key in keys {
            tx.lock_seat(LockDomain::Tickets, key).await?;

            let reaped = tx.reap_stale(key).await?;
            if reaped > 0 {
                tracing::debug!(seat = %key, reaped, "reclaimed expired holds");
            }

            let Some(ticket) = tx.claim_if_available(user_id, key, self.hold).await? else {
                return Err(GatewayError::SeatUnavailable {
                    section_id: key.section_id,
                    seat_id: key.seat_id,
                });
            };
            tickets.push(ticket);
        }
        Ok(tickets)
    }
}
