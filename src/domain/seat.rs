//! Seat addressing: what a caller asks for and how the engine keys it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{EventId, SeatId, SectionId};

/// One requested seat within an event, as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatRequest {
    /// Section containing the seat.
    pub section_id: SectionId,
    /// Seat within the section.
    pub seat_id: SeatId,
}

impl SeatRequest {
    /// Creates a seat request.
    #[must_use]
    pub const fn new(section_id: SectionId, seat_id: SeatId) -> Self {
        Self {
            section_id,
            seat_id,
        }
    }
}

/// Fully-qualified seat identity: the unit of inventory and of locking.
///
/// The derived ordering (event, then section, then seat) is the global
/// lock acquisition order. Every transaction acquires seat locks in
/// ascending `SeatKey` order, so no two transactions can wait on each
/// other in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatKey {
    /// Event the seat is sold for.
    pub event_id: EventId,
    /// Section containing the seat.
    pub section_id: SectionId,
    /// Seat within the section.
    pub seat_id: SeatId,
}

impl SeatKey {
    /// Creates a seat key.
    #[must_use]
    pub const fn new(event_id: EventId, section_id: SectionId, seat_id: SeatId) -> Self {
        Self {
            event_id,
            section_id,
            seat_id,
        }
    }

    /// Qualifies a caller's request with the event it targets.
    #[must_use]
    pub const fn for_request(event_id: EventId, request: SeatRequest) -> Self {
        Self::new(event_id, request.section_id, request.seat_id)
    }

    /// Stable textual form used to derive storage-level lock keys.
    #[must_use]
    pub fn lock_text(&self) -> String {
        format!("{}:{}:{}", self.event_id, self.section_id, self.seat_id)
    }
}

impl fmt::Display for SeatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event {} section {} seat {}",
            self.event_id, self.section_id, self.seat_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(event: i64, section: i64, seat: i64) -> SeatKey {
        SeatKey::new(EventId::new(event), SectionId::new(section), SeatId::new(seat))
    }

    #[test]
    fn ordering_is_event_then_section_then_seat() {
        let mut keys = vec![key(1, 2, 1), key(1, 1, 9), key(0, 5, 5), key(1, 1, 3)];
        keys.sort();
        assert_eq!(
            keys,
            vec![key(0, 5, 5), key(1, 1, 3), key(1, 1, 9), key(1, 2, 1)]
        );
    }

    #[test]
    fn same_seat_id_in_different_sections_is_distinct() {
        assert_ne!(key(1, 1, 7), key(1, 2, 7));
        assert_ne!(key(1, 1, 7).lock_text(), key(1, 2, 7).lock_text());
    }

    #[test]
    fn lock_text_covers_full_tuple() {
        assert_eq!(key(10, 20, 30).lock_text(), "10:20:30");
    }

    #[test]
    fn key_for_request_carries_event_section_and_seat() {
        let request = SeatRequest::new(SectionId::new(4), SeatId::new(8));
        let k = SeatKey::for_request(EventId::new(2), request);
        assert_eq!(k, SeatKey::new(EventId::new(2), SectionId::new(4), SeatId::new(8)));
    }
}
