//! Type-safe identifiers for users, events, seats, and tickets.
//!
//! Every identifier is a newtype over the `BIGINT` key the storage layer
//! assigns, so a [`SeatId`] cannot be passed where a [`SectionId`] is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw storage key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw storage key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_newtype!(
    /// Authenticated user placing a reservation.
    UserId
);
id_newtype!(
    /// Published event whose seats are on sale.
    EventId
);
id_newtype!(
    /// Section of an event's seating layout.
    SectionId
);
id_newtype!(
    /// Seat within a section. Not guaranteed unique across sections.
    SeatId
);
id_newtype!(
    /// Reservation / purchase record.
    TicketId
);
id_newtype!(
    /// Pricing layout an event draws its seat prices from.
    PricingLayoutId
);
