//! Reservation engine against PostgreSQL.
//!
//! Requires a reachable database in `DATABASE_URL`; run with
//! `cargo test --test postgres_store -- --ignored`.

#![allow(clippy::panic)]

use std::collections::BTreeSet;
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use ticketing_gateway::domain::{EventId, SeatId, SeatRequest, SectionId, UserId};
use ticketing_gateway::error::GatewayError;
use ticketing_gateway::persistence::PgReservationStore;
use ticketing_gateway::service::ReservationService;

const SECTION: SectionId = SectionId::new(1);

fn seat(id: i64) -> SeatRequest {
    SeatRequest::new(SECTION, SeatId::new(id))
}

async fn connect() -> PgReservationStore {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        panic!("DATABASE_URL must be set for postgres tests");
    };
    let Ok(pool) = PgPoolOptions::new().max_connections(16).connect(&url).await else {
        panic!("could not connect to {url}");
    };
    let store = PgReservationStore::new(pool);
    let Ok(()) = store.migrate().await else {
        panic!("migrations failed");
    };
    store
}

/// Creates a fresh event priced by its own layout, so tests sharing a
/// database never see each other's seats.
async fn seeded_event(pool: &PgPool, seats: &[(i64, i64)]) -> EventId {
    let Ok(event_id) =
        sqlx::query_scalar::<_, i64>("INSERT INTO events (pricing_layout_id) VALUES (0) RETURNING id")
            .fetch_one(pool)
            .await
    else {
        panic!("event insert failed");
    };
    let Ok(_) = sqlx::query("UPDATE events SET pricing_layout_id = id WHERE id = $1")
        .bind(event_id)
        .execute(pool)
        .await
    else {
        panic!("event update failed");
    };
    for (seat_id, cents) in seats {
        let Ok(_) = sqlx::query(
            "INSERT INTO seat_prices (pricing_layout_id, section_id, seat_id, price_cents) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(event_id)
        .bind(SECTION.get())
        .bind(seat_id)
        .bind(cents)
        .execute(pool)
        .await
        else {
            panic!("price insert failed");
        };
    }
    EventId::new(event_id)
}

async fn ticket_count(pool: &PgPool, event_id: EventId) -> i64 {
    let Ok(count) = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE event_id = $1")
        .bind(event_id.get())
        .fetch_one(pool)
        .await
    else {
        panic!("count failed");
    };
    count
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL"]
async fn overlapping_requests_are_all_or_nothing() {
    let store = connect().await;
    let pool = store.pool().clone();
    let event = seeded_event(&pool, &[(1, 5000), (2, 5000), (3, 5000), (4, 5000)]).await;
    let service = ReservationService::new(Arc::new(store));

    let requests = [
        (UserId::new(1), vec![seat(1), seat(2)]),
        (UserId::new(2), vec![seat(3), seat(2)]),
        (UserId::new(3), vec![seat(4), seat(3)]),
    ];
    let mut handles = Vec::new();
    for (user, seats) in requests {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            (user, service.reserve(user, event, &seats).await)
        }));
    }

    let mut winners = BTreeSet::new();
    for handle in handles {
        let Ok((user, result)) = handle.await else {
            panic!("task panicked");
        };
        match result {
            Ok(_) => {
                winners.insert(user);
            }
            Err(GatewayError::SeatUnavailable { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let expected_rows = if winners == BTreeSet::from([UserId::new(2)]) {
        2
    } else {
        assert_eq!(winners, BTreeSet::from([UserId::new(1), UserId::new(3)]));
        4
    };
    assert_eq!(ticket_count(&pool, event).await, expected_rows);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn expired_hold_is_reaped_and_reclaimed() {
    let store = connect().await;
    let pool = store.pool().clone();
    let event = seeded_event(&pool, &[(1, 5000)]).await;

    let Ok(old_id) = sqlx::query_scalar::<_, i64>(
        "INSERT INTO tickets (user_id, event_id, section_id, seat_id, reserved_until, price_cents) \
         VALUES (1, $1, $2, 1, NOW() - INTERVAL '1 second', 5000) RETURNING id",
    )
    .bind(event.get())
    .bind(SECTION.get())
    .fetch_one(&pool)
    .await
    else {
        panic!("stale hold insert failed");
    };

    let service = ReservationService::new(Arc::new(store));
    let Ok(tickets) = service.reserve(UserId::new(2), event, &[seat(1)]).await else {
        panic!("expired hold blocked the seat");
    };
    assert_eq!(tickets.len(), 1);

    let Ok(old_rows) = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE id = $1")
        .bind(old_id)
        .fetch_one(&pool)
        .await
    else {
        panic!("lookup failed");
    };
    assert_eq!(old_rows, 0);
    assert_eq!(ticket_count(&pool, event).await, 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn price_comes_from_layout_and_unpriced_seat_rolls_back() {
    let store = connect().await;
    let pool = store.pool().clone();
    let event = seeded_event(&pool, &[(1, 2500), (2, 7500)]).await;
    let service = ReservationService::new(Arc::new(store));

    let Ok(tickets) = service
        .reserve(UserId::new(1), event, &[seat(2), seat(1)])
        .await
    else {
        panic!("reservation failed");
    };
    let prices: Vec<u64> = tickets.iter().map(|t| t.price.cents()).collect();
    assert_eq!(prices, vec![2500, 7500]);
    let hold = tickets
        .first()
        .map(|t| t.reserved_until - t.created_at);
    assert_eq!(hold, Some(chrono::Duration::minutes(15)));

    let other = seeded_event(&pool, &[(1, 1000)]).await;
    let result = service
        .reserve(UserId::new(2), other, &[seat(1), seat(9)])
        .await;
    assert!(matches!(
        result,
        Err(GatewayError::SeatUnavailable { seat_id, .. }) if seat_id == SeatId::new(9)
    ));
    assert_eq!(ticket_count(&pool, other).await, 0);

    let Ok(active) = service.store().active_tickets(event).await else {
        panic!("listing failed");
    };
    assert_eq!(active, tickets);
}
