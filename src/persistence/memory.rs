//! In-memory reservation engine.
//!
//! [`InMemoryStore`] keeps the ticket table, the event → pricing-layout
//! map, and seat prices behind [`tokio::sync::RwLock`]s. Transactions
//! stage their reaps and inserts locally and apply them in one step at
//! commit, while per-seat exclusion comes from [`SeatLockManager`].
//!
//! A transaction may only reap or claim a seat whose lock it holds; the
//! engine rejects anything else so the ticket table is never mutated
//! outside its seat lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::seat_lock::{SeatLockGuard, SeatLockManager};
use super::{LockDomain, ReservationStore, ReservationTx};
use crate::domain::{
    EventId, Money, PricingLayoutId, SeatId, SeatKey, SectionId, Ticket, TicketId, TicketStatus,
    UserId,
};
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct Catalog {
    events: HashMap<EventId, PricingLayoutId>,
    prices: HashMap<(PricingLayoutId, SectionId, SeatId), Money>,
}

impl Catalog {
    fn price_for(&self, key: &SeatKey) -> Option<Money> {
        let layout = self.events.get(&key.event_id)?;
        self.prices
            .get(&(*layout, key.section_id, key.seat_id))
            .copied()
    }
}

#[derive(Debug)]
struct Shared {
    catalog: RwLock<Catalog>,
    tickets: RwLock<HashMap<SeatKey, Vec<Ticket>>>,
    next_id: AtomicI64,
    locks: Arc<SeatLockManager>,
}

impl Shared {
    fn allocate_id(&self) -> TicketId {
        TicketId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Process-local storage engine with the same transactional guarantees as
/// the Postgres engine.
///
/// Cloning is cheap; clones share the same tables.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    shared: Arc<Shared>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                catalog: RwLock::new(Catalog::default()),
                tickets: RwLock::new(HashMap::new()),
                next_id: AtomicI64::new(1),
                locks: Arc::new(SeatLockManager::new()),
            }),
        }
    }

    /// Publishes an event priced by `pricing_layout_id`.
    pub async fn register_event(&self, event_id: EventId, pricing_layout_id: PricingLayoutId) {
        self.shared
            .catalog
            .write()
            .await
            .events
            .insert(event_id, pricing_layout_id);
    }

    /// Sets the price of one seat in a pricing layout.
    pub async fn set_seat_price(
        &self,
        pricing_layout_id: PricingLayoutId,
        section_id: SectionId,
        seat_id: SeatId,
        price: Money,
    ) {
        self.shared
            .catalog
            .write()
            .await
            .prices
            .insert((pricing_layout_id, section_id, seat_id), price);
    }

    /// Writes a ticket directly, bypassing seat locks. Intended for seeding
    /// existing holds and purchases.
    pub async fn seed_ticket(
        &self,
        user_id: UserId,
        key: SeatKey,
        status: TicketStatus,
        reserved_until: DateTime<Utc>,
        price: Money,
    ) -> Ticket {
        let ticket = Ticket {
            id: self.shared.allocate_id(),
            user_id,
            event_id: key.event_id,
            section_id: key.section_id,
            seat_id: key.seat_id,
            status,
            reserved_until,
            price,
            created_at: Utc::now(),
        };
        self.shared
            .tickets
            .write()
            .await
            .entry(key)
            .or_default()
            .push(ticket.clone());
        ticket
    }

    /// Returns every stored ticket for the seat, stale ones included.
    pub async fn tickets_for_seat(&self, key: &SeatKey) -> Vec<Ticket> {
        self.shared
            .tickets
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns every stored ticket, stale ones included.
    pub async fn all_tickets(&self) -> Vec<Ticket> {
        let table = self.shared.tickets.read().await;
        let mut tickets: Vec<Ticket> = table.values().flatten().cloned().collect();
        tickets.sort_by_key(|t| (t.seat_key(), t.id));
        tickets
    }

    /// The lock manager backing this store's transactions.
    #[must_use]
    pub fn lock_manager(&self) -> &Arc<SeatLockManager> {
        &self.shared.locks
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn ReservationTx>, GatewayError> {
        Ok(Box::new(MemoryTx {
            shared: Arc::clone(&self.shared),
            now: Utc::now(),
            open: true,
            locks: BTreeMap::new(),
            reaped: Vec::new(),
            inserted: Vec::new(),
        }))
    }

    async fn active_tickets(&self, event_id: EventId) -> Result<Vec<Ticket>, GatewayError> {
        let now = Utc::now();
        let table = self.shared.tickets.read().await;
        let mut tickets: Vec<Ticket> = table
            .iter()
            .filter(|(key, _)| key.event_id == event_id)
            .flat_map(|(_, rows)| rows.iter())
            .filter(|t| t.is_active(now))
            .cloned()
            .collect();
        tickets.sort_by_key(Ticket::seat_key);
        Ok(tickets)
    }
}

/// Open transaction on an [`InMemoryStore`].
///
/// `now` is fixed when the transaction begins, so every seat claimed in it
/// shares one hold window.
#[derive(Debug)]
struct MemoryTx {
    shared: Arc<Shared>,
    now: DateTime<Utc>,
    open: bool,
    locks: BTreeMap<(LockDomain, SeatKey), SeatLockGuard>,
    reaped: Vec<(SeatKey, TicketId)>,
    inserted: Vec<Ticket>,
}

impl MemoryTx {
    fn ensure_open(&self) -> Result<(), GatewayError> {
        if self.open {
            Ok(())
        } else {
            Err(GatewayError::Internal(
                "transaction already finished".to_string(),
            ))
        }
    }

    fn ensure_locked(&self, key: &SeatKey) -> Result<(), GatewayError> {
        self.ensure_open()?;
        if self.locks.contains_key(&(LockDomain::Tickets, *key)) {
            Ok(())
        } else {
            Err(GatewayError::Internal(format!(
                "seat lock not held for {key}"
            )))
        }
    }

    fn is_reaped(&self, key: &SeatKey, id: TicketId) -> bool {
        self.reaped.iter().any(|(k, r)| k == key && *r == id)
    }

    fn finish(&mut self) {
        self.open = false;
        self.reaped.clear();
        self.inserted.clear();
        // Dropping the guards releases every seat lock.
        self.locks.clear();
    }
}

#[async_trait]
impl ReservationTx for MemoryTx {
    async fn lock_seat(&mut self, domain: LockDomain, key: &SeatKey) -> Result<(), GatewayError> {
        self.ensure_open()?;
        if self.locks.contains_key(&(domain, *key)) {
            return Ok(());
        }
        let guard = self.shared.locks.acquire(domain, *key).await;
        self.locks.insert((domain, *key), guard);
        Ok(())
    }

    async fn reap_stale(&mut self, key: &SeatKey) -> Result<u64, GatewayError> {
        self.ensure_locked(key)?;
        let stale: Vec<TicketId> = {
            let table = self.shared.tickets.read().await;
            table
                .get(key)
                .into_iter()
                .flatten()
                .filter(|t| t.is_stale(self.now) && !self.is_reaped(key, t.id))
                .map(|t| t.id)
                .collect()
        };
        let count = stale.len() as u64;
        self.reaped.extend(stale.into_iter().map(|id| (*key, id)));
        Ok(count)
    }

    async fn claim_if_available(
        &mut self,
        user_id: UserId,
        key: &SeatKey,
        hold: Duration,
    ) -> Result<Option<Ticket>, GatewayError> {
        self.ensure_locked(key)?;
        let now = self.now;

        let committed_active = {
            let table = self.shared.tickets.read().await;
            table
                .get(key)
                .into_iter()
                .flatten()
                .any(|t| t.is_active(now) && !self.is_reaped(key, t.id))
        };
        let staged_active = self
            .inserted
            .iter()
            .any(|t| t.seat_key() == *key && t.is_active(now));
        if committed_active || staged_active {
            return Ok(None);
        }

        let Some(price) = self.shared.catalog.read().await.price_for(key) else {
            return Ok(None);
        };

        let ticket = Ticket {
            id: self.shared.allocate_id(),
            user_id,
            event_id: key.event_id,
            section_id: key.section_id,
            seat_id: key.seat_id,
            status: TicketStatus::Pending,
            reserved_until: now + hold,
            price,
            created_at: now,
        };
        self.inserted.push(ticket.clone());
        Ok(Some(ticket))
    }

    async fn commit(&mut self) -> Result<(), GatewayError> {
        self.ensure_open()?;
        {
            let mut table = self.shared.tickets.write().await;
            for (key, id) in &self.reaped {
                if let Some(rows) = table.get_mut(key) {
                    rows.retain(|t| t.id != *id);
                }
            }
            table.retain(|_, rows| !rows.is_empty());
            for ticket in self.inserted.drain(..) {
                table.entry(ticket.seat_key()).or_default().push(ticket);
            }
        }
        self.finish();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), GatewayError> {
        self.ensure_open()?;
        self.finish();
        Ok(())
    }
}
