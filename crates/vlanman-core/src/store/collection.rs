// ── Generic entity collection ──
//
// Concurrent storage keyed by `EntityId` with an ordered snapshot that
// readers clone cheaply.

use std::net::Ipv4Addr;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{Domain, EntityId, IpAssignment, Vlan, Zone};

/// An entity the store can hold: it knows its id and how it sorts in
/// snapshots.
pub trait Keyed: Clone + Send + Sync + 'static {
    type Order: Ord;

    fn key(&self) -> &EntityId;

    /// Snapshot ordering. Ties fall back to the id.
    fn order(&self) -> Self::Order;
}

impl Keyed for Domain {
    type Order = String;

    fn key(&self) -> &EntityId {
        &self.id
    }

    fn order(&self) -> String {
        self.code.to_string()
    }
}

impl Keyed for Zone {
    type Order = String;

    fn key(&self) -> &EntityId {
        &self.id
    }

    fn order(&self) -> String {
        self.name.clone()
    }
}

impl Keyed for Vlan {
    type Order = u16;

    fn key(&self) -> &EntityId {
        &self.id
    }

    fn order(&self) -> u16 {
        self.vlan_id
    }
}

impl Keyed for IpAssignment {
    type Order = Ipv4Addr;

    fn key(&self) -> &EntityId {
        &self.id
    }

    fn order(&self) -> Ipv4Addr {
        self.ip_address
    }
}

/// Storage for a single entity type. Every mutation rebuilds the
/// ordered snapshot.
pub(crate) struct EntityCollection<T: Keyed> {
    by_id: DashMap<EntityId, Arc<T>>,
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Keyed> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or replace an entity. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, entity: T) -> bool {
        let is_new = self
            .by_id
            .insert(entity.key().clone(), Arc::new(entity))
            .is_none();
        self.publish();
        is_new
    }

    /// Replace the whole content in one step: upsert everything incoming,
    /// then drop ids that are no longer present. Subscribers see a single
    /// change and never an empty intermediate state.
    pub(crate) fn replace_all(&self, items: Vec<T>) {
        let incoming: std::collections::HashSet<EntityId> =
            items.iter().map(|e| e.key().clone()).collect();
        for entity in items {
            self.by_id.insert(entity.key().clone(), Arc::new(entity));
        }
        self.by_id.retain(|id, _| incoming.contains(id));
        self.publish();
    }

    /// Replace only the entities matching `scope`, leaving the rest alone.
    pub(crate) fn replace_where(&self, scope: impl Fn(&T) -> bool, items: Vec<T>) {
        let incoming: std::collections::HashSet<EntityId> =
            items.iter().map(|e| e.key().clone()).collect();
        self.by_id
            .retain(|id, existing| !scope(existing.as_ref()) || incoming.contains(id));
        for entity in items {
            self.by_id.insert(entity.key().clone(), Arc::new(entity));
        }
        self.publish();
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn publish(&self) {
        let mut values: Vec<Arc<T>> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.key().cmp(b.key())));
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
