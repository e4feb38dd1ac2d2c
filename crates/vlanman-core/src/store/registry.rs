// ── Per-resource registry ──
//
// A collection plus the request bookkeeping every resource shares: a
// loading flag, the last error, and a generation counter so that only
// the newest fetch may write (last-request-wins).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use super::collection::{EntityCollection, Keyed};
use crate::error::CoreError;

/// Issued when a fetch starts; only the newest ticket may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket(u64);

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was started meanwhile; the response was dropped.
    Stale,
}

pub struct Registry<T: Keyed> {
    name: &'static str,
    pub(crate) items: EntityCollection<T>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
    generation: AtomicU64,
}

impl<T: Keyed> Registry<T> {
    pub(crate) fn new(name: &'static str) -> Self {
        let (loading, _) = watch::channel(false);
        let (error, _) = watch::channel(None);
        Self {
            name,
            items: EntityCollection::new(),
            loading,
            error,
            generation: AtomicU64::new(0),
        }
    }

    // ── Fetch bookkeeping ────────────────────────────────────────────

    /// Start a fetch: supersedes every earlier ticket and raises `loading`.
    pub(crate) fn begin(&self) -> FetchTicket {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.loading.send_replace(true);
        FetchTicket(ticket)
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Finish a fetch. A current success runs `apply` and clears the error;
    /// a current failure keeps the cached data and records the error.
    /// Stale responses change nothing, but a stale error is still returned
    /// to the caller that issued it.
    pub(crate) fn complete<R>(
        &self,
        ticket: FetchTicket,
        result: Result<R, CoreError>,
        apply: impl FnOnce(&EntityCollection<T>, R),
    ) -> Result<FetchOutcome, CoreError> {
        if !self.is_current(ticket) {
            debug!(registry = self.name, ticket = ticket.0, "discarding stale response");
            return result.map(|_| FetchOutcome::Stale);
        }
        self.loading.send_replace(false);
        match result {
            Ok(value) => {
                apply(&self.items, value);
                self.error.send_replace(None);
                debug!(registry = self.name, count = self.items.len(), "registry updated");
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                debug!(registry = self.name, error = %e, "fetch failed, keeping cached data");
                self.error.send_replace(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Record a failed mutation against this resource.
    pub(crate) fn record_error(&self, err: &CoreError) {
        self.error.send_replace(Some(err.to_string()));
    }

    // ── Read side ────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.items.snapshot()
    }

    pub fn get(&self, id: &crate::model::EntityId) -> Option<Arc<T>> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn last_error(&self) -> Option<String> {
        self.error.borrow().clone()
    }
}
