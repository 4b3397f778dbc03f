//! Single-flight orchestration over the response store.
//!
//! Lookup order is: fresh store entry, then an in-flight ticket for the same
//! key, then a new upstream call. The ticket check and registration run under
//! the `DashMap` shard lock for the key with no `.await` in between, so two
//! concurrent misses cannot both reach the upstream.
//!
//! The upstream call runs on its own task, spawned only after the shard lock is
//! released. That task writes the store before it releases the ticket, and
//! releases it on every exit path, panics included. Waiters hear the result
//! over a oneshot channel; a task that dies without sending settles them with
//! `Aborted`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use crate::kicks::{SearchPayload, UpstreamError};
use crate::search::query::{NormalizedQuery, QueryPolicy, RawQuery};
use crate::search::store::ResponseStore;
use crate::search::{CacheStatus, ProductSearch, SearchError, SearchOutcome};

type TicketResult = Result<Arc<SearchPayload>, UpstreamError>;
type Ticket = Shared<BoxFuture<'static, TicketResult>>;

/// A ticket settles with whatever its task sends, or `Aborted` if the task
/// ends without sending.
fn ticket_for(key: String) -> (oneshot::Sender<TicketResult>, Ticket) {
    let (tx, rx) = oneshot::channel();
    let ticket = rx
        .map(move |received| {
            received.unwrap_or_else(|_| {
                error!(key = %key, "upstream search task ended without a result");
                Err(UpstreamError::Aborted(
                    "upstream search task ended without a result".to_owned(),
                ))
            })
        })
        .boxed()
        .shared();
    (tx, ticket)
}

/// Cheap to clone; clones share the store and the ticket table.
#[derive(Clone)]
pub struct SearchCoalescer {
    upstream: Arc<dyn ProductSearch>,
    store: ResponseStore,
    policy: QueryPolicy,
    /// normalized key → (ticket id, pending result)
    inflight: Arc<DashMap<String, (u64, Ticket)>>,
    next_ticket: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoalescerStats {
    pub entries: usize,
    pub fresh_entries: usize,
    pub in_flight: usize,
}

impl SearchCoalescer {
    pub fn new(upstream: Arc<dyn ProductSearch>, store: ResponseStore, policy: QueryPolicy) -> Self {
        Self {
            upstream,
            store,
            policy,
            inflight: Arc::default(),
            next_ticket: Arc::default(),
        }
    }

    pub fn ttl(&self) -> std::time::Duration {
        self.store.ttl()
    }

    /// Normalize `raw` and answer it from cache, an in-flight call, or a new upstream call.
    ///
    /// Validation failures return before the store or the upstream is touched.
    pub async fn search(&self, raw: &RawQuery) -> Result<SearchOutcome, SearchError> {
        let query = self.policy.normalize(raw)?;
        self.fetch(query).await
    }

    async fn fetch(&self, query: NormalizedQuery) -> Result<SearchOutcome, SearchError> {
        if let Some(payload) = self.store.get(&query.key) {
            debug!(key = %query.key, "search cache hit");
            return Ok(SearchOutcome {
                payload,
                status: CacheStatus::Hit,
            });
        }

        let (ticket, status, pending) = match self.inflight.entry(query.key.clone()) {
            Entry::Occupied(entry) => {
                debug!(key = %query.key, "joining in-flight search");
                (entry.get().1.clone(), CacheStatus::Coalesced, None)
            }
            Entry::Vacant(entry) => {
                // A ticket that settled after the lookup above has already written the store.
                if let Some(payload) = self.store.get(&query.key) {
                    return Ok(SearchOutcome {
                        payload,
                        status: CacheStatus::Hit,
                    });
                }
                debug!(key = %query.key, "search cache miss");
                let id = self.next_ticket.fetch_add(1, Ordering::Relaxed);
                let (tx, ticket) = ticket_for(query.key.clone());
                entry.insert((id, ticket.clone()));
                (ticket, CacheStatus::Miss, Some((id, tx)))
            }
        };

        // The shard lock is released by now; the task may drop its release guard
        // synchronously if the runtime refuses the spawn.
        if let Some((id, tx)) = pending {
            self.launch(id, query, tx);
        }

        let payload = ticket.await?;
        Ok(SearchOutcome { payload, status })
    }

    fn launch(&self, id: u64, query: NormalizedQuery, tx: oneshot::Sender<TicketResult>) {
        let upstream = self.upstream.clone();
        let store = self.store.clone();
        let release = TicketRelease {
            inflight: self.inflight.clone(),
            key: query.key.clone(),
            id,
        };

        tokio::spawn(async move {
            let release = release;
            let result = upstream.search(&query.upstream).await.map(Arc::new);
            match &result {
                Ok(payload) => {
                    store.put(query.key.clone(), payload.clone());
                    debug!(key = %query.key, items = payload.products.len(), "search cached");
                }
                Err(e) => {
                    warn!(key = %query.key, error = %e, "upstream search failed, not caching");
                }
            }
            drop(release);
            // Every waiter may have gone away.
            let _ = tx.send(result);
        });
    }

    pub fn stats(&self) -> CoalescerStats {
        let (entries, fresh_entries) = self.store.counts();
        CoalescerStats {
            entries,
            fresh_entries,
            in_flight: self.inflight.len(),
        }
    }
}

/// Removes one ticket from the in-flight table when dropped.
struct TicketRelease {
    inflight: Arc<DashMap<String, (u64, Ticket)>>,
    key: String,
    id: u64,
}

impl Drop for TicketRelease {
    fn drop(&mut self) {
        self.inflight
            .remove_if(&self.key, |_, (id, _)| *id == self.id);
    }
}
