use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::tenancy::domain::{
    model::{
        entities::tenant_connection::TenantConnection,
        enums::{
            registry_entry_phase::RegistryEntryPhase, tenancy_domain_error::TenancyDomainError,
        },
        value_objects::tenant_id::TenantId,
    },
    services::{
        tenant_connection_factory::TenantConnectionFactory,
        tenant_connection_registry::{RegistryEntrySnapshot, TenantConnectionRegistry},
    },
};

type CreationOutcome = Result<Arc<TenantConnection>, TenancyDomainError>;
type EntryMap = HashMap<TenantId, RegistryEntry>;

enum RegistryEntry {
    Warming {
        attempt: u64,
        outcome: watch::Receiver<Option<CreationOutcome>>,
    },
    Ready {
        connection: Arc<TenantConnection>,
        last_used: Instant,
    },
}

enum Lookup {
    Ready(Arc<TenantConnection>),
    Await(watch::Receiver<Option<CreationOutcome>>),
    Stale(Arc<TenantConnection>),
    Create(CreationGuard),
}

/// Owned by the caller that published a `Warming` marker.
///
/// If the creating future is dropped before settling (timeout at an outer
/// layer, client disconnect), `Drop` removes the marker before the sender is
/// released, so woken waiters never see a dead marker.
struct CreationGuard {
    entries: Arc<Mutex<EntryMap>>,
    tenant_id: TenantId,
    attempt: u64,
    sender: watch::Sender<Option<CreationOutcome>>,
    settled: bool,
}

impl CreationGuard {
    fn is_current(&self, entries: &EntryMap) -> bool {
        matches!(
            entries.get(&self.tenant_id),
            Some(RegistryEntry::Warming { attempt, .. }) if *attempt == self.attempt
        )
    }

    /// Replaces the marker with the outcome. When the marker was torn down
    /// while creating, a fresh connection is handed back for closing instead
    /// of being published.
    fn settle(&mut self, outcome: CreationOutcome) -> Result<CreationOutcome, Arc<TenantConnection>> {
        let current = {
            let mut entries = lock(&self.entries);
            let current = self.is_current(&entries);
            if current {
                match &outcome {
                    Ok(connection) => {
                        entries.insert(
                            self.tenant_id.clone(),
                            RegistryEntry::Ready {
                                connection: connection.clone(),
                                last_used: Instant::now(),
                            },
                        );
                    }
                    Err(_) => {
                        entries.remove(&self.tenant_id);
                    }
                }
            }
            current
        };
        self.settled = true;

        match outcome {
            Ok(connection) if !current => Err(connection),
            outcome => {
                self.sender.send_replace(Some(outcome.clone()));
                Ok(outcome)
            }
        }
    }

    fn notify(&self, outcome: CreationOutcome) {
        self.sender.send_replace(Some(outcome));
    }
}

impl Drop for CreationGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut entries = lock(&self.entries);
        if self.is_current(&entries) {
            entries.remove(&self.tenant_id);
            warn!(tenant_id = %self.tenant_id, "tenant connection creation abandoned");
        }
    }
}

/// The entry holds one reference; any other belongs to a request in flight.
fn is_borrowed(connection: &Arc<TenantConnection>) -> bool {
    Arc::strong_count(connection) > 1
}

fn lock(entries: &Mutex<EntryMap>) -> MutexGuard<'_, EntryMap> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-wide map from tenant to its live connection.
///
/// The map lock is only held for synchronous bookkeeping; creation, closing and
/// waiting all happen outside it, so one tenant never waits on another.
pub struct TenantConnectionRegistryImpl {
    factory: Arc<dyn TenantConnectionFactory>,
    creation_timeout: Duration,
    entries: Arc<Mutex<EntryMap>>,
    next_attempt: AtomicU64,
}

impl TenantConnectionRegistryImpl {
    pub fn new(factory: Arc<dyn TenantConnectionFactory>, creation_timeout: Duration) -> Self {
        Self {
            factory,
            creation_timeout,
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_attempt: AtomicU64::new(1),
        }
    }

    fn lookup_or_claim(&self, tenant_id: &TenantId) -> Lookup {
        let mut entries = lock(&self.entries);

        match entries.get_mut(tenant_id) {
            Some(RegistryEntry::Ready {
                connection,
                last_used,
            }) => {
                if connection.is_usable() {
                    *last_used = Instant::now();
                    return Lookup::Ready(connection.clone());
                }
                let connection = connection.clone();
                entries.remove(tenant_id);
                return Lookup::Stale(connection);
            }
            Some(RegistryEntry::Warming { outcome, .. }) => {
                return Lookup::Await(outcome.clone());
            }
            None => {}
        }

        let attempt = self.next_attempt.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = watch::channel(None);
        entries.insert(
            tenant_id.clone(),
            RegistryEntry::Warming {
                attempt,
                outcome: receiver,
            },
        );

        Lookup::Create(CreationGuard {
            entries: self.entries.clone(),
            tenant_id: tenant_id.clone(),
            attempt,
            sender,
            settled: false,
        })
    }

    async fn create(&self, tenant_id: &TenantId, mut guard: CreationGuard) -> CreationOutcome {
        let started = Instant::now();
        debug!(tenant_id = %tenant_id, attempt = guard.attempt, "creating tenant connection");

        let outcome = match tokio::time::timeout(
            self.creation_timeout,
            self.factory.create(tenant_id),
        )
        .await
        {
            Ok(Ok(connection)) => Ok(Arc::new(connection)),
            Ok(Err(error)) => Err(error),
            Err(_) => Err(TenancyDomainError::Timeout(
                self.creation_timeout.as_millis() as u64,
            )),
        };

        if let Err(error) = &outcome {
            warn!(
                tenant_id = %tenant_id,
                error = %error,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "tenant connection creation failed"
            );
        }

        match guard.settle(outcome) {
            Ok(outcome) => outcome,
            Err(orphan) => {
                info!(
                    tenant_id = %tenant_id,
                    connection_id = %orphan.connection_id(),
                    "tenant entry torn down during creation, closing new connection"
                );
                orphan.close().await;
                let error = TenancyDomainError::ConnectionError(
                    "tenant connection was torn down during creation".to_string(),
                );
                guard.notify(Err(error.clone()));
                Err(error)
            }
        }
    }
}

#[async_trait]
impl TenantConnectionRegistry for TenantConnectionRegistryImpl {
    async fn get(&self, tenant_id: &TenantId) -> Result<Arc<TenantConnection>, TenancyDomainError> {
        loop {
            match self.lookup_or_claim(tenant_id) {
                Lookup::Ready(connection) => return Ok(connection),
                Lookup::Stale(connection) => {
                    warn!(
                        tenant_id = %tenant_id,
                        connection_id = %connection.connection_id(),
                        state = connection.state().as_str(),
                        "discarding unusable tenant connection"
                    );
                    connection.close().await;
                }
                Lookup::Await(mut receiver) => {
                    let settled = match receiver.wait_for(Option::is_some).await {
                        Ok(outcome) => (*outcome).clone(),
                        Err(_) => None,
                    };
                    if let Some(outcome) = settled {
                        return outcome;
                    }
                }
                Lookup::Create(guard) => return self.create(tenant_id, guard).await,
            }
        }
    }

    async fn teardown(&self, tenant_id: &TenantId) {
        let removed = lock(&self.entries).remove(tenant_id);

        match removed {
            Some(RegistryEntry::Ready { connection, .. }) => {
                connection.close().await;
                info!(
                    tenant_id = %tenant_id,
                    connection_id = %connection.connection_id(),
                    "tenant connection closed"
                );
            }
            Some(RegistryEntry::Warming { .. }) => {
                info!(tenant_id = %tenant_id, "in-flight tenant connection creation detached");
            }
            None => {}
        }
    }

    async fn teardown_all(&self) -> usize {
        let drained = lock(&self.entries).drain().collect::<Vec<_>>();

        let mut closed = 0;
        for (_, entry) in drained {
            if let RegistryEntry::Ready { connection, .. } = entry {
                connection.close().await;
                closed += 1;
            }
        }

        info!(closed, "tenant registry emptied");
        closed
    }

    async fn evict_idle(&self, max_idle: Duration) -> usize {
        let evicted = {
            let mut entries = lock(&self.entries);
            let idle = entries
                .iter()
                .filter_map(|(tenant_id, entry)| match entry {
                    RegistryEntry::Ready {
                        connection,
                        last_used,
                    } if last_used.elapsed() >= max_idle && !is_borrowed(connection) => {
                        Some(tenant_id.clone())
                    }
                    _ => None,
                })
                .collect::<Vec<_>>();

            idle.into_iter()
                .filter_map(|tenant_id| match entries.remove(&tenant_id) {
                    Some(RegistryEntry::Ready { connection, .. }) => Some(connection),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };

        for connection in &evicted {
            connection.close().await;
            info!(
                tenant_id = %connection.tenant_id(),
                connection_id = %connection.connection_id(),
                "idle tenant connection evicted"
            );
        }

        evicted.len()
    }

    fn snapshot(&self) -> Vec<RegistryEntrySnapshot> {
        let entries = lock(&self.entries);
        let mut snapshot = entries
            .iter()
            .map(|(tenant_id, entry)| RegistryEntrySnapshot {
                tenant_id: tenant_id.clone(),
                phase: match entry {
                    RegistryEntry::Warming { .. } => RegistryEntryPhase::Warming,
                    RegistryEntry::Ready { .. } => RegistryEntryPhase::Ready,
                },
            })
            .collect::<Vec<_>>();
        snapshot.sort_by(|a, b| a.tenant_id.cmp(&b.tenant_id));
        snapshot
    }
}
