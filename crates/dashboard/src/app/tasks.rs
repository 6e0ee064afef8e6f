use std::future::Future;

use api_types::{
    bulk_load::{
        BulkLoadError, BulkLoadProcess, BulkLoadResponse, BulkLoadStatistics, ProcessDetails,
        ProcessStatusView,
    },
    client::{Account, ClientDetail, PayrollPayment},
    health::{HealthResponse, ProbeResponse},
    page::PaginatedResponse,
};
use tokio::{sync::mpsc, task::JoinSet};

use crate::{client::ClientResult, controllers::Probe};

pub type ScopeId = u64;

/// A completed background fetch, tagged with the scope that spawned it.
#[derive(Debug)]
pub struct AppEvent {
    pub scope: ScopeId,
    pub payload: Payload,
}

#[derive(Debug)]
pub enum Payload {
    Health {
        generation: u64,
        result: ClientResult<HealthResponse>,
    },
    Probe {
        probe: Probe,
        result: ClientResult<ProbeResponse>,
    },
    Processes {
        generation: u64,
        result: ClientResult<PaginatedResponse<BulkLoadProcess>>,
    },
    Clients {
        generation: u64,
        result: ClientResult<PaginatedResponse<ClientDetail>>,
    },
    Errors {
        generation: u64,
        result: ClientResult<PaginatedResponse<BulkLoadError>>,
    },
    Uploaded {
        generation: u64,
        result: ClientResult<BulkLoadResponse>,
    },
    /// First client of a process, used to open its details directly.
    FirstClient {
        process_id: String,
        result: ClientResult<PaginatedResponse<ClientDetail>>,
    },
    Client {
        generation: u64,
        result: ClientResult<ClientDetail>,
    },
    Account {
        generation: u64,
        result: ClientResult<Account>,
    },
    FirstPayment {
        generation: u64,
        result: ClientResult<PayrollPayment>,
    },
    ProcessDetails {
        generation: u64,
        result: ClientResult<ProcessDetails>,
    },
    Statistics {
        generation: u64,
        result: ClientResult<BulkLoadStatistics>,
    },
    ProcessStatus {
        generation: u64,
        result: ClientResult<ProcessStatusView>,
    },
}

/// Owns the background work of one screen, dialog or the header.
///
/// Dropping the scope aborts every task still running; events those tasks
/// already sent are recognised by their scope id and discarded.
#[derive(Debug)]
pub struct TaskScope {
    id: ScopeId,
    tasks: JoinSet<()>,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl TaskScope {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = Payload> + Send + 'static,
    {
        let tx = self.tx.clone();
        let scope = self.id;
        self.tasks.spawn(async move {
            let payload = work.await;
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(AppEvent { scope, payload });
        });
    }

    /// Collects finished tasks and reports those that panicked.
    pub fn reap(&mut self) -> Vec<String> {
        let mut failures = Vec::new();
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(err) = joined {
                if err.is_panic() {
                    tracing::error!(scope = self.id, "background task panicked: {err}");
                    failures.push(format!("Background task failed: {err}"));
                }
            }
        }
        failures
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!(scope = self.id, pending = self.tasks.len(), "aborting scope tasks");
        }
        self.tasks.abort_all();
    }
}

/// Hands out scopes with unique ids, all feeding one event channel.
#[derive(Debug)]
pub struct Scopes {
    next: ScopeId,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl Scopes {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { next: 1, tx }
    }

    pub fn open(&mut self) -> TaskScope {
        let id = self.next;
        self.next += 1;
        TaskScope {
            id,
            tasks: JoinSet::new(),
            tx: self.tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn health_payload(generation: u64) -> Payload {
        Payload::Health {
            generation,
            result: Ok(HealthResponse::down("svc", "1")),
        }
    }

    #[tokio::test]
    async fn events_carry_their_scope() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scopes = Scopes::new(tx);
        let mut first = scopes.open();
        let second = scopes.open();
        assert_ne!(first.id(), second.id());

        first.spawn(async { health_payload(1) });
        let event = rx.recv().await.unwrap();
        assert_eq!(event.scope, first.id());
        assert!(matches!(event.payload, Payload::Health { generation: 1, .. }));
    }

    #[tokio::test]
    async fn dropping_scope_aborts_pending_work() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scopes = Scopes::new(tx);
        let mut scope = scopes.open();
        scope.spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            health_payload(1)
        });
        assert_eq!(scope.pending(), 1);
        drop(scope);
        drop(scopes);
        assert!(rx.recv().await.is_none());
    }

    fn explode() -> Payload {
        panic!("boom")
    }

    #[tokio::test]
    async fn reap_reports_panics() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scope = Scopes::new(tx).open();
        scope.spawn(async { explode() });

        let mut failures = Vec::new();
        for _ in 0..100 {
            tokio::task::yield_now().await;
            failures.extend(scope.reap());
            if !failures.is_empty() {
                break;
            }
        }
        assert_eq!(failures.len(), 1);
        assert_eq!(scope.pending(), 0);
    }
}
