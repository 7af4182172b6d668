use crate::config::HistoryConfig;
use crate::core::history::AppHistory;
use crate::core::record::{decode_record, VersionRecord};
use crate::core::version::{AppVersion, VersionId};
use crate::core::{HistoryError, StoreError, VersionStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{event, Level};

/// Load state as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Success,
    /// Failure cause, shown to the user; another fetch recovers
    Error(String),
}

/// Drives the asynchronous refresh of one application's version history and
/// exposes the read surface the renderer works against.
///
/// Every fetch is tagged with a monotonically increasing request token and
/// only the most recently issued token may publish its outcome. An older
/// in-flight request is not cancelled, its response is simply discarded on
/// arrival.
#[derive(Clone)]
pub struct FetchCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn VersionStore>,
    history: Arc<AppHistory>,
    config: HistoryConfig,
    latest_token: AtomicU64,
    state: watch::Sender<FetchState>,
    /// Serializes response application so the token check and the install
    /// publish as one step.
    apply: Mutex<()>,
}

impl FetchCoordinator {
    pub fn new(
        store: Arc<dyn VersionStore>,
        history: Arc<AppHistory>,
        config: HistoryConfig,
    ) -> FetchCoordinator {
        let (state, _) = watch::channel(FetchState::Idle);
        FetchCoordinator {
            inner: Arc::new(Inner {
                store,
                history,
                config,
                latest_token: AtomicU64::new(0),
                state,
                apply: Mutex::new(()),
            }),
        }
    }

    /// Start a refresh and return immediately. Safe to call from any state,
    /// overlapping calls supersede each other.
    pub fn fetch(&self) {
        let token = self.inner.issue();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = inner.store.load_versions(inner.history.app_id()).await;
            inner.complete(token, outcome);
        });
    }

    pub fn refresh(&self) {
        self.fetch();
    }

    pub fn state(&self) -> FetchState {
        self.inner.state.borrow().clone()
    }

    /// Renderer side of the watch channel, fires on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.inner.state.subscribe()
    }

    pub fn current_version(&self) -> AppVersion {
        self.inner.history.current()
    }

    pub fn older_versions(&self) -> Vec<AppVersion> {
        self.inner.history.older()
    }

    pub fn paginate(&self, page: usize, page_size: usize) -> Vec<AppVersion> {
        self.inner.history.paginate(page, page_size)
    }

    /// Page of older versions at the configured page size.
    pub fn page(&self, page: usize) -> Vec<AppVersion> {
        self.inner.history.paginate(page, self.inner.config.page_size)
    }

    pub fn page_count(&self) -> usize {
        self.inner.history.page_count(self.inner.config.page_size)
    }

    pub fn rollback(&self, version: VersionId) -> Result<AppVersion, HistoryError> {
        self.inner.history.rollback(version)
    }

    /// Launch bytes of the current head, handed to the resource manager
    /// when the workload (re)starts. `None` when the head has no container
    /// section.
    pub fn launch_payload(&self) -> Option<Vec<u8>> {
        self.inner
            .history
            .current()
            .spec
            .container
            .map(|container| proto::scheduler::encode(&container))
    }

    #[cfg(test)]
    pub(crate) fn issue(&self) -> u64 {
        self.inner.issue()
    }

    #[cfg(test)]
    pub(crate) fn complete(&self, token: u64, outcome: Result<Vec<VersionRecord>, StoreError>) {
        self.inner.complete(token, outcome)
    }
}

impl Inner {
    /// Issue the next request token and publish `Loading`.
    fn issue(&self) -> u64 {
        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(FetchState::Loading);
        event!(
            Level::DEBUG,
            "Fetching versions of application {} (request {})",
            self.history.app_id(),
            token
        );
        token
    }

    /// Apply a store response. Responses carrying anything but the latest
    /// issued token are dropped, last issued wins.
    fn complete(&self, token: u64, outcome: Result<Vec<VersionRecord>, StoreError>) {
        let _guard = self.apply.lock().unwrap();
        if token != self.latest_token.load(Ordering::SeqCst) {
            event!(
                Level::DEBUG,
                "Discarding superseded response for application {} (request {})",
                self.history.app_id(),
                token
            );
            return;
        }

        let next = match outcome {
            Ok(records) => {
                let versions: Vec<AppVersion> = records.iter().map(decode_record).collect();
                match self.history.install(versions) {
                    Ok(()) => FetchState::Success,
                    Err(e) => FetchState::Error(e.to_string()),
                }
            }
            Err(e) => {
                event!(
                    Level::ERROR,
                    "Fetching versions of application {} failed: {}",
                    self.history.app_id(),
                    e
                );
                FetchState::Error(e.to_string())
            }
        };
        self.state.send_replace(next);
    }
}
