use crate::core::record::VersionRecord;
use crate::core::version::VersionId;
use async_trait::async_trait;
use thiserror::Error;

pub mod fetcher;
pub mod history;
pub mod record;
pub mod version;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Application {0} is unknown to the store")]
    UnknownApp(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Version {0} not found in history")]
    VersionNotFound(VersionId),

    #[error("A version history cannot be empty")]
    EmptyHistory,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// External byte store holding the durable version records of every
/// application. Implementations live with the embedding process; the
/// coordinator only depends on this seam.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Load every stored record for an application, most recent first.
    async fn load_versions(&self, app_id: &str) -> Result<Vec<VersionRecord>, StoreError>;
}
