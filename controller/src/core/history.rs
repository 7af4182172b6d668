use crate::core::version::{AppVersion, VersionClock, VersionId};
use crate::core::HistoryError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{event, Level};

/// Append-only version history of one application, most recent first.
///
/// The entry list is published behind an `Arc` swap: readers grab a snapshot
/// and keep iterating it unaffected while a refresh or rollback publishes
/// the next list. The write lock serializes the two writers, `install` and
/// `rollback`.
pub struct AppHistory {
    app_id: String,
    entries: RwLock<Arc<Vec<AppVersion>>>,
    clock: VersionClock,
}

impl AppHistory {
    pub fn new(app_id: String, initial: AppVersion) -> AppHistory {
        let clock = VersionClock::new();
        clock.observe(initial.version);
        AppHistory {
            app_id,
            entries: RwLock::new(Arc::new(vec![initial])),
            clock,
        }
    }

    /// Build a history from an already ordered list. A history is never
    /// empty, an application has at least its creation version.
    pub fn from_entries(
        app_id: String,
        entries: Vec<AppVersion>,
    ) -> Result<AppHistory, HistoryError> {
        if entries.is_empty() {
            return Err(HistoryError::EmptyHistory);
        }
        let clock = VersionClock::new();
        if let Some(newest) = entries.iter().map(|v| v.version).max() {
            clock.observe(newest);
        }
        Ok(AppHistory {
            app_id,
            entries: RwLock::new(Arc::new(entries)),
            clock,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Replace the entries wholesale with a freshly fetched list. The swap
    /// is atomic: a reader sees the previous list or the new one, never a
    /// mix. An empty list is refused and leaves the history as it was.
    pub fn install(&self, list: Vec<AppVersion>) -> Result<(), HistoryError> {
        if list.is_empty() {
            return Err(HistoryError::EmptyHistory);
        }
        if let Some(newest) = list.iter().map(|v| v.version).max() {
            self.clock.observe(newest);
        }
        let count = list.len();
        let mut entries = self.entries.write().unwrap();
        *entries = Arc::new(list);
        drop(entries);
        event!(
            Level::INFO,
            "Installed {} versions for application {}",
            count,
            self.app_id
        );
        Ok(())
    }

    /// Snapshot of the full entry list, most recent first.
    pub fn snapshot(&self) -> Arc<Vec<AppVersion>> {
        self.entries.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn current(&self) -> AppVersion {
        self.snapshot()[0].clone()
    }

    /// Every version except the current one, order preserved.
    pub fn older(&self) -> Vec<AppVersion> {
        self.snapshot()[1..].to_vec()
    }

    pub fn version(&self, id: VersionId) -> Option<AppVersion> {
        self.snapshot().iter().find(|v| v.version == id).cloned()
    }

    /// Zero-based page over the older versions. Pages past the end are
    /// empty, not an error, the renderer clamps by asking.
    pub fn paginate(&self, page: usize, page_size: usize) -> Vec<AppVersion> {
        if page_size == 0 {
            return Vec::new();
        }
        let snapshot = self.snapshot();
        let older = &snapshot[1..];
        let start = page.saturating_mul(page_size);
        if start >= older.len() {
            return Vec::new();
        }
        let end = (start + page_size).min(older.len());
        older[start..end].to_vec()
    }

    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        let older = self.len() - 1;
        (older + page_size - 1) / page_size
    }

    /// Make a historical spec current again by prepending a fresh snapshot
    /// of it. Nothing is removed or rewritten, the list only grows; acting
    /// on the new current spec is the caller's business.
    pub fn rollback(&self, target: VersionId) -> Result<AppVersion, HistoryError> {
        let mut entries = self.entries.write().unwrap();
        let spec = entries
            .iter()
            .find(|v| v.version == target)
            .map(|v| v.spec.clone())
            .ok_or_else(|| {
                event!(
                    Level::WARN,
                    "Rollback of application {} to unknown version {}",
                    self.app_id,
                    target
                );
                HistoryError::VersionNotFound(target)
            })?;

        let head = AppVersion::new(self.clock.next(), spec);
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.push(head.clone());
        next.extend(entries.iter().cloned());
        *entries = Arc::new(next);
        drop(entries);

        event!(
            Level::INFO,
            "Application {} rolled back to version {}, new head {}",
            self.app_id,
            target,
            head.version
        );
        Ok(head)
    }
}

/// One history per application, independent across applications. Explicit
/// registry rather than process state so lifecycle stays testable.
#[derive(Default)]
pub struct AppRegistry {
    apps: RwLock<HashMap<String, Arc<AppHistory>>>,
}

impl AppRegistry {
    pub fn new() -> AppRegistry {
        AppRegistry {
            apps: RwLock::new(HashMap::new()),
        }
    }

    /// Create the history for a new application, or hand back the existing
    /// one when the application is already registered.
    pub fn register(&self, app_id: &str, initial: AppVersion) -> Arc<AppHistory> {
        let mut apps = self.apps.write().unwrap();
        apps.entry(app_id.to_string())
            .or_insert_with(|| Arc::new(AppHistory::new(app_id.to_string(), initial)))
            .clone()
    }

    pub fn history(&self, app_id: &str) -> Option<Arc<AppHistory>> {
        self.apps.read().unwrap().get(app_id).cloned()
    }

    /// Address a single snapshot by `(app id, version id)`.
    pub fn version(&self, app_id: &str, version: VersionId) -> Option<AppVersion> {
        self.history(app_id)
            .and_then(|history| history.version(version))
    }

    pub fn remove(&self, app_id: &str) -> Option<Arc<AppHistory>> {
        self.apps.write().unwrap().remove(app_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::{AppSpec, AppVersion};
    use crate::tests::fixtures::{app_version, container_spec, version_list};
    use definition::container::ContainerSpec;
    use rstest::rstest;

    #[rstest]
    fn test_current_and_older_split() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(3)).unwrap();
        let entries = history.snapshot();
        assert_eq!(history.current(), entries[0]);
        assert_eq!(history.older(), entries[1..].to_vec());
    }

    #[rstest]
    fn test_history_cannot_start_empty() {
        let result = AppHistory::from_entries("app-one".to_string(), Vec::new());
        assert!(matches!(result, Err(HistoryError::EmptyHistory)));
    }

    #[rstest]
    fn test_install_replaces_wholesale() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(3)).unwrap();
        let replacement = version_list(5);
        history.install(replacement.clone()).unwrap();
        assert_eq!(*history.snapshot(), replacement);
    }

    #[rstest]
    fn test_install_refuses_empty_list() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(3)).unwrap();
        let before = history.snapshot();
        assert!(matches!(
            history.install(Vec::new()),
            Err(HistoryError::EmptyHistory)
        ));
        assert_eq!(history.snapshot(), before);
    }

    #[rstest]
    fn test_reader_snapshot_survives_writes() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(3)).unwrap();
        let snapshot = history.snapshot();
        let target = snapshot[2].version;
        history.rollback(target).unwrap();
        // The old snapshot is untouched, the new one has the extra head.
        assert_eq!(snapshot.len(), 3);
        assert_eq!(history.len(), 4);
    }

    #[rstest]
    fn test_rollback_appends_and_preserves() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(4)).unwrap();
        let before = history.snapshot();
        let target = before[2].clone();

        let head = history.rollback(target.version).unwrap();

        let after = history.snapshot();
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(history.current(), head);
        assert_eq!(head.spec, target.spec);
        assert!(head.version > before[0].version);
        // Every original entry is still there, unmodified and in order.
        assert_eq!(after[1..], before[..]);
    }

    #[rstest]
    fn test_rollback_to_unknown_version() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(3)).unwrap();
        let before = history.snapshot();
        let err = history.rollback(1).unwrap_err();
        assert_eq!(err, HistoryError::VersionNotFound(1));
        assert_eq!(history.snapshot(), before);
    }

    #[rstest]
    fn test_rollback_of_rollback() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(2)).unwrap();
        let original = history.snapshot()[1].clone();
        let first = history.rollback(original.version).unwrap();
        let second = history.rollback(first.version).unwrap();
        assert_eq!(second.spec, original.spec);
        assert_eq!(history.len(), 4);
    }

    #[rstest]
    #[case(0, 8)]
    #[case(1, 2)]
    fn test_pagination_of_ten_older(#[case] page: usize, #[case] expected: usize) {
        // 11 entries: one current + 10 older.
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(11)).unwrap();
        assert_eq!(history.paginate(page, 8).len(), expected);
        assert_eq!(history.page_count(8), 2);
    }

    #[rstest]
    fn test_pagination_slices_in_order() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(11)).unwrap();
        let older = history.older();
        assert_eq!(history.paginate(0, 8), older[0..8].to_vec());
        assert_eq!(history.paginate(1, 8), older[8..10].to_vec());
    }

    #[rstest]
    fn test_pagination_out_of_range_is_empty() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(11)).unwrap();
        assert!(history.paginate(5, 8).is_empty());
        assert!(history.paginate(usize::MAX, 8).is_empty());
        assert!(history.paginate(0, 0).is_empty());
        assert_eq!(history.page_count(0), 0);
    }

    #[rstest]
    fn test_registry_addresses_versions() {
        let registry = AppRegistry::new();
        let initial = app_version(1_700_000_000_000);
        registry.register("app-one", initial.clone());
        registry.register("app-two", app_version(1_700_000_000_500));

        assert_eq!(
            registry.version("app-one", initial.version),
            Some(initial.clone())
        );
        assert_eq!(registry.version("app-one", 77), None);
        assert_eq!(registry.version("ghost", initial.version), None);

        // Registering twice keeps the first history.
        let again = registry.register("app-one", app_version(99));
        assert_eq!(again.current(), initial);

        registry.remove("app-one");
        assert!(registry.history("app-one").is_none());
    }

    #[rstest]
    fn test_histories_are_independent_across_apps() {
        let registry = AppRegistry::new();
        let one = registry.register("app-one", app_version(1_700_000_000_000));
        let two = registry.register("app-two", app_version(1_700_000_000_000));

        one.install(version_list(5)).unwrap();
        assert_eq!(one.len(), 5);
        assert_eq!(two.len(), 1);
    }

    #[rstest]
    fn test_clock_outranks_installed_head() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(2)).unwrap();
        let head = history.current();
        let rolled = history.rollback(head.version).unwrap();
        assert!(rolled.version > head.version);
        assert_eq!(rolled.spec, head.spec);
    }

    #[rstest]
    fn test_install_replaces_spec_contents() {
        let history =
            AppHistory::from_entries("app-one".to_string(), version_list(2)).unwrap();
        let mut list = version_list(2);
        list[0].spec = AppSpec::new(None);
        history.install(list.clone()).unwrap();
        assert_eq!(history.current().spec.container, None);
    }

    #[rstest]
    fn test_version_lookup(container_spec: ContainerSpec) {
        let history = AppHistory::new(
            "app-one".to_string(),
            AppVersion::new(5, AppSpec::new(Some(container_spec))),
        );
        assert!(history.version(5).unwrap().spec.container.is_some());
        assert_eq!(history.version(6), None);
    }
}
