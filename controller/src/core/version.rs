use chrono::Utc;
use definition::container::ContainerSpec;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Version identifiers are creation timestamps in epoch milliseconds, their
/// numeric order is the version order.
pub type VersionId = i64;

/// Mints strictly increasing version identifiers. Wall clock based, with a
/// guard so two versions minted in the same millisecond (or after the clock
/// stepped back) still order correctly.
pub struct VersionClock {
    last: Mutex<VersionId>,
}

impl VersionClock {
    pub fn new() -> VersionClock {
        VersionClock {
            last: Mutex::new(0),
        }
    }

    /// Advance past an identifier that was minted elsewhere, e.g. the head
    /// of a freshly installed list.
    pub fn observe(&self, id: VersionId) {
        let mut last = self.last.lock().unwrap();
        if id > *last {
            *last = id;
        }
    }

    pub fn next(&self) -> VersionId {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last.lock().unwrap();
        let id = now.max(*last + 1);
        *last = id;
        id
    }
}

impl Default for VersionClock {
    fn default() -> Self {
        VersionClock::new()
    }
}

/// Full application payload of one version: the modeled container section
/// plus everything else the application definition carries (resources,
/// health checks, ...), passed through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSpec {
    pub container: Option<ContainerSpec>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl AppSpec {
    pub fn new(container: Option<ContainerSpec>) -> AppSpec {
        AppSpec {
            container,
            payload: serde_json::Value::Null,
        }
    }
}

/// One immutable snapshot of an application. Created on every create,
/// update and rollback, never mutated afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppVersion {
    pub version: VersionId,
    pub spec: AppSpec,
}

impl AppVersion {
    pub fn new(version: VersionId, spec: AppSpec) -> AppVersion {
        AppVersion { version, spec }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_strictly_increasing() {
        let clock = VersionClock::new();
        let mut previous = clock.next();
        for _ in 0..1000 {
            let id = clock.next();
            assert!(id > previous);
            previous = id;
        }
    }

    #[test]
    fn test_clock_advances_past_observed_ids() {
        let clock = VersionClock::new();
        let far_future = Utc::now().timestamp_millis() + 3_600_000;
        clock.observe(far_future);
        assert!(clock.next() > far_future);
    }

    #[test]
    fn test_observe_ignores_older_ids() {
        let clock = VersionClock::new();
        let id = clock.next();
        clock.observe(id - 1000);
        assert!(clock.next() > id);
    }
}
