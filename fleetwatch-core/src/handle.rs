//! Namespace handle for writing statuses.

use std::sync::Arc;

use fleetwatch_types::{Alarm, Host, Status, Tag};

use crate::store::StatusStore;

/// A handle for writing statuses into a single namespace.
///
/// This is the interface for ingestion code that owns one namespace.
/// Obtain a handle by calling `StatusStore::namespace()`. Each call takes the
/// store's exclusive lock for the duration of that one update.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use fleetwatch_core::StatusStore;
/// use fleetwatch_types::Status;
///
/// let store = Arc::new(StatusStore::new());
/// let handle = store.namespace("web.prod");
///
/// handle.set("cpu-v1", "host-1", "load", Status::now("OK"));
/// handle.set("cpu-v1", "host-2", "load", Status::now("CRITICAL"));
///
/// assert!(store.failing_hosts().is_failing("web.prod", "host-2"));
/// ```
#[derive(Clone)]
pub struct NamespaceHandle {
    pub(crate) store: Arc<StatusStore>,
    pub(crate) namespace: String,
}

impl NamespaceHandle {
    /// Record the latest status of a tag.
    ///
    /// # Arguments
    ///
    /// * `alarm` - The alarm (check definition) the reading belongs to
    /// * `host` - The host the reading came from
    /// * `tag` - The tag within the host's check
    /// * `status` - The reading
    pub fn set(
        &self,
        alarm: impl Into<Alarm>,
        host: impl Into<Host>,
        tag: impl Into<Tag>,
        status: Status,
    ) -> Option<Status> {
        self.store
            .set_status(self.namespace.as_str(), alarm, host, tag, status)
    }

    /// Register the namespace without any alarms.
    pub fn register(&self) {
        self.store.ensure_namespace(self.namespace.as_str());
    }

    /// Register an alarm without any hosts.
    pub fn register_alarm(&self, alarm: impl Into<Alarm>) {
        self.store.ensure_alarm(self.namespace.as_str(), alarm);
    }

    /// Drop an alarm and all its hosts.
    pub fn clear_alarm(&self, alarm: &str) -> bool {
        self.store.remove_alarm(&self.namespace, alarm)
    }

    /// Drop a host from an alarm.
    pub fn remove_host(&self, alarm: &str, host: &str) -> bool {
        self.store.remove_host(&self.namespace, alarm, host)
    }

    /// Get the namespace name.
    pub fn name(&self) -> &str {
        &self.namespace
    }
}

impl std::fmt::Debug for NamespaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceHandle")
            .field("namespace", &self.namespace)
            .finish()
    }
}
