//! Shared status state behind a single reader/writer lock.

use std::sync::Arc;

use fleetwatch_types::{current_timestamp_ms, Alarm, Host, Namespace, Status, StatusTree, Tag};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::handle::NamespaceHandle;
use crate::lookup::lookup;
use crate::query::{
    status_entries, AlarmHealth, FailingHosts, NamespaceHealth, StatusEntry, StatusFilter,
};

/// The live status tree of the fleet.
///
/// Readers take the shared lock for the whole of a query, so a query never
/// mixes two versions of the tree. Writers take the exclusive lock; while a
/// writer holds it every query waits.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use fleetwatch_core::StatusStore;
/// use fleetwatch_types::Status;
///
/// let store = Arc::new(StatusStore::new());
/// store.set_status("web.prod", "cpu-v1", "host-1", "load", Status::new("CRITICAL", 0));
/// store.ensure_namespace("db.prod");
///
/// let health = store.namespace_health();
/// assert_eq!(health.get("web.prod"), Some(false));
/// assert_eq!(health.get("db.prod"), Some(true));
/// ```
#[derive(Debug, Default)]
pub struct StatusStore {
    tree: RwLock<StatusTree>,
}

impl StatusStore {
    /// Create a store with an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `tree`.
    pub fn from_tree(tree: StatusTree) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    // ------------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------------

    /// Shared access to the tree. Hold the guard for the whole read.
    pub fn read(&self) -> RwLockReadGuard<'_, StatusTree> {
        self.tree.read()
    }

    /// Exclusive access to the tree for ingestion.
    pub fn write(&self) -> RwLockWriteGuard<'_, StatusTree> {
        self.tree.write()
    }

    /// A writer handle scoped to one namespace.
    pub fn namespace(self: &Arc<Self>, ns: impl Into<Namespace>) -> NamespaceHandle {
        NamespaceHandle {
            store: Arc::clone(self),
            namespace: ns.into(),
        }
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Insert or overwrite a tag status. Returns the previous status, if any.
    pub fn set_status(
        &self,
        ns: impl Into<Namespace>,
        alarm: impl Into<Alarm>,
        host: impl Into<Host>,
        tag: impl Into<Tag>,
        status: Status,
    ) -> Option<Status> {
        self.tree.write().insert(ns, alarm, host, tag, status)
    }

    /// Make sure a namespace exists.
    pub fn ensure_namespace(&self, ns: impl Into<Namespace>) {
        self.tree.write().ensure_namespace(ns);
    }

    /// Make sure an alarm exists under a namespace.
    pub fn ensure_alarm(&self, ns: impl Into<Namespace>, alarm: impl Into<Alarm>) {
        self.tree.write().ensure_alarm(ns, alarm);
    }

    /// Remove a namespace. Returns whether it existed.
    pub fn remove_namespace(&self, ns: &str) -> bool {
        let removed = self.tree.write().remove_namespace(ns).is_some();
        if removed {
            debug!(namespace = ns, "removed namespace");
        }
        removed
    }

    /// Remove an alarm. Returns whether it existed.
    pub fn remove_alarm(&self, ns: &str, alarm: &str) -> bool {
        self.tree.write().remove_alarm(ns, alarm).is_some()
    }

    /// Remove a host from an alarm. Returns whether it existed.
    pub fn remove_host(&self, ns: &str, alarm: &str, host: &str) -> bool {
        self.tree.write().remove_host(ns, alarm, host).is_some()
    }

    /// Remove a tag. Returns whether it existed.
    pub fn remove_tag(&self, ns: &str, alarm: &str, host: &str, tag: &str) -> bool {
        self.tree.write().remove_tag(ns, alarm, host, tag).is_some()
    }

    /// Swap in a whole new tree, returning the previous one.
    pub fn replace(&self, tree: StatusTree) -> StatusTree {
        let namespaces = tree.len();
        let previous = std::mem::replace(&mut *self.tree.write(), tree);
        debug!(namespaces, previous = previous.len(), "replaced status tree");
        previous
    }

    /// Remove every namespace.
    pub fn clear(&self) {
        self.tree.write().clear();
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Copy of the part of the tree at or below namespace `query`.
    ///
    /// An empty query copies the whole tree.
    pub fn lookup(&self, query: &str) -> StatusTree {
        lookup(&self.tree.read(), query)
    }

    /// Run `f` over the subtree for `query` under a single shared lock.
    ///
    /// An empty query hands `f` the live tree without copying it.
    ///
    /// ```rust
    /// use fleetwatch_core::{NamespaceHealth, StatusStore};
    /// use fleetwatch_types::Status;
    ///
    /// let store = StatusStore::new();
    /// store.set_status("api.svc", "cpu", "h1", "load", Status::new("CRITICAL", 0));
    /// store.ensure_namespace("db");
    ///
    /// let health = store.with_subtree("svc", NamespaceHealth::from_tree);
    /// assert_eq!(health.len(), 1);
    /// assert_eq!(health.get("api.svc"), Some(false));
    /// ```
    pub fn with_subtree<R>(&self, query: &str, f: impl FnOnce(&StatusTree) -> R) -> R {
        let tree = self.tree.read();
        if query.is_empty() {
            f(&*tree)
        } else {
            f(&lookup(&tree, query))
        }
    }

    /// Health of every namespace.
    pub fn namespace_health(&self) -> NamespaceHealth {
        NamespaceHealth::from_tree(&self.tree.read())
    }

    /// Health of every alarm, grouped by namespace.
    pub fn alarm_health(&self) -> AlarmHealth {
        AlarmHealth::from_tree(&self.tree.read())
    }

    /// Failing hosts, grouped by namespace.
    pub fn failing_hosts(&self) -> FailingHosts {
        FailingHosts::from_tree(&self.tree.read())
    }

    /// Statuses matching `filter`, aged against the wall clock.
    pub fn status_list(&self, filter: &StatusFilter) -> Vec<Status> {
        self.status_entries(filter)
            .into_iter()
            .map(|entry| entry.status)
            .collect()
    }

    /// Statuses matching `filter` with their tree location, aged against the wall clock.
    pub fn status_entries(&self, filter: &StatusFilter) -> Vec<StatusEntry> {
        let tree = self.tree.read();
        status_entries(&tree, filter, current_timestamp_ms())
    }

    /// Number of namespaces.
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// Whether the tree has no namespaces.
    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    fn fleet() -> StatusTree {
        StatusTree::builder()
            .namespace("idle", |ns| ns)
            .namespace("web.prod", |ns| {
                ns.alarm("cpu-v1", |a| {
                    a.host("h1", |h| h.tag("load", "OK", 0))
                        .host("h2", |h| h.tag("load", "CRITICAL", 0))
                })
            })
            .namespace("api.web.prod", |ns| ns.alarm("http-v1", |a| a))
            .build()
    }

    #[test]
    fn test_store_queries() {
        let store = StatusStore::from_tree(fleet());

        let ns = store.namespace_health();
        assert_eq!(ns.get("idle"), Some(true));
        assert_eq!(ns.get("web.prod"), Some(false));
        assert_eq!(ns.get("api.web.prod"), Some(true));

        let alarms = store.alarm_health();
        assert_eq!(alarms.get("web.prod", "cpu-v1"), Some(false));
        assert_eq!(alarms.get("api.web.prod", "http-v1"), Some(true));

        let hosts = store.failing_hosts();
        assert!(hosts.is_failing("web.prod", "h2"));
        assert!(!hosts.is_failing("web.prod", "h1"));

        let critical = store.status_list(&StatusFilter::new().level("CRITICAL"));
        assert_eq!(critical.len(), 1);
        assert!(critical[0].last_time.is_some());
    }

    #[test]
    fn status_list_ages_against_wall_clock() {
        let store = StatusStore::new();
        let created = current_timestamp_ms() - 5_000;
        store.set_status("a", "x", "h", "t", Status::new("WARNING", created));

        let list = store.status_list(&StatusFilter::new());
        assert_eq!(list.len(), 1);
        let age = list[0].last_time.unwrap();
        assert!((5..=6).contains(&age), "age was {age}");
    }

    #[test]
    fn lookup_and_subtree() {
        let store = StatusStore::from_tree(fleet());

        assert_eq!(store.lookup(""), fleet());
        assert_eq!(store.lookup("web.prod").len(), 2);
        assert!(store.lookup("nope").is_empty());

        let health = store.with_subtree("web.prod", NamespaceHealth::from_tree);
        assert_eq!(health.len(), 2);
        assert!(health.get("idle").is_none());
    }

    #[test]
    fn queries_are_idempotent() {
        let store = StatusStore::from_tree(fleet());
        assert_eq!(store.namespace_health(), store.namespace_health());
        assert_eq!(store.alarm_health(), store.alarm_health());
        assert_eq!(store.failing_hosts(), store.failing_hosts());
        assert_eq!(store.lookup("prod"), store.lookup("prod"));
    }

    #[test]
    fn mutations_are_visible_to_queries() {
        let store = StatusStore::from_tree(fleet());

        assert!(store.remove_host("web.prod", "cpu-v1", "h2"));
        assert_eq!(store.namespace_health().get("web.prod"), Some(true));

        assert!(store.remove_alarm("web.prod", "cpu-v1"));
        assert!(store.alarm_health().namespace("web.prod").unwrap().is_empty());

        assert!(store.remove_namespace("web.prod"));
        assert!(!store.remove_namespace("web.prod"));
        assert_eq!(store.len(), 2);

        assert!(!store.remove_tag("idle", "x", "h", "t"));

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn replace_returns_previous_tree() {
        let store = StatusStore::from_tree(fleet());
        let previous = store.replace(StatusTree::new());
        assert_eq!(previous, fleet());
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_readers_agree() {
        let store = Arc::new(StatusStore::from_tree(fleet()));
        let expected = store.namespace_health();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..100)
                        .map(|_| store.namespace_health())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for h in handles {
            for result in h.join().unwrap() {
                assert_eq!(result, expected);
            }
        }
    }

    #[test]
    fn writer_blocks_readers_until_released() {
        let store = Arc::new(StatusStore::from_tree(fleet()));
        let done = Arc::new(AtomicBool::new(false));

        let mut guard = store.write();
        guard.remove_namespace("web.prod");

        let reader = {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let health = store.namespace_health();
                done.store(true, Ordering::SeqCst);
                health
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!done.load(Ordering::SeqCst));

        // Finish the update before releasing.
        guard.insert("web.prod", "cpu-v1", "h1", "load", Status::new("OK", 0));
        drop(guard);

        let health = reader.join().unwrap();
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(health.get("web.prod"), Some(true));
    }

    #[test]
    fn concurrent_writes_and_reads() {
        let store = Arc::new(StatusStore::new());

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for j in 0..50 {
                        store.set_status(
                            format!("ns-{i}"),
                            "alarm",
                            format!("host-{j}"),
                            "tag",
                            Status::new("OK", 0),
                        );
                    }
                })
            })
            .collect();

        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..50 {
                    // Every namespace seen must be healthy: no write ever inserts a failure.
                    assert!(store.namespace_health().all_healthy());
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(store.len(), 4);
        assert_eq!(store.read().leaf_count(), 200);
    }
}
