//! Moving trees from a source into the store.

use std::sync::Arc;
use std::time::Duration;

use fleetwatch_core::StatusStore;
use tracing::{debug, warn};

use crate::source::TreeSource;

/// Feeds a [`StatusStore`] from a [`TreeSource`].
///
/// Each new tree replaces the stored one under the store's exclusive lock,
/// so readers see either the old tree or the new one, never a mix.
#[derive(Debug)]
pub struct Ingestor {
    source: Box<dyn TreeSource>,
    store: Arc<StatusStore>,
    updates: u64,
    /// Last source error logged, so a persisting error is reported once.
    reported_error: Option<String>,
}

impl Ingestor {
    pub fn new(source: Box<dyn TreeSource>, store: Arc<StatusStore>) -> Self {
        Self {
            source,
            store,
            updates: 0,
            reported_error: None,
        }
    }

    pub fn store(&self) -> &Arc<StatusStore> {
        &self.store
    }

    pub fn source(&self) -> &dyn TreeSource {
        self.source.as_ref()
    }

    /// Number of trees applied so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Poll the source once and apply any new tree.
    ///
    /// Returns whether the store was updated.
    pub fn ingest_once(&mut self) -> bool {
        match self.source.poll() {
            Some(tree) => {
                let namespaces = tree.len();
                let leaves = tree.leaf_count();
                self.store.replace(tree);
                self.updates += 1;
                self.reported_error = None;
                debug!(
                    source = self.source.description(),
                    namespaces,
                    leaves,
                    update = self.updates,
                    "Applied status tree"
                );
                true
            }
            None => {
                self.report_error();
                false
            }
        }
    }

    /// Log the source's error if it differs from the one last logged.
    ///
    /// Returns whether a warning was emitted.
    fn report_error(&mut self) -> bool {
        let current = self.source.error().map(|err| err.to_string());
        if current == self.reported_error {
            return false;
        }
        if let Some(err) = &current {
            warn!(source = self.source.description(), "Source error: {}", err);
        }
        let logged = current.is_some();
        self.reported_error = current;
        logged
    }

    /// Poll the source every `interval` until the task is dropped, calling
    /// `on_update` after each applied tree.
    pub async fn run<F>(mut self, interval: Duration, mut on_update: F)
    where
        F: FnMut(&StatusStore),
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.ingest_once() {
                on_update(&*self.store);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ChannelSource, FileSource};
    use fleetwatch_types::{Status, StatusTree};

    fn critical_tree() -> StatusTree {
        StatusTree::builder()
            .namespace("web.prod", |ns| {
                ns.alarm("cpu-v1", |a| a.host("host-1", |h| h.tag("load", "CRITICAL", 0)))
            })
            .build()
    }

    #[test]
    fn test_ingest_applies_new_trees() {
        let store = Arc::new(StatusStore::new());
        let (tx, source) = ChannelSource::create("test");
        let mut ingestor = Ingestor::new(Box::new(source), Arc::clone(&store));

        // initial empty tree
        assert!(ingestor.ingest_once());
        assert!(store.is_empty());
        assert!(!ingestor.ingest_once());

        tx.send(critical_tree()).unwrap();
        assert!(ingestor.ingest_once());
        assert_eq!(store.namespace_health().get("web.prod"), Some(false));
        assert_eq!(ingestor.updates(), 2);
    }

    #[test]
    fn test_ingest_replaces_whole_tree() {
        let store = Arc::new(StatusStore::new());
        store.set_status("old.prod", "a", "h", "t", Status::new("OK", 0));

        let (tx, source) = ChannelSource::create("test");
        tx.send(critical_tree()).unwrap();
        let mut ingestor = Ingestor::new(Box::new(source), Arc::clone(&store));
        assert!(ingestor.ingest_once());

        let health = store.namespace_health();
        assert_eq!(health.get("old.prod"), None);
        assert_eq!(health.get("web.prod"), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reports_updates() {
        let store = Arc::new(StatusStore::new());
        let (tx, source) = ChannelSource::create("test");
        let ingestor = Ingestor::new(Box::new(source), Arc::clone(&store));

        let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel();
        let task = tokio::spawn(ingestor.run(Duration::from_millis(10), move |store| {
            let _ = seen_tx.send(store.namespace_health().all_healthy());
        }));

        assert_eq!(seen_rx.recv().await, Some(true));
        tx.send(critical_tree()).unwrap();
        assert_eq!(seen_rx.recv().await, Some(false));

        task.abort();
    }

    #[test]
    fn test_persisting_source_error_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        let store = Arc::new(StatusStore::new());
        let mut ingestor = Ingestor::new(Box::new(FileSource::new(&path)), Arc::clone(&store));

        assert!(!ingestor.ingest_once());
        assert!(ingestor.reported_error.as_deref().unwrap().starts_with("Read error"));
        // same error on the next ticks: nothing new to log
        assert!(!ingestor.report_error());
        assert!(!ingestor.ingest_once());
        assert!(!ingestor.report_error());

        std::fs::write(&path, "not json").unwrap();
        assert!(!ingestor.ingest_once());
        assert!(ingestor.reported_error.as_deref().unwrap().starts_with("Parse error"));

        std::fs::write(&path, r#"{"web.prod": {}}"#).unwrap();
        assert!(ingestor.ingest_once());
        assert!(ingestor.reported_error.is_none());
        assert_eq!(store.namespace_health().get("web.prod"), Some(true));
    }
}
