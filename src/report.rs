//! JSON report of the store's current state.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use fleetwatch_core::{
    status_entries, AlarmHealth, FailingHosts, NamespaceHealth, StatusFilter, StatusStore,
};
use serde_json::{json, Value};

/// Build a report with a summary and the result of every query.
///
/// All queries run against the same snapshot of the tree.
pub fn build_report(store: &StatusStore, now_ms: u64) -> Value {
    store.with_subtree("", |tree| {
        let namespaces = NamespaceHealth::from_tree(tree);
        let alarms = AlarmHealth::from_tree(tree);
        let hosts = FailingHosts::from_tree(tree);
        let statuses = status_entries(tree, &StatusFilter::new(), now_ms);

        let failing_namespaces: Vec<&str> = namespaces.failing().collect();
        let failing_alarms: Vec<Value> = alarms
            .failing()
            .map(|(ns, alarm)| json!({ "namespace": ns, "alarm": alarm }))
            .collect();

        json!({
            "summary": {
                "namespaces": namespaces.len(),
                "healthy_namespaces": namespaces.len() - failing_namespaces.len(),
                "failing_namespaces": failing_namespaces.len(),
                "failing_alarms": failing_alarms.len(),
                "failing_hosts": hosts.host_count(),
                "statuses": statuses.len(),
                "generated_at_ms": now_ms,
            },
            "namespaces": namespaces,
            "alarms": alarms,
            "failing_hosts": hosts,
            "failing": {
                "namespaces": failing_namespaces,
                "alarms": failing_alarms,
            },
            "statuses": statuses,
        })
    })
}

/// Write the report for `store` to `path` as pretty JSON.
pub fn export_to_file(store: &StatusStore, path: &Path, now_ms: u64) -> Result<()> {
    let report = build_report(store, now_ms);
    let json = serde_json::to_string_pretty(&report)?;
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// A namespace whose health differs between two query results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthChange {
    pub namespace: String,
    /// `None` when the namespace is new.
    pub was: Option<bool>,
    /// `None` when the namespace is gone.
    pub now: Option<bool>,
}

/// Namespaces whose health changed from `before` to `after`.
pub fn health_changes(before: &NamespaceHealth, after: &NamespaceHealth) -> Vec<HealthChange> {
    let mut changes: Vec<HealthChange> = after
        .namespaces
        .iter()
        .filter(|(ns, healthy)| before.get(ns) != Some(**healthy))
        .map(|(ns, healthy)| HealthChange {
            namespace: ns.clone(),
            was: before.get(ns),
            now: Some(*healthy),
        })
        .collect();

    changes.extend(
        before
            .namespaces
            .iter()
            .filter(|(ns, _)| after.get(ns).is_none())
            .map(|(ns, healthy)| HealthChange {
                namespace: ns.clone(),
                was: Some(*healthy),
                now: None,
            }),
    );
    changes
}
