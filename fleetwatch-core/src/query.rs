//! Derived health views over the status tree.
//!
//! Each view is a fold over [`walk`](crate::walk::walk) into its own typed
//! result, except the status list, which needs the raw [`Status`] values and
//! therefore traverses the tree directly.

use std::collections::BTreeMap;

use fleetwatch_types::{Alarm, Host, Namespace, Status, StatusTree};

use crate::walk::{walk, Visit};

/// Health of each namespace.
///
/// A namespace is healthy unless at least one tag anywhere below it carries
/// an unhealthy level. Namespaces without alarms are healthy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NamespaceHealth {
    pub namespaces: BTreeMap<Namespace, bool>,
}

impl NamespaceHealth {
    /// Compute namespace health for a tree.
    pub fn from_tree(tree: &StatusTree) -> Self {
        walk(tree).fold(Self::default(), |mut acc, visit| {
            acc.observe(&visit);
            acc
        })
    }

    /// Fold a single visit into the result.
    ///
    /// The first visit creates the entry as healthy. Any unhealthy visit,
    /// including the first, marks it unhealthy for good.
    pub fn observe(&mut self, visit: &Visit<'_>) {
        let healthy = namespace_entry(&mut self.namespaces, visit.namespace, || true);
        if !visit.is_healthy() {
            *healthy = false;
        }
    }

    /// Health of one namespace, if it was seen.
    pub fn get(&self, ns: &str) -> Option<bool> {
        self.namespaces.get(ns).copied()
    }

    /// Whether every namespace is healthy.
    pub fn all_healthy(&self) -> bool {
        self.namespaces.values().all(|healthy| *healthy)
    }

    /// Names of unhealthy namespaces.
    pub fn failing(&self) -> impl Iterator<Item = &str> {
        self.namespaces
            .iter()
            .filter(|(_, healthy)| !**healthy)
            .map(|(ns, _)| ns.as_str())
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// Health of each alarm, grouped by namespace.
///
/// Every namespace gets an entry, possibly empty. An alarm without hosts is
/// healthy; an alarm with at least one unhealthy tag is unhealthy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AlarmHealth {
    pub namespaces: BTreeMap<Namespace, BTreeMap<Alarm, bool>>,
}

impl AlarmHealth {
    /// Compute alarm health for a tree.
    pub fn from_tree(tree: &StatusTree) -> Self {
        walk(tree).fold(Self::default(), |mut acc, visit| {
            acc.observe(&visit);
            acc
        })
    }

    /// Fold a single visit into the result.
    ///
    /// Transitions are absent -> `true` on a healthy visit and anything ->
    /// `false` on an unhealthy one. A healthy visit never overwrites an
    /// existing entry.
    pub fn observe(&mut self, visit: &Visit<'_>) {
        let alarms = namespace_entry(&mut self.namespaces, visit.namespace, BTreeMap::new);
        if visit.alarm.is_empty() {
            return;
        }

        if !visit.is_healthy() {
            alarms.insert(visit.alarm.to_string(), false);
        } else if !alarms.contains_key(visit.alarm) {
            alarms.insert(visit.alarm.to_string(), true);
        }
    }

    /// Alarms of one namespace, if it was seen.
    pub fn namespace(&self, ns: &str) -> Option<&BTreeMap<Alarm, bool>> {
        self.namespaces.get(ns)
    }

    /// Health of one alarm, if it was seen.
    pub fn get(&self, ns: &str, alarm: &str) -> Option<bool> {
        self.namespace(ns)?.get(alarm).copied()
    }

    /// `(namespace, alarm)` pairs that are unhealthy.
    pub fn failing(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces.iter().flat_map(|(ns, alarms)| {
            alarms
                .iter()
                .filter(|(_, healthy)| !**healthy)
                .map(move |(alarm, _)| (ns.as_str(), alarm.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// Unhealthy hosts, grouped by namespace.
///
/// Only failing hosts are recorded (always as `false`); a host missing from
/// its namespace's map is healthy. Every namespace gets an entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FailingHosts {
    pub namespaces: BTreeMap<Namespace, BTreeMap<Host, bool>>,
}

impl FailingHosts {
    /// Compute failing hosts for a tree.
    pub fn from_tree(tree: &StatusTree) -> Self {
        walk(tree).fold(Self::default(), |mut acc, visit| {
            acc.observe(&visit);
            acc
        })
    }

    /// Fold a single visit into the result.
    pub fn observe(&mut self, visit: &Visit<'_>) {
        let hosts = namespace_entry(&mut self.namespaces, visit.namespace, BTreeMap::new);
        if !visit.host.is_empty() && !visit.is_healthy() && !hosts.contains_key(visit.host) {
            hosts.insert(visit.host.to_string(), false);
        }
    }

    /// Failing hosts of one namespace, if it was seen.
    pub fn namespace(&self, ns: &str) -> Option<&BTreeMap<Host, bool>> {
        self.namespaces.get(ns)
    }

    /// Whether a host is failing in a namespace.
    pub fn is_failing(&self, ns: &str, host: &str) -> bool {
        self.namespace(ns)
            .map_or(false, |hosts| hosts.contains_key(host))
    }

    /// Total number of failing hosts across namespaces.
    pub fn host_count(&self) -> usize {
        self.namespaces.values().map(|hosts| hosts.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

fn namespace_entry<'m, V>(
    map: &'m mut BTreeMap<Namespace, V>,
    ns: &str,
    init: impl FnOnce() -> V,
) -> &'m mut V {
    map.entry(ns.to_string()).or_insert_with(init)
}

/// Equality filters for [`status_list`].
///
/// `None` or an empty string matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusFilter {
    pub alarm: Option<String>,
    pub host: Option<String>,
    pub level: Option<String>,
}

impl StatusFilter {
    /// A filter matching every status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from raw arguments where `""` means "any".
    pub fn from_args(alarm: &str, host: &str, level: &str) -> Self {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            alarm: opt(alarm),
            host: opt(host),
            level: opt(level),
        }
    }

    pub fn alarm(mut self, alarm: impl Into<String>) -> Self {
        self.alarm = Some(alarm.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    fn matches_alarm(&self, alarm: &str) -> bool {
        matches(&self.alarm, alarm)
    }

    fn matches_host(&self, host: &str) -> bool {
        matches(&self.host, host)
    }

    fn matches_level(&self, level: &str) -> bool {
        matches(&self.level, level)
    }
}

fn matches(filter: &Option<String>, value: &str) -> bool {
    filter
        .as_deref()
        .map_or(true, |wanted| wanted.is_empty() || wanted == value)
}

/// A status together with where it lives in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatusEntry {
    pub namespace: Namespace,
    pub alarm: Alarm,
    pub host: Host,
    pub tag: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub status: Status,
}

/// Collect the statuses matching `filter`, with ages computed against `now_ms`.
///
/// Leaves with an empty level are skipped. The tree is not modified; each
/// entry holds a copy with `last_time` filled in.
pub fn status_entries(tree: &StatusTree, filter: &StatusFilter, now_ms: u64) -> Vec<StatusEntry> {
    let mut output = Vec::new();

    for (ns, alarms) in tree.iter() {
        for (alarm, hosts) in alarms.iter().filter(|(a, _)| filter.matches_alarm(a)) {
            for (host, tags) in hosts.iter().filter(|(h, _)| filter.matches_host(h)) {
                for (tag, status) in tags {
                    if status.level.is_empty() || !filter.matches_level(status.level.as_str()) {
                        continue;
                    }
                    output.push(StatusEntry {
                        namespace: ns.clone(),
                        alarm: alarm.clone(),
                        host: host.clone(),
                        tag: tag.clone(),
                        status: status.with_age_at(now_ms),
                    });
                }
            }
        }
    }

    output
}

/// Collect the statuses matching `filter`, with ages computed against `now_ms`.
///
/// Same traversal as [`status_entries`] without the tree location.
pub fn status_list(tree: &StatusTree, filter: &StatusFilter, now_ms: u64) -> Vec<Status> {
    status_entries(tree, filter, now_ms)
        .into_iter()
        .map(|entry| entry.status)
        .collect()
}
