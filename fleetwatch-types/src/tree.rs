//! StatusTree - the namespace/alarm/host/tag hierarchy of statuses.

use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::{Alarm, Host, Namespace, Status, Tag};

/// Statuses of one host's alarm, keyed by tag.
pub type TagStatus = BTreeMap<Tag, Status>;

/// Statuses of one alarm, keyed by host.
pub type HostStatus = BTreeMap<Host, TagStatus>;

/// Statuses of one namespace, keyed by alarm.
pub type AlarmStatus = BTreeMap<Alarm, HostStatus>;

/// The full status hierarchy.
///
/// A namespace without alarms, or an alarm without hosts, is a valid entry
/// and means "healthy". The tree itself computes no aggregates.
///
/// # Example
///
/// ```rust
/// use fleetwatch_types::StatusTree;
///
/// let tree = StatusTree::builder()
///     .namespace("web.prod", |ns| {
///         ns.alarm("cpu-v1", |a| {
///             a.host("host-1", |h| h.tag("load", "OK", 0))
///         })
///         .alarm("disk-v3", |a| a)
///     })
///     .namespace("db.prod", |ns| ns)
///     .build();
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.leaf_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StatusTree {
    /// Alarms of each namespace, keyed by namespace name.
    pub namespaces: BTreeMap<Namespace, AlarmStatus>,
}

impl StatusTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing trees.
    pub fn builder() -> StatusTreeBuilder {
        StatusTreeBuilder::new()
    }

    /// Check if the tree has no namespaces.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Number of namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Number of tag-level statuses across the whole tree.
    pub fn leaf_count(&self) -> usize {
        self.namespaces
            .values()
            .flat_map(|alarms| alarms.values())
            .flat_map(|hosts| hosts.values())
            .map(|tags| tags.len())
            .sum()
    }

    /// Iterate over all namespaces.
    pub fn iter(&self) -> impl Iterator<Item = (&Namespace, &AlarmStatus)> {
        self.namespaces.iter()
    }

    /// Alarms of a namespace.
    pub fn namespace(&self, ns: &str) -> Option<&AlarmStatus> {
        self.namespaces.get(ns)
    }

    /// Hosts of an alarm.
    pub fn alarm(&self, ns: &str, alarm: &str) -> Option<&HostStatus> {
        self.namespace(ns)?.get(alarm)
    }

    /// Tags of a host.
    pub fn host(&self, ns: &str, alarm: &str, host: &str) -> Option<&TagStatus> {
        self.alarm(ns, alarm)?.get(host)
    }

    /// Status of a single tag.
    pub fn get(&self, ns: &str, alarm: &str, host: &str, tag: &str) -> Option<&Status> {
        self.host(ns, alarm, host)?.get(tag)
    }

    /// Make sure a namespace exists, creating it without alarms if needed.
    pub fn ensure_namespace(&mut self, ns: impl Into<Namespace>) -> &mut AlarmStatus {
        self.namespaces.entry(ns.into()).or_default()
    }

    /// Make sure an alarm exists, creating it (and its namespace) if needed.
    pub fn ensure_alarm(
        &mut self,
        ns: impl Into<Namespace>,
        alarm: impl Into<Alarm>,
    ) -> &mut HostStatus {
        self.ensure_namespace(ns).entry(alarm.into()).or_default()
    }

    /// Insert or overwrite a tag status, creating the path to it.
    ///
    /// Returns the previous status of the tag, if any.
    pub fn insert(
        &mut self,
        ns: impl Into<Namespace>,
        alarm: impl Into<Alarm>,
        host: impl Into<Host>,
        tag: impl Into<Tag>,
        status: Status,
    ) -> Option<Status> {
        self.ensure_alarm(ns, alarm)
            .entry(host.into())
            .or_default()
            .insert(tag.into(), status)
    }

    /// Remove a namespace and everything under it.
    pub fn remove_namespace(&mut self, ns: &str) -> Option<AlarmStatus> {
        self.namespaces.remove(ns)
    }

    /// Remove an alarm from a namespace. The namespace entry stays.
    pub fn remove_alarm(&mut self, ns: &str, alarm: &str) -> Option<HostStatus> {
        self.namespaces.get_mut(ns)?.remove(alarm)
    }

    /// Remove a host from an alarm. The alarm entry stays.
    pub fn remove_host(&mut self, ns: &str, alarm: &str, host: &str) -> Option<TagStatus> {
        self.namespaces.get_mut(ns)?.get_mut(alarm)?.remove(host)
    }

    /// Remove a single tag. The host entry stays.
    pub fn remove_tag(&mut self, ns: &str, alarm: &str, host: &str, tag: &str) -> Option<Status> {
        self.namespaces
            .get_mut(ns)?
            .get_mut(alarm)?
            .get_mut(host)?
            .remove(tag)
    }

    /// Remove every namespace.
    pub fn clear(&mut self) {
        self.namespaces.clear();
    }
}

impl FromIterator<(Namespace, AlarmStatus)> for StatusTree {
    fn from_iter<I: IntoIterator<Item = (Namespace, AlarmStatus)>>(iter: I) -> Self {
        Self {
            namespaces: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for StatusTree {
    type Item = (Namespace, AlarmStatus);
    type IntoIter = alloc::collections::btree_map::IntoIter<Namespace, AlarmStatus>;

    fn into_iter(self) -> Self::IntoIter {
        self.namespaces.into_iter()
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Builder for `StatusTree`.
#[derive(Debug, Default)]
pub struct StatusTreeBuilder {
    namespaces: BTreeMap<Namespace, AlarmStatus>,
}

impl StatusTreeBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace with alarms built using a closure.
    pub fn namespace<F>(mut self, name: impl Into<Namespace>, f: F) -> Self
    where
        F: FnOnce(NamespaceBuilder) -> NamespaceBuilder,
    {
        let alarms = f(NamespaceBuilder::default()).alarms;
        self.namespaces.insert(name.into(), alarms);
        self
    }

    /// Build the tree.
    pub fn build(self) -> StatusTree {
        StatusTree {
            namespaces: self.namespaces,
        }
    }
}

/// Builder for the alarms of one namespace.
#[derive(Debug, Default)]
pub struct NamespaceBuilder {
    alarms: AlarmStatus,
}

impl NamespaceBuilder {
    /// Add an alarm with hosts built using a closure.
    pub fn alarm<F>(mut self, name: impl Into<Alarm>, f: F) -> Self
    where
        F: FnOnce(AlarmBuilder) -> AlarmBuilder,
    {
        let hosts = f(AlarmBuilder::default()).hosts;
        self.alarms.insert(name.into(), hosts);
        self
    }
}

/// Builder for the hosts of one alarm.
#[derive(Debug, Default)]
pub struct AlarmBuilder {
    hosts: HostStatus,
}

impl AlarmBuilder {
    /// Add a host with tags built using a closure.
    pub fn host<F>(mut self, name: impl Into<Host>, f: F) -> Self
    where
        F: FnOnce(HostBuilder) -> HostBuilder,
    {
        let tags = f(HostBuilder::default()).tags;
        self.hosts.insert(name.into(), tags);
        self
    }
}

/// Builder for the tags of one host.
#[derive(Debug, Default)]
pub struct HostBuilder {
    tags: TagStatus,
}

impl HostBuilder {
    /// Add a tag with the given level and creation time.
    pub fn tag(mut self, name: impl Into<Tag>, level: impl Into<String>, create_time_ms: u64) -> Self {
        self.tags
            .insert(name.into(), Status::new(level.into(), create_time_ms));
        self
    }

    /// Add a tag with a pre-built status.
    pub fn status(mut self, name: impl Into<Tag>, status: Status) -> Self {
        self.tags.insert(name.into(), status);
        self
    }
}
