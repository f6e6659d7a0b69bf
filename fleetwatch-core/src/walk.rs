//! Generic traversal over the status tree.
//!
//! Every derived query is a fold over the same sequence of [`Visit`]s. The
//! walk fills in the implicit "healthy" reading for parts of the tree that
//! have nothing underneath them:
//!
//! - a namespace with no alarms yields one visit `(ns, "", "", "", OK)`
//! - an alarm with no hosts yields one visit `(ns, alarm, "", "", OK)`
//! - otherwise every tag yields `(ns, alarm, host, tag, level)`
//!
//! A host with no tags yields nothing.

use std::collections::btree_map;

use fleetwatch_types::{is_healthy, AlarmStatus, HostStatus, Level, Status, StatusTree, TagStatus};

/// One reading produced by the walk.
///
/// Synthesized visits carry empty strings for the levels below the empty
/// subtree and the healthy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit<'a> {
    pub namespace: &'a str,
    pub alarm: &'a str,
    pub host: &'a str,
    pub tag: &'a str,
    pub level: &'a str,
}

impl<'a> Visit<'a> {
    /// Whether the visit carries the healthy level.
    pub fn is_healthy(&self) -> bool {
        is_healthy(self.level)
    }

    /// Whether this visit stands in for an empty namespace or alarm.
    pub fn is_synthesized(&self) -> bool {
        self.host.is_empty()
    }

    fn empty(namespace: &'a str, alarm: &'a str) -> Self {
        Self {
            namespace,
            alarm,
            host: "",
            tag: "",
            level: Level::OK,
        }
    }
}

/// Lazy iterator over all visits of a tree. Created by [`walk`].
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    namespaces: btree_map::Iter<'a, String, AlarmStatus>,
    alarms: Option<btree_map::Iter<'a, String, HostStatus>>,
    hosts: Option<btree_map::Iter<'a, String, TagStatus>>,
    tags: Option<btree_map::Iter<'a, String, Status>>,
    namespace: &'a str,
    alarm: &'a str,
    host: &'a str,
}

/// Walk the whole tree.
///
/// Order follows the map order at each level. Queries must not rely on it.
pub fn walk(tree: &StatusTree) -> Walk<'_> {
    Walk {
        namespaces: tree.namespaces.iter(),
        alarms: None,
        hosts: None,
        tags: None,
        namespace: "",
        alarm: "",
        host: "",
    }
}

/// Walk the tree, calling `visit` once per visit with a caller-owned accumulator.
///
/// Returns the accumulator once every namespace has been visited.
///
/// # Example
///
/// ```rust
/// use fleetwatch_core::walk_with;
/// use fleetwatch_types::StatusTree;
///
/// let tree = StatusTree::builder()
///     .namespace("web", |ns| ns.alarm("cpu", |a| a.host("h1", |h| h.tag("load", "CRITICAL", 0))))
///     .namespace("db", |ns| ns)
///     .build();
///
/// let unhealthy = walk_with(&tree, 0usize, |visit, count| {
///     if !visit.is_healthy() {
///         *count += 1;
///     }
/// });
/// assert_eq!(unhealthy, 1);
/// ```
pub fn walk_with<A, F>(tree: &StatusTree, mut acc: A, mut visit: F) -> A
where
    F: FnMut(&Visit<'_>, &mut A),
{
    for v in walk(tree) {
        visit(&v, &mut acc);
    }
    acc
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tags) = self.tags.as_mut() {
                if let Some((tag, status)) = tags.next() {
                    return Some(Visit {
                        namespace: self.namespace,
                        alarm: self.alarm,
                        host: self.host,
                        tag: tag.as_str(),
                        level: status.level.as_str(),
                    });
                }
                self.tags = None;
            }

            if let Some(hosts) = self.hosts.as_mut() {
                if let Some((host, tags)) = hosts.next() {
                    self.host = host.as_str();
                    self.tags = Some(tags.iter());
                    continue;
                }
                self.hosts = None;
            }

            if let Some(alarms) = self.alarms.as_mut() {
                if let Some((alarm, hosts)) = alarms.next() {
                    if hosts.is_empty() {
                        return Some(Visit::empty(self.namespace, alarm.as_str()));
                    }
                    self.alarm = alarm.as_str();
                    self.hosts = Some(hosts.iter());
                    continue;
                }
                self.alarms = None;
            }

            let (namespace, alarms) = self.namespaces.next()?;
            if alarms.is_empty() {
                return Some(Visit::empty(namespace.as_str(), ""));
            }
            self.namespace = namespace.as_str();
            self.alarms = Some(alarms.iter());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visits(tree: &StatusTree) -> Vec<(String, String, String, String, String)> {
        walk(tree)
            .map(|v| {
                (
                    v.namespace.to_string(),
                    v.alarm.to_string(),
                    v.host.to_string(),
                    v.tag.to_string(),
                    v.level.to_string(),
                )
            })
            .collect()
    }

    fn visit(
        ns: &str,
        alarm: &str,
        host: &str,
        tag: &str,
        level: &str,
    ) -> (String, String, String, String, String) {
        (
            ns.to_string(),
            alarm.to_string(),
            host.to_string(),
            tag.to_string(),
            level.to_string(),
        )
    }

    #[test]
    fn empty_tree_yields_nothing() {
        assert_eq!(walk(&StatusTree::new()).count(), 0);
    }

    #[test]
    fn empty_namespace_yields_one_healthy_visit() {
        let tree = StatusTree::builder().namespace("idle", |ns| ns).build();
        assert_eq!(visits(&tree), vec![visit("idle", "", "", "", "OK")]);
    }

    #[test]
    fn empty_alarm_yields_one_healthy_visit() {
        let tree = StatusTree::builder()
            .namespace("web", |ns| ns.alarm("cpu-v1", |a| a).alarm("mem-v1", |a| a))
            .build();

        assert_eq!(
            visits(&tree),
            vec![
                visit("web", "cpu-v1", "", "", "OK"),
                visit("web", "mem-v1", "", "", "OK"),
            ]
        );
    }

    #[test]
    fn every_tag_is_visited_with_its_level() {
        let tree = StatusTree::builder()
            .namespace("web", |ns| {
                ns.alarm("cpu-v1", |a| {
                    a.host("h1", |h| h.tag("load", "OK", 0).tag("steal", "WARNING", 0))
                        .host("h2", |h| h.tag("load", "CRITICAL", 0))
                })
            })
            .build();

        assert_eq!(
            visits(&tree),
            vec![
                visit("web", "cpu-v1", "h1", "load", "OK"),
                visit("web", "cpu-v1", "h1", "steal", "WARNING"),
                visit("web", "cpu-v1", "h2", "load", "CRITICAL"),
            ]
        );
    }

    #[test]
    fn host_without_tags_yields_nothing() {
        let tree = StatusTree::builder()
            .namespace("web", |ns| ns.alarm("cpu-v1", |a| a.host("h1", |h| h)))
            .build();
        assert_eq!(walk(&tree).count(), 0);
    }

    #[test]
    fn mixed_levels_are_all_reached() {
        let tree = StatusTree::builder()
            .namespace("a", |ns| ns)
            .namespace("b", |ns| {
                ns.alarm("empty", |a| a)
                    .alarm("full", |a| a.host("h", |h| h.tag("t", "CRITICAL", 0)))
            })
            .namespace("c", |ns| ns.alarm("x", |a| a.host("h", |h| h.tag("t", "OK", 0))))
            .build();

        assert_eq!(
            visits(&tree),
            vec![
                visit("a", "", "", "", "OK"),
                visit("b", "empty", "", "", "OK"),
                visit("b", "full", "h", "t", "CRITICAL"),
                visit("c", "x", "h", "t", "OK"),
            ]
        );
    }

    #[test]
    fn synthesized_visits_are_flagged() {
        let tree = StatusTree::builder()
            .namespace("a", |ns| ns)
            .namespace("b", |ns| ns.alarm("x", |a| a.host("h", |h| h.tag("t", "OK", 0))))
            .build();

        let flags: Vec<bool> = walk(&tree).map(|v| v.is_synthesized()).collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn walk_with_threads_accumulator() {
        let tree = StatusTree::builder()
            .namespace("a", |ns| ns)
            .namespace("b", |ns| ns.alarm("x", |a| a.host("h", |h| h.tag("t", "OK", 0).tag("u", "OK", 0))))
            .build();

        let seen = walk_with(&tree, Vec::new(), |v, acc: &mut Vec<String>| {
            acc.push(format!("{}/{}", v.namespace, v.tag));
        });
        assert_eq!(seen, vec!["a/", "b/t", "b/u"]);
    }
}
