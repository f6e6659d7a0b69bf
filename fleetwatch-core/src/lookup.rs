//! Namespace subtree lookup.
//!
//! Namespaces form a hierarchy through their dotted names: `api.web.prod` is
//! a descendant of `web.prod` and of `prod`. Hierarchy is inferred purely from
//! the string suffix, so a namespace segment must never contain a dot of its
//! own. Under that assumption `svc` matches `svc` and `x.svc` but not `xsvc`.

use fleetwatch_types::StatusTree;

/// Whether `ns` is `ancestor` itself or one of its dotted descendants.
///
/// Equivalent to `("." + ns).ends_with("." + ancestor)`. An empty ancestor
/// matches every namespace.
///
/// ```rust
/// use fleetwatch_core::is_descendant;
///
/// assert!(is_descendant("svc", "svc"));
/// assert!(is_descendant("a.x.svc", "svc"));
/// assert!(is_descendant("a.x.svc", "x.svc"));
/// assert!(!is_descendant("xsvc", "svc"));
/// assert!(!is_descendant("svc.a", "svc"));
/// ```
pub fn is_descendant(ns: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    match ns.strip_suffix(ancestor) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

/// The part of `tree` at or below the namespace `query`.
///
/// An empty query selects the whole tree. No match yields an empty tree.
pub fn lookup(tree: &StatusTree, query: &str) -> StatusTree {
    if query.is_empty() {
        return tree.clone();
    }
    tree.iter()
        .filter(|(ns, _)| is_descendant(ns, query))
        .map(|(ns, alarms)| (ns.clone(), alarms.clone()))
        .collect()
}
