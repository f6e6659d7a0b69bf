//! # fleetwatch-core
//!
//! The live status tree of a monitored fleet and the health queries over it.
//!
//! Statuses are organized as `namespace -> alarm -> host -> tag -> status`.
//! Ingestion code writes into a [`StatusStore`] under its exclusive lock;
//! any number of readers query it concurrently under the shared lock.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fleetwatch_core::{StatusFilter, StatusStore};
//! use fleetwatch_types::{Level, Status};
//!
//! let store = Arc::new(StatusStore::new());
//!
//! // Ingestion side
//! let web = store.namespace("web.prod");
//! web.set("cpu-v1", "host-1", "load", Status::now(Level::OK));
//! web.set("cpu-v1", "host-2", "load", Status::now(Level::CRITICAL));
//! store.namespace("db.prod").register();
//!
//! // Query side
//! assert_eq!(store.namespace_health().get("web.prod"), Some(false));
//! assert_eq!(store.namespace_health().get("db.prod"), Some(true));
//! assert_eq!(store.alarm_health().get("web.prod", "cpu-v1"), Some(false));
//! assert!(store.failing_hosts().is_failing("web.prod", "host-2"));
//!
//! let critical = store.status_list(&StatusFilter::new().level(Level::CRITICAL));
//! assert_eq!(critical.len(), 1);
//!
//! // Everything at or below a namespace
//! assert_eq!(store.lookup("prod").len(), 2);
//! ```
//!
//! ## Semantics
//!
//! - **Healthy by absence**: a namespace without alarms, or an alarm without
//!   hosts, is healthy. A host missing from [`FailingHosts`] is healthy.
//! - **Sticky failures**: once a query sees an unhealthy level for a
//!   namespace or alarm, nothing later in the same query clears it.
//! - **Consistent reads**: every query holds the shared lock for its whole
//!   run, so it never observes a half-applied write.

mod handle;
mod lookup;
mod query;
mod store;
mod walk;

pub use handle::NamespaceHandle;
pub use lookup::{is_descendant, lookup};
pub use query::{
    status_entries, status_list, AlarmHealth, FailingHosts, NamespaceHealth, StatusEntry,
    StatusFilter,
};
pub use store::StatusStore;
pub use walk::{walk, walk_with, Visit, Walk};

// Re-export types for convenience
pub use fleetwatch_types::{Level, Status, StatusTree};
