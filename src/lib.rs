//! # fleetwatch
//!
//! Health queries over a live fleet status tree, from the command line or as
//! a library.
//!
//! ```text
//!   collector ──▶ TreeSource ──▶ Ingestor ──▶ StatusStore ──▶ queries
//!               (file|channel)   (replace,     (RwLock)      (health, lists,
//!                                 write lock)                  lookup, report)
//! ```
//!
//! - **[`source`]**: the [`TreeSource`] trait with file polling and channel
//!   implementations
//! - **[`ingest`]**: the [`Ingestor`] that swaps fresh trees into the store
//! - **[`report`]**: JSON export of every query result
//! - **[`config`]**: layered [`Settings`]
//!
//! ## Usage
//!
//! ```bash
//! fleetwatch --file status.json namespaces
//! fleetwatch --file status.json list --level CRITICAL
//! fleetwatch --config fleetwatch.toml watch
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::sync::Arc;
//! use fleetwatch::{ChannelSource, Ingestor};
//! use fleetwatch_core::StatusStore;
//! use fleetwatch_types::StatusTree;
//!
//! let store = Arc::new(StatusStore::new());
//! let (tx, source) = ChannelSource::create("collector");
//! let mut ingestor = Ingestor::new(Box::new(source), Arc::clone(&store));
//!
//! tx.send(
//!     StatusTree::builder()
//!         .namespace("web.prod", |ns| {
//!             ns.alarm("cpu", |a| a.host("h1", |h| h.tag("load", "CRITICAL", 0)))
//!         })
//!         .build(),
//! )
//! .unwrap();
//!
//! assert!(ingestor.ingest_once());
//! assert_eq!(store.namespace_health().get("web.prod"), Some(false));
//! ```

pub mod config;
pub mod ingest;
pub mod logging;
pub mod report;
pub mod source;

pub use config::Settings;
pub use ingest::Ingestor;
pub use source::{ChannelSource, FileSource, SourceError, TreeSource};
