//! # fleetwatch-types
//!
//! Core types for fleet health status. This crate defines the leaf status
//! entity and the four-level tree that holds it:
//!
//! ```text
//! Namespace ─▶ Alarm ─▶ Host ─▶ Tag ─▶ Status { level, create_time_ms }
//! ```
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable `serde` to read and write trees as JSON
//! - **Opaque identifiers**: Namespaces, alarms, hosts and tags are plain strings
//! - **Healthy by absence**: An empty namespace or alarm carries no error state
//!
//! ## Features
//!
//! - `std` (default): Standard library support (wall-clock ages)
//! - `serde`: JSON/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use fleetwatch_types::{Level, Status, StatusTree};
//!
//! let mut tree = StatusTree::new();
//! tree.insert("web.prod", "cpu-v1", "host-1", "load", Status::new(Level::OK, 0));
//! tree.insert("web.prod", "cpu-v1", "host-2", "load", Status::new(Level::CRITICAL, 0));
//! tree.ensure_namespace("db.prod");
//!
//! assert_eq!(tree.len(), 2);
//! assert_eq!(tree.leaf_count(), 2);
//! assert!(!tree.get("web.prod", "cpu-v1", "host-2", "load").unwrap().is_healthy());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod level;
mod status;
mod tree;

pub use level::*;
pub use status::*;
pub use tree::*;

/// A dot-separated hierarchical namespace name (e.g. `api.web.prod`).
pub type Namespace = alloc::string::String;

/// An alarm (check definition) identifier, usually carrying its version.
pub type Alarm = alloc::string::String;

/// A monitored machine or instance.
pub type Host = alloc::string::String;

/// A sub-metric or dimension within a host's check.
pub type Tag = alloc::string::String;
