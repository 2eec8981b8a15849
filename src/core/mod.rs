//! core
//!
//! Core domain types, path resolution and configuration for locksmith.
//!
//! # Modules
//!
//! - [`types`] - Strong types: CanonicalPath, RefName, LockRecord
//! - [`paths`] - Resolution of user paths into repository-relative paths
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing in here talks to the network

pub mod config;
pub mod paths;
pub mod types;
