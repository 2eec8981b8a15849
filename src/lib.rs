//! locksmith - exclusive locks for large files tracked outside Git history
//!
//! A user asks for locks on one or more files; the remote lock service
//! records who holds them so other clients can refuse conflicting edits.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Lock orchestration: one batch, render, then report
//! - [`core`] - Domain types, path resolution and configuration
//! - [`git`] - Single interface for all Git operations
//! - [`lockservice`] - Lock service clients (Git LFS locking API, mock)
//! - [`secrets`] - Secret storage for lock service tokens
//! - [`ui`] - Output rendering and prompts
//!
//! # Guarantees
//!
//! 1. Nothing is sent to the lock service unless every path resolved
//! 2. Every path goes out in a single batch, in the order given
//! 3. Locks that were granted are printed even when the batch fails
//! 4. The lock client is closed on every exit path

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod lockservice;
pub mod secrets;
pub mod ui;
