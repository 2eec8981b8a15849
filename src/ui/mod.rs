//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Diagnostics and lock record rendering
//! - [`prompts`] - Masked input for credentials

pub mod output;
pub mod prompts;
