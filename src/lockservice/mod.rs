//! lockservice
//!
//! Client side of the remote lock service.
//!
//! # Architecture
//!
//! The [`LockClient`] trait is the only thing the lock workflow talks to.
//! Commands obtain clients through a [`LockClientFactory`] given a
//! [`LockTarget`], never by naming a concrete client.
//!
//! # Modules
//!
//! - `traits`: [`LockClient`], [`LockOutcome`] and [`LockError`]
//! - `target`: [`LockTarget`] resolution (remote, ref, endpoint)
//! - [`endpoint`]: endpoint discovery from config and remote URLs
//! - [`lfs`]: Git LFS locking API over HTTP
//! - `factory`: [`LfsClientFactory`]
//! - [`mock`]: in-memory client for deterministic testing

pub mod endpoint;
mod factory;
pub mod lfs;
pub mod mock;
mod target;
mod traits;

pub use endpoint::EndpointError;
pub use factory::LfsClientFactory;
pub use target::LockTarget;
pub use traits::*;
