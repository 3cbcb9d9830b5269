//! Core types and trait definitions for the Mandate workflow engine.
//!
//! Everything transport- and storage-shaped lives behind the
//! [`agent::Agent`] and [`store::VersionStore`] traits; the crate itself
//! pulls in no HTTP or database dependencies, so every other crate can
//! depend on it.

pub mod agent;
pub mod approval;
pub mod breach;
pub mod conversation;
pub mod diff;
pub mod error;
pub mod rule;
pub mod store;
pub mod version;

pub use error::{Error, Result};
