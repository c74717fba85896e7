//! Instance-index database client.
//!
//! The relational index records which definition instances are currently
//! installed in the remote engine. Reconciliation uses it to decide whether
//! a stale instance must be deleted before republishing.

mod client;
mod error;

pub use client::{IndexClient, schema_for_flow};
pub use error::{IndexError, Result};
