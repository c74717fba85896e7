//! HTTP client for the definition-publishing API.
//!
//! The remote engine is the system of record for running workflows. This
//! client covers the three calls reconciliation needs: a health probe, a
//! publish call carrying a full definition payload, and a best-effort
//! reinitialize that asks the engine to reload definitions.

mod client;
mod error;

pub use client::{ApiClient, ClientBuilder, PublishReceipt, extract_publish_error};
pub use error::{ClientError, PublishError, Result};
