//! REST event store client.
//!
//! Talks to the PostgREST-style API holding confirmed large fire events:
//! - List the tracking IDs already persisted (seeds ID allocation and
//!   filters re-uploads)
//! - Append new enriched records in batches of at most 1000 rows
//!
//! Production behavior mirrors the rest of the stack: pooled HTTP client,
//! exponential backoff with jitter, request metrics.

pub mod client;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod types;

pub use client::{EventStoreClient, EventStoreConfig};
pub use error::{StoreError, StoreResult};
pub use retry::RetryConfig;
pub use types::EventRecord;

/// Maximum rows per insert batch accepted by the store.
pub const MAX_BATCH_SIZE: usize = 1000;
