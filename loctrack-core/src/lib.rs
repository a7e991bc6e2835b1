//! # loctrack-core
//!
//! The coordination kernel for claiming ownership of genomic intervals.
//! Many workers (threads in one process, or processes spread across a
//! cluster) share one claim history; each interval is granted to exactly
//! one owner, and the append-only history makes partially-finished runs
//! resumable after a crash.

pub mod error;
pub mod lock;
pub mod store;
#[path = "store_in_memory.rs"]
pub mod store_in_memory;
#[cfg(feature = "sqlite")]
#[path = "store_sqlite.rs"]
pub mod store_sqlite;
pub mod tracker;
pub mod types;

#[cfg(test)]
mod span_test;
#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
