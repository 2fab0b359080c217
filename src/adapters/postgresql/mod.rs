//! PostgreSQL staging store
//!
//! Persists staging snapshots, event logs, the ledger and the journal as
//! JSONB rows so they survive between runs.

pub mod client;
pub mod store;

pub use client::PostgreSQLClient;
pub use store::PostgresStore;
