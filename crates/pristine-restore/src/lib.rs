//! Snapshot a database once, then put it back between tests
//!
//! [`DataRestorer::init`] copies every user table into a temporary snapshot
//! and records where each auto-increment counter stands.
//! [`DataRestorer::restore_data`] empties the tables, refills them from the
//! snapshots in foreign-key order and resets the counters, all in a single
//! transaction.
//!
//! Dialect differences live in two places: the SQL templates of
//! [`pristine_templates`] and the [`DialectPolicy`] / [`ForeignKeyManager`]
//! pair chosen when the restorer is built.

mod config;
mod dependencies;
mod dialect;
mod discover;
mod engine;
mod error;
mod restore;
mod sequences;
mod snapshot;
mod sql;

pub use config::*;
pub use dependencies::{DependencyResolver, RestoreOrder, RestorePlan};
pub use dialect::*;
pub use discover::TableDiscoverer;
pub use engine::*;
pub use error::*;
pub use restore::RestoreOrchestrator;
pub use sequences::{AutoIncrementEntry, AutoIncrementMap, AutoIncrementTracker, extract_sequence_name};
pub use snapshot::SnapshotManager;
pub use sql::SqlRunner;
