//! SQLite connection implementation

mod connection;

pub use connection::{SqliteConnection, SqliteTransaction};
