//! SQLite-backed star schema: three dimension tables and one fact table.

pub mod schema;
pub mod sqlite;

pub use sqlite::{LoadStats, SpamStore};
