//! Core data model types: per-message fields, stored records, and report rows.

pub mod record;
