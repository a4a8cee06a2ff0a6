//! `mboxspam` — extract sender, weekday and spam-confidence fields from an
//! MBOX file into a normalized SQLite store, and report on them.
//!
//! The pipeline is parse → store → load → report:
//! [`parser::mbox::MailboxParser`] groups header fields per message,
//! [`store::SpamStore`] owns the schema and the loader, and [`report`]
//! renders the domain list and the Friday/Saturday table.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod store;
