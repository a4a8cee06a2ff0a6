//! Mailbox parsing: the message-grouping MBOX scanner and the header field extractors.

pub mod header;
pub mod mbox;
