//! Parsed messages and the rows derived from them.

use serde::Serialize;

/// Fields collected from the header block of one message.
///
/// Every field is optional while the message is being scanned. Only a
/// message with all four present becomes a [`SpamRecord`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageFields {
    /// 1-based line number where the message starts.
    pub line: u64,
    /// Sender address from the `From:` header.
    pub email: Option<String>,
    /// Portion of the sender address after `@`.
    pub domain: Option<String>,
    /// Three-letter weekday from the `Date:` header (e.g. `Fri`).
    pub weekday: Option<String>,
    /// Value of the `X-DSPAM-Confidence:` header.
    pub confidence: Option<f64>,
}

impl MessageFields {
    /// Start collecting fields for a message beginning at `line`.
    pub fn starting_at(line: u64) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }

    /// Name of the first required field that is absent, if any.
    pub fn missing(&self) -> Option<&'static str> {
        if self.email.is_none() || self.domain.is_none() {
            Some("From: header")
        } else if self.weekday.is_none() {
            Some("Date: weekday")
        } else if self.confidence.is_none() {
            Some("X-DSPAM-Confidence: header")
        } else {
            None
        }
    }

    /// True if no recognized header was seen at all.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.weekday.is_none() && self.confidence.is_none()
    }

    /// Convert into a record if every field is present.
    pub fn into_record(self) -> Option<SpamRecord> {
        Some(SpamRecord {
            email: self.email?,
            domain: self.domain?,
            weekday: self.weekday?,
            confidence: self.confidence?,
        })
    }
}

/// One complete message: the unit written as a single fact row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpamRecord {
    pub email: String,
    pub domain: String,
    pub weekday: String,
    pub confidence: f64,
}

/// Result of scanning a whole mailbox.
#[derive(Debug, Clone, Default)]
pub struct ParsedMailbox {
    /// Complete messages, in file order.
    pub records: Vec<SpamRecord>,
    /// Messages skipped because a required field was missing.
    pub incomplete: u64,
}

impl ParsedMailbox {
    /// Number of complete messages.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split the records into four positionally aligned sequences:
    /// emails, domains, weekdays and confidences.
    pub fn columns(&self) -> (Vec<String>, Vec<String>, Vec<String>, Vec<f64>) {
        let mut emails = Vec::with_capacity(self.records.len());
        let mut domains = Vec::with_capacity(self.records.len());
        let mut weekdays = Vec::with_capacity(self.records.len());
        let mut confidences = Vec::with_capacity(self.records.len());
        for r in &self.records {
            emails.push(r.email.clone());
            domains.push(r.domain.clone());
            weekdays.push(r.weekday.clone());
            confidences.push(r.confidence);
        }
        (emails, domains, weekdays, confidences)
    }
}

/// One line of the filtered report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub weekday: String,
    pub domain: String,
    pub email: String,
    pub confidence: f64,
}

/// Row counts for each table in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub emails: u64,
    pub domains: u64,
    pub weekdays: u64,
    pub records: u64,
}
