//! Header line recognition: `From:`, `Date:` and `X-DSPAM-Confidence:`.
//!
//! Each recognized line is split on whitespace and the value taken from a
//! fixed token position. No unfolding or RFC 5322 address parsing is done.

use tracing::trace;

use crate::error::{Result, SpamError};

const FROM_PREFIX: &str = "From:";
const DATE_PREFIX: &str = "Date:";
const CONFIDENCE_PREFIX: &str = "X-DSPAM-Confidence:";

/// A value extracted from a single header line.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderField {
    /// Sender address and its domain.
    Sender { email: String, domain: String },
    /// Three-letter weekday abbreviation.
    Weekday(String),
    /// Spam-filter confidence score.
    Confidence(f64),
}

/// Recognize a header line and extract its value.
///
/// Returns `Ok(None)` for lines that carry none of the three fields,
/// including `Date:` lines that fail the numeric day-of-month check.
/// A malformed sender or confidence is an error.
pub fn parse_line(line: &str, line_no: u64) -> Result<Option<HeaderField>> {
    if line.starts_with(FROM_PREFIX) {
        let email = second_token(line).ok_or(SpamError::MissingValue {
            line: line_no,
            header: FROM_PREFIX,
        })?;
        let domain = domain_of(email).ok_or_else(|| SpamError::InvalidAddress {
            line: line_no,
            value: email.to_string(),
        })?;
        return Ok(Some(HeaderField::Sender {
            email: email.to_string(),
            domain: domain.to_string(),
        }));
    }

    if line.starts_with(CONFIDENCE_PREFIX) {
        let raw = second_token(line).ok_or(SpamError::MissingValue {
            line: line_no,
            header: CONFIDENCE_PREFIX,
        })?;
        let value = raw
            .parse::<f64>()
            .map_err(|_| SpamError::InvalidConfidence {
                line: line_no,
                value: raw.to_string(),
            })?;
        return Ok(Some(HeaderField::Confidence(value)));
    }

    if line.starts_with(DATE_PREFIX) {
        return Ok(weekday_of(line).map(HeaderField::Weekday));
    }

    Ok(None)
}

/// The domain part of an address: text after the first `@`, up to any later `@`.
pub fn domain_of(email: &str) -> Option<&str> {
    email.split('@').nth(1)
}

/// Extract the weekday from a `Date:` line.
///
/// `Date: Sat, 5 Jan 2008 09:12:18 -0500` yields `Sat`. The line must have
/// at least three tokens with an all-digit third token; the second token
/// then loses its final character (the comma).
fn weekday_of(line: &str) -> Option<String> {
    let mut tokens = line.split_whitespace().skip(1);
    let day_name = tokens.next()?;
    let day_of_month = tokens.next()?;
    if day_of_month.is_empty() || !day_of_month.bytes().all(|b| b.is_ascii_digit()) {
        trace!(line, "Date header without numeric day, ignoring");
        return None;
    }
    let mut weekday = day_name.to_string();
    weekday.pop();
    Some(weekday)
}

fn second_token(line: &str) -> Option<&str> {
    line.split_whitespace().nth(1)
}

/// Decode a raw line to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
pub fn decode_line(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}
