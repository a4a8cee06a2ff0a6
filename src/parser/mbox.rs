//! Streaming MBOX scanner.
//!
//! Reads the file line-by-line, groups lines into messages at each `From `
//! separator, and collects sender, weekday and confidence from each
//! message's header block. Never loads the entire file into memory.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, SpamError};
use crate::model::record::{MessageFields, ParsedMailbox};
use crate::parser::header::{self, HeaderField};

/// Size of the internal read buffer.
const READ_BUFFER_SIZE: usize = 128 * 1024;

/// Report progress every this many bytes.
const PROGRESS_INTERVAL: u64 = 1024 * 1024;

/// Message-grouping MBOX parser.
///
/// Each message yields at most one record. A message that lacks any of
/// sender, weekday or confidence is skipped (or rejected in strict mode),
/// so the fields of one message can never be paired with another's.
pub struct MailboxParser {
    path: PathBuf,
    file_size: u64,
    strict: bool,
}

/// Per-message scanning state.
struct Current {
    fields: MessageFields,
    /// Still inside the header block.
    in_headers: bool,
    /// Lines before the first separator, not a real message.
    preamble: bool,
}

impl MailboxParser {
    /// Create a parser for the given mailbox file.
    ///
    /// Verifies that the file exists and is readable, but does NOT validate
    /// that it is actually an MBOX.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SpamError::FileNotFound(path.clone())
            } else {
                SpamError::io(&path, e)
            }
        })?;
        Ok(Self {
            path,
            file_size: metadata.len(),
            strict: false,
        })
    }

    /// Reject messages with missing fields instead of skipping them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Total size of the underlying file in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Path to the mailbox file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scan the whole mailbox.
    ///
    /// `progress_callback` receives `(bytes_read, total_bytes)`.
    pub fn parse(&self, progress_callback: Option<&dyn Fn(u64, u64)>) -> Result<ParsedMailbox> {
        let mut mailbox = ParsedMailbox::default();
        if self.file_size == 0 {
            return Ok(mailbox);
        }

        let file = File::open(&self.path).map_err(|e| SpamError::io(&self.path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut line_buf: Vec<u8> = Vec::with_capacity(4096);
        let mut line_no: u64 = 0;
        let mut bytes_read: u64 = 0;
        let mut last_progress: u64 = 0;
        let mut prev_line_was_empty = true;
        let mut current: Option<Current> = None;

        loop {
            line_buf.clear();
            let line_len = reader
                .read_until(b'\n', &mut line_buf)
                .map_err(|e| SpamError::io(&self.path, e))?;
            if line_len == 0 {
                break; // EOF
            }
            line_no += 1;
            bytes_read += line_len as u64;

            let line = if line_no == 1 {
                strip_bom(&line_buf)
            } else {
                &line_buf[..]
            };

            if is_mbox_separator(line) {
                if line_no > 1 && !prev_line_was_empty {
                    warn!(
                        line = line_no,
                        "Found 'From ' separator without preceding blank line"
                    );
                }
                if let Some(done) = current.take() {
                    self.finish(done, &mut mailbox)?;
                }
                current = Some(Current {
                    fields: MessageFields::starting_at(line_no),
                    in_headers: true,
                    preamble: false,
                });
            } else {
                let msg = current.get_or_insert_with(|| Current {
                    fields: MessageFields::starting_at(line_no),
                    in_headers: true,
                    preamble: true,
                });
                if msg.in_headers {
                    if is_blank_line(line) {
                        msg.in_headers = false;
                    } else {
                        let text = header::decode_line(trim_line_ending(line));
                        if let Some(field) = header::parse_line(&text, line_no)? {
                            apply(&mut msg.fields, field, line_no);
                        }
                    }
                }
            }

            prev_line_was_empty = is_blank_line(line);

            if let Some(cb) = progress_callback {
                if bytes_read - last_progress >= PROGRESS_INTERVAL {
                    cb(bytes_read, self.file_size);
                    last_progress = bytes_read;
                }
            }
        }

        if let Some(done) = current.take() {
            self.finish(done, &mut mailbox)?;
        }

        if let Some(cb) = progress_callback {
            cb(self.file_size, self.file_size);
        }

        info!(
            path = %self.path.display(),
            records = mailbox.records.len(),
            incomplete = mailbox.incomplete,
            "Parsed mailbox"
        );
        Ok(mailbox)
    }

    /// Close out one message: keep it, skip it, or fail in strict mode.
    fn finish(&self, msg: Current, mailbox: &mut ParsedMailbox) -> Result<()> {
        if msg.preamble && msg.fields.is_empty() {
            return Ok(());
        }
        let line = msg.fields.line;
        if let Some(missing) = msg.fields.missing() {
            if self.strict {
                return Err(SpamError::IncompleteMessage { line, missing });
            }
            warn!(line, missing, "Skipping incomplete message");
            mailbox.incomplete += 1;
            return Ok(());
        }
        if let Some(record) = msg.fields.into_record() {
            mailbox.records.push(record);
        }
        Ok(())
    }
}

/// Record a field unless the message already has one.
fn apply(fields: &mut MessageFields, field: HeaderField, line_no: u64) {
    match field {
        HeaderField::Sender { email, domain } => {
            if fields.email.is_none() {
                fields.email = Some(email);
                fields.domain = Some(domain);
            } else {
                debug!(line = line_no, "Repeated From: header ignored");
            }
        }
        HeaderField::Weekday(day) => {
            if fields.weekday.is_none() {
                fields.weekday = Some(day);
            } else {
                debug!(line = line_no, "Repeated Date: header ignored");
            }
        }
        HeaderField::Confidence(value) => {
            if fields.confidence.is_none() {
                fields.confidence = Some(value);
            } else {
                debug!(line = line_no, "Repeated X-DSPAM-Confidence: header ignored");
            }
        }
    }
}

fn strip_bom(line: &[u8]) -> &[u8] {
    line.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(line)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Check whether a line is an MBOX separator (`From ` at the start).
fn is_mbox_separator(line: &[u8]) -> bool {
    line.starts_with(b"From ")
}

/// Check whether a line is blank (empty or only whitespace / CR / LF).
fn is_blank_line(line: &[u8]) -> bool {
    line.iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b' ' || b == b'\t')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_mbox(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    const TWO_MESSAGES: &str = "\
From alice@example.com Fri Jan  4 10:00:00 2008
From: alice@example.com
Date: Fri, 4 Jan 2008 10:00:00 -0500
X-DSPAM-Confidence: 0.8475

Body one.

From bob@test.org Mon Jan  7 09:00:00 2008
From: bob@test.org
Date: Mon, 7 Jan 2008 09:00:00 -0500
X-DSPAM-Confidence: 0.6178

Body two.
";

    #[test]
    fn test_is_mbox_separator() {
        assert!(is_mbox_separator(
            b"From user@example.com Thu Jan 01 00:00:00 2024\n"
        ));
        assert!(!is_mbox_separator(b"From: user@example.com\n"));
        assert!(!is_mbox_separator(b">From user@example.com\n"));
    }

    #[test]
    fn test_is_blank_line() {
        assert!(is_blank_line(b"\n"));
        assert!(is_blank_line(b"\r\n"));
        assert!(!is_blank_line(b"hello\n"));
    }

    #[test]
    fn test_parse_two_messages() {
        let file = write_mbox(TWO_MESSAGES);
        let parsed = MailboxParser::new(file.path()).unwrap().parse(None).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.incomplete, 0);
        assert_eq!(parsed.records[0].email, "alice@example.com");
        assert_eq!(parsed.records[0].weekday, "Fri");
        assert_eq!(parsed.records[1].domain, "test.org");
        assert_eq!(parsed.records[1].confidence, 0.6178);
    }

    #[test]
    fn test_missing_confidence_skips_only_that_message() {
        let contents = TWO_MESSAGES.replace("X-DSPAM-Confidence: 0.8475\n", "");
        let file = write_mbox(&contents);
        let parsed = MailboxParser::new(file.path()).unwrap().parse(None).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.incomplete, 1);
        assert_eq!(parsed.records[0].email, "bob@test.org");
        assert_eq!(parsed.records[0].confidence, 0.6178);
    }

    #[test]
    fn test_strict_rejects_incomplete_message() {
        let contents = TWO_MESSAGES.replace("Date: Mon, 7 Jan 2008 09:00:00 -0500\n", "");
        let file = write_mbox(&contents);
        let err = MailboxParser::new(file.path())
            .unwrap()
            .strict(true)
            .parse(None)
            .unwrap_err();
        assert!(matches!(
            err,
            SpamError::IncompleteMessage {
                line: 8,
                missing: "Date: weekday"
            }
        ));
    }

    #[test]
    fn test_body_lines_not_scanned() {
        let contents = TWO_MESSAGES.replace("Body one.", "From: not-an-address");
        let file = write_mbox(&contents);
        let parsed = MailboxParser::new(file.path()).unwrap().parse(None).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_headers_without_separator() {
        let file = write_mbox(
            "From: carol@site.net\nDate: Sat, 5 Jan 2008 1:00:00\nX-DSPAM-Confidence: 0.1\n",
        );
        let parsed = MailboxParser::new(file.path()).unwrap().parse(None).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.records[0].weekday, "Sat");
    }

    #[test]
    fn test_missing_file() {
        let err = MailboxParser::new("/nonexistent/mbox-short.txt").err();
        assert!(matches!(err, Some(SpamError::FileNotFound(_))));
    }

    #[test]
    fn test_empty_file() {
        let file = write_mbox("");
        let parsed = MailboxParser::new(file.path()).unwrap().parse(None).unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed.incomplete, 0);
    }

    #[test]
    fn test_progress_reports_completion() {
        let file = write_mbox(TWO_MESSAGES);
        let parser = MailboxParser::new(file.path()).unwrap();
        let last = std::cell::Cell::new((0u64, 0u64));
        parser
            .parse(Some(&|done, total| last.set((done, total))))
            .unwrap();
        let size = TWO_MESSAGES.len() as u64;
        assert_eq!(last.get(), (size, size));
    }
}
