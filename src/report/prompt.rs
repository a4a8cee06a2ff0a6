//! Interactive domain prompt.

use std::io::{BufRead, Write};

/// Text shown before reading the domain.
pub const DOMAIN_PROMPT: &str = "Enter a domain name from the list above: ";

/// Ask for a domain and read one line of input.
///
/// Only the line terminator is removed; surrounding spaces are kept, so
/// the match against stored domains stays exact. End of input yields an
/// empty string.
pub fn prompt_domain<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> std::io::Result<String> {
    write!(out, "{DOMAIN_PROMPT}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_reads_line() {
        let mut input = std::io::Cursor::new("uct.ac.za\r\nignored\n");
        let mut out = Vec::new();
        let domain = prompt_domain(&mut input, &mut out).unwrap();
        assert_eq!(domain, "uct.ac.za");
        assert_eq!(String::from_utf8(out).unwrap(), DOMAIN_PROMPT);
    }

    #[test]
    fn test_prompt_keeps_spaces() {
        let mut input = std::io::Cursor::new(" gmail.com \n");
        let domain = prompt_domain(&mut input, &mut Vec::new()).unwrap();
        assert_eq!(domain, " gmail.com ");
    }

    #[test]
    fn test_prompt_eof_is_empty() {
        let mut input = std::io::Cursor::new("");
        let domain = prompt_domain(&mut input, &mut Vec::new()).unwrap();
        assert_eq!(domain, "");
    }
}
