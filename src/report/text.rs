//! Plain-text rendering of the domain list and the filtered email table.

use std::io::Write;

use crate::model::record::ReportRow;

use super::describe_weekdays;

/// Column titles of the filtered table.
pub const COLUMN_TITLES: [&str; 4] = [
    "Day of the week",
    "Domain name",
    "E-mail address",
    "Spam confidence level",
];

/// Print `Unique domains:` followed by one domain per line.
pub fn write_domains<W: Write>(out: &mut W, domains: &[String]) -> std::io::Result<()> {
    writeln!(out, "Unique domains:")?;
    for domain in domains {
        writeln!(out, "{domain}")?;
    }
    Ok(())
}

/// Print the caption, column titles, and one aligned line per row.
///
/// An empty `rows` still prints the caption and titles.
pub fn write_filtered<W: Write>(
    out: &mut W,
    domain: &str,
    weekdays: &[String],
    rows: &[ReportRow],
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "E-mails received from {} on {}:",
        domain,
        describe_weekdays(weekdays)
    )?;
    let [day, dom, email, conf] = COLUMN_TITLES;
    writeln!(out, "{}", format_row(day, dom, email, conf))?;
    for row in rows {
        writeln!(
            out,
            "{}",
            format_row(
                &row.weekday,
                &row.domain,
                &row.email,
                &format_confidence(row.confidence)
            )
        )?;
    }
    Ok(())
}

/// Left-justify the four columns at widths 15, 25, 30 and 20.
fn format_row(weekday: &str, domain: &str, email: &str, confidence: &str) -> String {
    format!("{weekday:<15} {domain:<25} {email:<30} {confidence:<20}")
}

/// Shortest decimal form, keeping one decimal place on integral values (`1.0`).
pub fn format_confidence(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
