//! Reporting: domain list, filtered email table, JSON output, and the interactive prompt.

pub mod json;
pub mod prompt;
pub mod text;

use std::str::FromStr;

use chrono::Weekday;

use crate::error::{Result, SpamError};

/// Normalize user-supplied weekday names to the stored three-letter form.
///
/// Accepts anything `chrono::Weekday` parses (`fri`, `Friday`, `SAT`, ...).
pub fn parse_weekdays<S: AsRef<str>>(names: &[S]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref().trim();
        let day = Weekday::from_str(name).map_err(|_| SpamError::InvalidWeekday(name.to_string()))?;
        let abbr = day.to_string();
        if !out.contains(&abbr) {
            out.push(abbr);
        }
    }
    Ok(out)
}

/// Human description of a weekday set: `Fridays and Saturdays`.
pub fn describe_weekdays(weekdays: &[String]) -> String {
    let names: Vec<String> = weekdays.iter().map(|w| plural_day(w)).collect();
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

fn plural_day(abbr: &str) -> String {
    let full = match Weekday::from_str(abbr) {
        Ok(Weekday::Mon) => "Monday",
        Ok(Weekday::Tue) => "Tuesday",
        Ok(Weekday::Wed) => "Wednesday",
        Ok(Weekday::Thu) => "Thursday",
        Ok(Weekday::Fri) => "Friday",
        Ok(Weekday::Sat) => "Saturday",
        Ok(Weekday::Sun) => "Sunday",
        Err(_) => return abbr.to_string(),
    };
    format!("{full}s")
}
