//! JSON rendering for the `--json` flags.

use crate::model::record::{ReportRow, StoreStats};

/// The filtered report as a JSON document.
pub fn filtered_json(domain: &str, weekdays: &[String], rows: &[ReportRow]) -> serde_json::Value {
    serde_json::json!({
        "domain": domain,
        "weekdays": weekdays,
        "result_count": rows.len(),
        "results": rows,
    })
}

/// Store statistics as a JSON document.
pub fn stats_json(store_path: &str, file_size: u64, stats: &StoreStats) -> serde_json::Value {
    serde_json::json!({
        "store": store_path,
        "file_size": file_size,
        "emails": stats.emails,
        "domains": stats.domains,
        "weekdays": stats.weekdays,
        "records": stats.records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_json_shape() {
        let rows = vec![ReportRow {
            weekday: "Fri".to_string(),
            domain: "iupui.edu".to_string(),
            email: "gsilver@iupui.edu".to_string(),
            confidence: 0.6,
        }];
        let v = filtered_json("iupui.edu", &["Fri".to_string()], &rows);
        assert_eq!(v["result_count"], 1);
        assert_eq!(v["results"][0]["email"], "gsilver@iupui.edu");
        assert_eq!(v["results"][0]["confidence"], 0.6);
        assert_eq!(v["weekdays"][0], "Fri");
    }
}
