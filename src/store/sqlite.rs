use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, params_from_iter, Connection, Transaction};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, SpamError};
use crate::model::record::{ParsedMailbox, ReportRow, SpamRecord, StoreStats};

use super::schema;

/// What one load added to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Fact rows inserted (one per record).
    pub records: u64,
    /// Email rows that did not exist before.
    pub new_emails: u64,
    /// Domain rows that did not exist before.
    pub new_domains: u64,
    /// Weekday rows that did not exist before.
    pub new_weekdays: u64,
}

/// SQLite-backed spam-confidence store.
///
/// The connection stays open for the lifetime of the value and is closed on drop.
#[derive(Debug)]
pub struct SpamStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SpamStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SpamError::io(parent, e))?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            db_path: Some(path.to_path_buf()),
        };
        store.initialize()?;
        debug!(path = %path.display(), "Opened store");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(schema::SCHEMA_SQL)?;
        Ok(())
    }

    /// Location of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Remove all rows from every table.
    pub fn clear(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(schema::CLEAR_SQL)?;
        tx.commit()?;
        info!("Cleared store");
        Ok(())
    }

    /// Load every complete message of a parsed mailbox.
    pub fn load(&mut self, mailbox: &ParsedMailbox) -> Result<LoadStats> {
        self.load_records(&mailbox.records)
    }

    /// Load four positionally aligned sequences.
    ///
    /// Index `i` of each sequence must describe the same message. Sequences
    /// of different lengths are rejected before anything is written.
    pub fn load_columns(
        &mut self,
        emails: &[String],
        domains: &[String],
        weekdays: &[String],
        confidences: &[f64],
    ) -> Result<LoadStats> {
        let n = emails.len();
        if domains.len() != n || weekdays.len() != n || confidences.len() != n {
            return Err(SpamError::MisalignedColumns {
                emails: n,
                domains: domains.len(),
                weekdays: weekdays.len(),
                confidences: confidences.len(),
            });
        }
        let records: Vec<SpamRecord> = (0..n)
            .map(|i| SpamRecord {
                email: emails[i].clone(),
                domain: domains[i].clone(),
                weekday: weekdays[i].clone(),
                confidence: confidences[i],
            })
            .collect();
        self.load_records(&records)
    }

    /// Insert dimension values and one fact row per record.
    ///
    /// Everything happens in a single transaction committed at the end; an
    /// error anywhere leaves the store unchanged.
    pub fn load_records(&mut self, records: &[SpamRecord]) -> Result<LoadStats> {
        let tx = self.conn.transaction()?;

        let [email_dim, domain_dim, weekday_dim] = schema::DIMENSIONS;
        let (email_ids, new_emails) =
            resolve_dimension(&tx, email_dim, records.iter().map(|r| r.email.as_str()))?;
        let (domain_ids, new_domains) =
            resolve_dimension(&tx, domain_dim, records.iter().map(|r| r.domain.as_str()))?;
        let (weekday_ids, new_weekdays) =
            resolve_dimension(&tx, weekday_dim, records.iter().map(|r| r.weekday.as_str()))?;

        let mut inserted: u64 = 0;
        {
            let mut insert = tx.prepare(
                "INSERT INTO SpamConfidence (email_id, domain_id, weekday_id, confidence)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for r in records {
                // Every value was resolved above, so the lookups cannot miss.
                let (Some(e), Some(d), Some(w)) = (
                    email_ids.get(&r.email),
                    domain_ids.get(&r.domain),
                    weekday_ids.get(&r.weekday),
                ) else {
                    continue;
                };
                insert.execute(params![e, d, w, r.confidence])?;
                inserted += 1;
            }
        }

        tx.commit()?;

        let stats = LoadStats {
            records: inserted,
            new_emails,
            new_domains,
            new_weekdays,
        };
        info!(
            records = stats.records,
            new_emails = stats.new_emails,
            new_domains = stats.new_domains,
            new_weekdays = stats.new_weekdays,
            "Loaded records"
        );
        Ok(stats)
    }

    /// Every stored domain, in insertion order.
    pub fn domains(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT domain FROM Domain ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Messages from exactly `domain` whose weekday is one of `weekdays`.
    ///
    /// Rows come back in load order. An unknown domain gives an empty list.
    pub fn emails_from_domain(&self, domain: &str, weekdays: &[String]) -> Result<Vec<ReportRow>> {
        if weekdays.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (0..weekdays.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT Weekday.weekday, Domain.domain, Email.email, SpamConfidence.confidence
             FROM SpamConfidence
             JOIN Weekday ON SpamConfidence.weekday_id = Weekday.id
             JOIN Domain ON SpamConfidence.domain_id = Domain.id
             JOIN Email ON SpamConfidence.email_id = Email.id
             WHERE Domain.domain = ?1 AND Weekday.weekday IN ({placeholders})
             ORDER BY SpamConfidence.id"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let args = std::iter::once(domain).chain(weekdays.iter().map(String::as_str));
        let rows = stmt.query_map(params_from_iter(args), |row| {
            Ok(ReportRow {
                weekday: row.get(0)?,
                domain: row.get(1)?,
                email: row.get(2)?,
                confidence: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        debug!(domain, count = out.len(), "Filtered report");
        Ok(out)
    }

    /// Row counts for every table.
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            emails: self.count("Email")?,
            domains: self.count("Domain")?,
            weekdays: self.count("Weekday")?,
            records: self.count("SpamConfidence")?,
        })
    }

    fn count(&self, table: &str) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        Ok(u64::try_from(n).unwrap_or_default())
    }

    /// Fact rows whose foreign keys point at missing dimension rows.
    pub fn dangling_references(&self) -> Result<u64> {
        let mut stmt = self.conn.prepare("PRAGMA foreign_key_check")?;
        let mut rows = stmt.query([])?;
        let mut n = 0;
        while rows.next()?.is_some() {
            n += 1;
        }
        Ok(n)
    }
}

/// Insert each distinct value into a dimension table and map it to its id.
///
/// Returns the map and how many rows were newly created.
fn resolve_dimension<'a>(
    tx: &Transaction<'_>,
    (table, column): (&str, &str),
    values: impl Iterator<Item = &'a str>,
) -> Result<(HashMap<String, i64>, u64)> {
    let mut insert = tx.prepare(&format!(
        "INSERT OR IGNORE INTO {table} ({column}) VALUES (?1)"
    ))?;
    let mut select = tx.prepare(&format!("SELECT id FROM {table} WHERE {column} = ?1"))?;

    let mut ids: HashMap<String, i64> = HashMap::new();
    let mut created: u64 = 0;
    for value in values {
        if ids.contains_key(value) {
            continue;
        }
        created += insert.execute(params![value])? as u64;
        let id: i64 = select.query_row(params![value], |row| row.get(0))?;
        ids.insert(value.to_string(), id);
    }
    Ok((ids, created))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str, weekday: &str, confidence: f64) -> SpamRecord {
        SpamRecord {
            email: email.to_string(),
            domain: email.split('@').nth(1).unwrap_or_default().to_string(),
            weekday: weekday.to_string(),
            confidence,
        }
    }

    fn sample() -> Vec<SpamRecord> {
        vec![
            record("alice@uct.ac.za", "Fri", 0.8475),
            record("bob@media.berkeley.edu", "Sat", 0.6178),
            record("alice@uct.ac.za", "Mon", 0.6961),
            record("carol@uct.ac.za", "Sat", 0.7565),
            record("dave@uct.ac.za", "Thu", 0.7626),
        ]
    }

    #[test]
    fn test_load_counts_distinct_values() {
        let mut store = SpamStore::in_memory().unwrap();
        let stats = store.load_records(&sample()).unwrap();
        assert_eq!(stats.records, 5);
        assert_eq!(stats.new_emails, 4);
        assert_eq!(stats.new_domains, 2);
        assert_eq!(stats.new_weekdays, 4);

        let counts = store.stats().unwrap();
        assert_eq!(counts.emails, 4);
        assert_eq!(counts.domains, 2);
        assert_eq!(counts.weekdays, 4);
        assert_eq!(counts.records, 5);
    }

    #[test]
    fn test_reload_keeps_dimensions_unique() {
        let mut store = SpamStore::in_memory().unwrap();
        store.load_records(&sample()).unwrap();
        let second = store.load_records(&sample()).unwrap();
        assert_eq!(second.new_emails, 0);
        assert_eq!(second.new_domains, 0);
        assert_eq!(second.new_weekdays, 0);

        let counts = store.stats().unwrap();
        assert_eq!(counts.emails, 4);
        assert_eq!(counts.domains, 2);
        // Facts accumulate across loads.
        assert_eq!(counts.records, 10);
    }

    #[test]
    fn test_references_resolve() {
        let mut store = SpamStore::in_memory().unwrap();
        store.load_records(&sample()).unwrap();
        assert_eq!(store.dangling_references().unwrap(), 0);
    }

    #[test]
    fn test_domains_in_load_order() {
        let mut store = SpamStore::in_memory().unwrap();
        store.load_records(&sample()).unwrap();
        assert_eq!(
            store.domains().unwrap(),
            vec!["uct.ac.za", "media.berkeley.edu"]
        );
    }

    #[test]
    fn test_filter_friday_saturday() {
        let mut store = SpamStore::in_memory().unwrap();
        store.load_records(&sample()).unwrap();
        let days = vec!["Fri".to_string(), "Sat".to_string()];
        let rows = store.emails_from_domain("uct.ac.za", &days).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].email, "alice@uct.ac.za");
        assert_eq!(rows[0].weekday, "Fri");
        assert_eq!(rows[0].confidence, 0.8475);
        assert_eq!(rows[1].email, "carol@uct.ac.za");
        assert_eq!(rows[1].weekday, "Sat");
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let mut store = SpamStore::in_memory().unwrap();
        store.load_records(&sample()).unwrap();
        let days = vec!["Fri".to_string(), "Sat".to_string()];
        assert!(store.emails_from_domain("UCT.AC.ZA", &days).unwrap().is_empty());
        assert!(store.emails_from_domain("nowhere.org", &days).unwrap().is_empty());
        assert!(store.emails_from_domain("uct.ac.za", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_load_columns_rejects_misaligned() {
        let mut store = SpamStore::in_memory().unwrap();
        let emails = vec!["a@b.org".to_string(), "c@d.org".to_string()];
        let domains = vec!["b.org".to_string(), "d.org".to_string()];
        let weekdays = vec!["Fri".to_string(), "Sat".to_string()];
        let err = store
            .load_columns(&emails, &domains, &weekdays, &[0.5])
            .unwrap_err();
        assert!(matches!(
            err,
            SpamError::MisalignedColumns {
                emails: 2,
                confidences: 1,
                ..
            }
        ));
        assert_eq!(store.stats().unwrap(), StoreStats::default());

        let stats = store
            .load_columns(&emails, &domains, &weekdays, &[0.5, 0.25])
            .unwrap();
        assert_eq!(stats.records, 2);
    }

    #[test]
    fn test_clear_empties_every_table() {
        let mut store = SpamStore::in_memory().unwrap();
        store.load_records(&sample()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.stats().unwrap(), StoreStats::default());
    }

    #[test]
    fn test_reopen_file_store_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("email_data.db");
        {
            let mut store = SpamStore::open(&path).unwrap();
            store.load_records(&sample()).unwrap();
        }
        let store = SpamStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.stats().unwrap().records, 5);
    }
}
