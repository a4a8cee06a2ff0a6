/// Schema for the mboxspam `SQLite` database.
///
/// `Email`, `Domain` and `Weekday` are dimension tables holding each value
/// once. `SpamConfidence` holds one row per loaded message.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS Email (
    id INTEGER PRIMARY KEY,
    email TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS Domain (
    id INTEGER PRIMARY KEY,
    domain TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS Weekday (
    id INTEGER PRIMARY KEY,
    weekday TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS SpamConfidence (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email_id INTEGER,
    domain_id INTEGER,
    weekday_id INTEGER,
    confidence REAL,
    FOREIGN KEY (email_id) REFERENCES Email(id),
    FOREIGN KEY (domain_id) REFERENCES Domain(id),
    FOREIGN KEY (weekday_id) REFERENCES Weekday(id)
);
";

/// Delete every row, facts first so foreign keys stay satisfied.
pub const CLEAR_SQL: &str = r"
DELETE FROM SpamConfidence;
DELETE FROM Email;
DELETE FROM Domain;
DELETE FROM Weekday;
";

/// The three dimension tables, as `(table, column)`.
pub const DIMENSIONS: [(&str, &str); 3] = [
    ("Email", "email"),
    ("Domain", "domain"),
    ("Weekday", "weekday"),
];
