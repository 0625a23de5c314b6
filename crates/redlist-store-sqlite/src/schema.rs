//! SQL schema for the snapshot store.
//!
//! Assessment columns use the flattened dotted field names of the record
//! (`taxon.sis_id`, `taxon.scientific_name`, ...), so they must be quoted.
//! List fields are stored as compact JSON. `row_id` preserves the snapshot's
//! record order.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS assessments (
    row_id                  INTEGER PRIMARY KEY,
    year_published          INTEGER,
    "taxon.scientific_name" TEXT    NOT NULL,
    "taxon.sis_id"          INTEGER NOT NULL,
    "taxon.kingdom_name"    TEXT    NOT NULL,
    "taxon.phylum_name"     TEXT    NOT NULL,
    "taxon.class_name"      TEXT    NOT NULL,
    "taxon.order_name"      TEXT    NOT NULL,
    "taxon.family_name"     TEXT    NOT NULL,
    locations               TEXT    NOT NULL,   -- JSON [{country, presence}]
    use_and_trade           TEXT    NOT NULL,   -- JSON [usage label]
    threats                 TEXT    NOT NULL,   -- JSON [text]
    risk_category           TEXT    NOT NULL    -- canonical code
);

-- (species, usage tag); a species' rows are in tag order.
CREATE TABLE IF NOT EXISTS uses (
    row_id     INTEGER PRIMARY KEY,
    species_id INTEGER NOT NULL,
    tag        TEXT    NOT NULL
);

-- (species, country), one row per presence entry.
CREATE TABLE IF NOT EXISTS countries (
    row_id     INTEGER PRIMARY KEY,
    species_id INTEGER NOT NULL,
    country    TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS assessments_species_idx ON assessments("taxon.sis_id");
CREATE INDEX IF NOT EXISTS countries_country_idx   ON countries(country);

PRAGMA user_version = 1;
"#;

pub const INSERT_ASSESSMENT: &str = r#"
INSERT INTO assessments (
    year_published,
    "taxon.scientific_name", "taxon.sis_id", "taxon.kingdom_name",
    "taxon.phylum_name", "taxon.class_name", "taxon.order_name",
    "taxon.family_name",
    locations, use_and_trade, threats, risk_category
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
"#;

pub const SELECT_ASSESSMENTS: &str = r#"
SELECT
    year_published,
    "taxon.scientific_name", "taxon.sis_id", "taxon.kingdom_name",
    "taxon.phylum_name", "taxon.class_name", "taxon.order_name",
    "taxon.family_name",
    locations, use_and_trade, threats, risk_category
FROM assessments
ORDER BY row_id
"#;
