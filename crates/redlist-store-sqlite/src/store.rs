//! [`SqliteStore`], the SQLite implementation of [`SnapshotStore`].

use std::path::Path;

use redlist_core::{
  Snapshot,
  index::{CountryIndex, UsageIndex},
  record::{AssessmentRecord, SpeciesId},
  store::{SnapshotStore, SnapshotSummary},
};
use tracing::info;

use crate::{
  Result,
  encode::{
    RawAssessmentRow, decode_country_row, decode_species_id, decode_usage_row,
    encode_species_id,
  },
  schema::{INSERT_ASSESSMENT, SCHEMA, SELECT_ASSESSMENTS},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A snapshot store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for SqliteStore {
  type Error = crate::Error;

  async fn replace(&self, records: Vec<AssessmentRecord>) -> Result<SnapshotSummary> {
    let snapshot = Snapshot::from_records(records);

    let rows = snapshot
      .records()
      .iter()
      .map(RawAssessmentRow::encode)
      .collect::<Result<Vec<_>>>()?;
    let uses: Vec<(i64, String)> = snapshot
      .usage_index()
      .rows()
      .map(|r| -> Result<_> { Ok((encode_species_id(r.species_id)?, r.tag.label().to_owned())) })
      .collect::<Result<_>>()?;
    let countries: Vec<(i64, String)> = snapshot
      .country_index()
      .rows()
      .iter()
      .map(|r| -> Result<_> { Ok((encode_species_id(r.species_id)?, r.country.clone())) })
      .collect::<Result<_>>()?;

    let summary = SnapshotSummary {
      records:      rows.len(),
      species:      snapshot.usage_index().len(),
      usage_rows:   uses.len(),
      country_rows: countries.len(),
    };

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(
          "DELETE FROM assessments; DELETE FROM uses; DELETE FROM countries;",
        )?;
        {
          let mut stmt = tx.prepare(INSERT_ASSESSMENT)?;
          for r in &rows {
            stmt.execute(rusqlite::params![
              r.year_published,
              r.scientific_name,
              r.sis_id,
              r.kingdom_name,
              r.phylum_name,
              r.class_name,
              r.order_name,
              r.family_name,
              r.locations,
              r.use_and_trade,
              r.threats,
              r.risk_category,
            ])?;
          }

          let mut stmt = tx.prepare("INSERT INTO uses (species_id, tag) VALUES (?1, ?2)")?;
          for (id, tag) in &uses {
            stmt.execute(rusqlite::params![id, tag])?;
          }

          let mut stmt =
            tx.prepare("INSERT INTO countries (species_id, country) VALUES (?1, ?2)")?;
          for (id, country) in &countries {
            stmt.execute(rusqlite::params![id, country])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    info!(
      records = summary.records,
      species = summary.species,
      usage_rows = summary.usage_rows,
      country_rows = summary.country_rows,
      "snapshot replaced"
    );
    Ok(summary)
  }

  async fn load(&self) -> Result<Snapshot> {
    let (rows, uses, countries) = self
      .conn
      .call(|conn| {
        let rows = conn
          .prepare(SELECT_ASSESSMENTS)?
          .query_map([], |row| {
            Ok(RawAssessmentRow {
              year_published:  row.get(0)?,
              scientific_name: row.get(1)?,
              sis_id:          row.get(2)?,
              kingdom_name:    row.get(3)?,
              phylum_name:     row.get(4)?,
              class_name:      row.get(5)?,
              order_name:      row.get(6)?,
              family_name:     row.get(7)?,
              locations:       row.get(8)?,
              use_and_trade:   row.get(9)?,
              threats:         row.get(10)?,
              risk_category:   row.get(11)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let uses = conn
          .prepare("SELECT species_id, tag FROM uses ORDER BY row_id")?
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<(i64, String)>>>()?;

        let countries = conn
          .prepare("SELECT species_id, country FROM countries ORDER BY row_id")?
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<(i64, String)>>>()?;

        Ok((rows, uses, countries))
      })
      .await?;

    let records = rows
      .into_iter()
      .map(RawAssessmentRow::into_record)
      .collect::<Result<Vec<_>>>()?;
    let usage = UsageIndex::from_rows(
      uses
        .into_iter()
        .map(decode_usage_row)
        .collect::<Result<Vec<_>>>()?,
    );
    let countries = CountryIndex::from_rows(
      countries
        .into_iter()
        .map(decode_country_row)
        .collect::<Result<Vec<_>>>()?,
    );

    Ok(Snapshot::new(records, usage, countries))
  }

  async fn species_ids(&self) -> Result<Vec<SpeciesId>> {
    let ids: Vec<i64> = self
      .conn
      .call(|conn| {
        let ids = conn
          .prepare(
            r#"SELECT DISTINCT "taxon.sis_id" FROM assessments ORDER BY "taxon.sis_id""#,
          )?
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
      })
      .await?;

    ids.into_iter().map(decode_species_id).collect()
  }
}
