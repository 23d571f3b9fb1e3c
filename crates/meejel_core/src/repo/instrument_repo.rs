//! Instrument repository contract and SQLite implementation.
//!
//! # Invariants
//! - `(name, owner)` uniqueness is enforced by the schema.
//! - Deleting an instrument removes its principles, components and evidence
//!   in one transaction.

use crate::model::instrument::{Instrument, InstrumentId};
use crate::repo::rubric_repo::{
    map_write_error, parse_uuid, to_count, EntityKind, RepoError, RepoResult, SqliteRubricRepository,
    UniqueConstraint,
};
use log::info;
use rusqlite::{params, Row};

const INSTRUMENT_SELECT_SQL: &str = "SELECT uuid, name, owner FROM instruments";

/// Rows removed by an instrument cascade delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub principles: u64,
    pub components: u64,
    pub evidence: u64,
}

/// Repository interface for instrument CRUD operations.
pub trait InstrumentRepository {
    fn create_instrument(&self, instrument: &Instrument) -> RepoResult<InstrumentId>;
    /// Replaces name and owner of an existing instrument.
    fn update_instrument(&self, instrument: &Instrument) -> RepoResult<()>;
    fn get_instrument(&self, id: InstrumentId) -> RepoResult<Option<Instrument>>;
    /// Lists instruments newest first, optionally restricted to one owner.
    fn list_instruments(&self, owner: Option<&str>) -> RepoResult<Vec<Instrument>>;
    /// Deletes an instrument and everything it owns.
    fn delete_instrument(&self, id: InstrumentId) -> RepoResult<CascadeSummary>;
}

impl InstrumentRepository for SqliteRubricRepository<'_> {
    fn create_instrument(&self, instrument: &Instrument) -> RepoResult<InstrumentId> {
        instrument.validate()?;

        self.conn
            .execute(
                "INSERT INTO instruments (uuid, name, owner) VALUES (?1, ?2, ?3);",
                params![
                    instrument.uuid.to_string(),
                    instrument.name.as_str(),
                    instrument.owner.as_str(),
                ],
            )
            .map_err(|err| map_write_error(err, UniqueConstraint::InstrumentNamePerOwner))?;

        Ok(instrument.uuid)
    }

    fn update_instrument(&self, instrument: &Instrument) -> RepoResult<()> {
        instrument.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE instruments
                 SET
                    name = ?1,
                    owner = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?3;",
                params![
                    instrument.name.as_str(),
                    instrument.owner.as_str(),
                    instrument.uuid.to_string(),
                ],
            )
            .map_err(|err| map_write_error(err, UniqueConstraint::InstrumentNamePerOwner))?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Instrument, instrument.uuid));
        }

        Ok(())
    }

    fn get_instrument(&self, id: InstrumentId) -> RepoResult<Option<Instrument>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{INSTRUMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_instrument_row(row)?));
        }

        Ok(None)
    }

    fn list_instruments(&self, owner: Option<&str>) -> RepoResult<Vec<Instrument>> {
        let mut stmt = self.conn.prepare(&format!(
            "{INSTRUMENT_SELECT_SQL}
             WHERE (?1 IS NULL OR owner = ?1)
             ORDER BY rowid DESC;"
        ))?;
        let mut rows = stmt.query([owner.map(str::trim)])?;
        let mut instruments = Vec::new();
        while let Some(row) = rows.next()? {
            instruments.push(parse_instrument_row(row)?);
        }

        Ok(instruments)
    }

    fn delete_instrument(&self, id: InstrumentId) -> RepoResult<CascadeSummary> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        let count = |sql: &str| -> RepoResult<u64> {
            let value: i64 = tx.query_row(sql, [id_text.as_str()], |row| row.get(0))?;
            to_count(value)
        };
        let summary = CascadeSummary {
            principles: count("SELECT COUNT(*) FROM principles WHERE instrument_uuid = ?1;")?,
            components: count("SELECT COUNT(*) FROM components WHERE instrument_uuid = ?1;")?,
            // Evidence rows reachable through either parent.
            evidence: count(
                "SELECT COUNT(*)
                 FROM evidence e
                 WHERE e.principle_uuid IN (
                        SELECT uuid FROM principles WHERE instrument_uuid = ?1
                    )
                    OR e.component_uuid IN (
                        SELECT uuid FROM components WHERE instrument_uuid = ?1
                    );",
            )?,
        };

        let changed = tx.execute(
            "DELETE FROM instruments WHERE uuid = ?1;",
            [id_text.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Instrument, id));
        }
        tx.commit()?;

        info!(
            "event=instrument_delete module=repo status=ok principles={} components={} evidence={}",
            summary.principles, summary.components, summary.evidence
        );
        Ok(summary)
    }
}

fn parse_instrument_row(row: &Row<'_>) -> RepoResult<Instrument> {
    let uuid_text: String = row.get("uuid")?;
    let instrument = Instrument {
        uuid: parse_uuid(&uuid_text, "instruments.uuid")?,
        name: row.get("name")?,
        owner: row.get("owner")?,
    };
    instrument.validate()?;
    Ok(instrument)
}
