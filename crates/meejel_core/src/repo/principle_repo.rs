//! Principle repository contract and SQLite implementation.
//!
//! # Invariants
//! - A principle can only be created under an existing instrument.
//! - `(instrument, category)` uniqueness is enforced by the schema.
//! - The owning instrument of a principle never changes after creation.

use crate::model::instrument::InstrumentId;
use crate::model::principle::{Grade, Principle, PrincipleCategory, PrincipleId};
use crate::repo::rubric_repo::{
    map_write_error, parse_uuid, row_exists, EntityKind, RepoError, RepoResult,
    SqliteRubricRepository, UniqueConstraint,
};
use rusqlite::{params, Row};

const PRINCIPLE_SELECT_SQL: &str = "SELECT uuid, instrument_uuid, category, grade FROM principles";

/// Repository interface for principle CRUD operations.
pub trait PrincipleRepository {
    fn create_principle(&self, principle: &Principle) -> RepoResult<PrincipleId>;
    /// Replaces category and grade of an existing principle.
    fn update_principle(&self, principle: &Principle) -> RepoResult<()>;
    fn get_principle(&self, id: PrincipleId) -> RepoResult<Option<Principle>>;
    /// Lists the principles of one instrument, newest first.
    ///
    /// An unknown instrument yields an empty list.
    fn list_principles(&self, instrument: InstrumentId) -> RepoResult<Vec<Principle>>;
    /// Deletes a principle together with its evidence.
    fn delete_principle(&self, id: PrincipleId) -> RepoResult<()>;
}

impl PrincipleRepository for SqliteRubricRepository<'_> {
    fn create_principle(&self, principle: &Principle) -> RepoResult<PrincipleId> {
        if !row_exists(self.conn, "instruments", principle.instrument_uuid)? {
            return Err(RepoError::not_found(
                EntityKind::Instrument,
                principle.instrument_uuid,
            ));
        }

        self.conn
            .execute(
                "INSERT INTO principles (uuid, instrument_uuid, category, grade)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    principle.uuid.to_string(),
                    principle.instrument_uuid.to_string(),
                    principle.category.label(),
                    principle.grade.label(),
                ],
            )
            .map_err(|err| map_write_error(err, UniqueConstraint::PrincipleCategoryPerInstrument))?;

        Ok(principle.uuid)
    }

    fn update_principle(&self, principle: &Principle) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE principles
                 SET category = ?1, grade = ?2
                 WHERE uuid = ?3;",
                params![
                    principle.category.label(),
                    principle.grade.label(),
                    principle.uuid.to_string(),
                ],
            )
            .map_err(|err| map_write_error(err, UniqueConstraint::PrincipleCategoryPerInstrument))?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Principle, principle.uuid));
        }

        Ok(())
    }

    fn get_principle(&self, id: PrincipleId) -> RepoResult<Option<Principle>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRINCIPLE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_principle_row(row)?));
        }

        Ok(None)
    }

    fn list_principles(&self, instrument: InstrumentId) -> RepoResult<Vec<Principle>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PRINCIPLE_SELECT_SQL}
             WHERE instrument_uuid = ?1
             ORDER BY rowid DESC;"
        ))?;
        let mut rows = stmt.query([instrument.to_string()])?;
        let mut principles = Vec::new();
        while let Some(row) = rows.next()? {
            principles.push(parse_principle_row(row)?);
        }

        Ok(principles)
    }

    fn delete_principle(&self, id: PrincipleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM principles WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Principle, id));
        }

        Ok(())
    }
}

fn parse_principle_row(row: &Row<'_>) -> RepoResult<Principle> {
    let uuid_text: String = row.get("uuid")?;
    let instrument_text: String = row.get("instrument_uuid")?;

    let category_text: String = row.get("category")?;
    let category = PrincipleCategory::from_label(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid principle category `{category_text}` in principles.category"
        ))
    })?;

    let grade_text: String = row.get("grade")?;
    let grade = Grade::from_label(&grade_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid grade `{grade_text}` in principles.grade"))
    })?;

    Ok(Principle {
        uuid: parse_uuid(&uuid_text, "principles.uuid")?,
        instrument_uuid: parse_uuid(&instrument_text, "principles.instrument_uuid")?,
        category,
        grade,
    })
}
