//! Evidence repository contract, filtered counting and SQLite implementation.
//!
//! # Responsibility
//! - Persist principle/component links.
//! - Answer the filtered evidence counts the scoring engine is built on.
//!
//! # Invariants
//! - `(principle, component)` uniqueness is enforced by the schema.
//! - Both parents must exist when a link is created.
//! - Cross-instrument links are only rejected under
//!   [`EvidencePolicy::SameInstrument`].

use crate::model::component::ComponentType;
use crate::model::evidence::{Evidence, EvidenceId};
use crate::model::instrument::InstrumentId;
use crate::model::principle::PrincipleId;
use crate::repo::rubric_repo::{
    map_write_error, parse_uuid, to_count, EntityKind, RepoError, RepoResult,
    SqliteRubricRepository, UniqueConstraint,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row, Transaction};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const EVIDENCE_SELECT_SQL: &str = "SELECT uuid, principle_uuid, component_uuid FROM evidence";

/// Whether evidence may link a principle and a component that belong to
/// different instruments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidencePolicy {
    /// Any existing principle/component pair may be linked.
    #[default]
    Permissive,
    /// Principle and component must share the same instrument.
    SameInstrument,
}

/// Filter for [`EvidenceRepository::count_evidence`]. Unset fields do not
/// restrict the count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvidenceFilter {
    /// Evidence of this principle only.
    pub principle: Option<PrincipleId>,
    /// Evidence whose component belongs to this instrument.
    pub instrument_of_component: Option<InstrumentId>,
    /// Evidence whose component has this type.
    pub component_type: Option<ComponentType>,
}

impl EvidenceFilter {
    pub fn for_principle(principle: PrincipleId, component_type: ComponentType) -> Self {
        Self {
            principle: Some(principle),
            instrument_of_component: None,
            component_type: Some(component_type),
        }
    }

    pub fn for_instrument(instrument: InstrumentId, component_type: ComponentType) -> Self {
        Self {
            principle: None,
            instrument_of_component: Some(instrument),
            component_type: Some(component_type),
        }
    }
}

/// Repository interface for evidence links.
pub trait EvidenceRepository {
    fn create_evidence(&self, evidence: &Evidence) -> RepoResult<EvidenceId>;
    fn get_evidence(&self, id: EvidenceId) -> RepoResult<Option<Evidence>>;
    /// Lists the evidence of one principle, newest first.
    fn list_evidence(&self, principle: PrincipleId) -> RepoResult<Vec<Evidence>>;
    fn delete_evidence(&self, id: EvidenceId) -> RepoResult<()>;
    /// Counts evidence rows matching every set field of `filter`.
    fn count_evidence(&self, filter: &EvidenceFilter) -> RepoResult<u64>;
}

impl EvidenceRepository for SqliteRubricRepository<'_> {
    fn create_evidence(&self, evidence: &Evidence) -> RepoResult<EvidenceId> {
        let tx = self.conn.unchecked_transaction()?;

        let principle_instrument = owning_instrument(
            &tx,
            "SELECT instrument_uuid FROM principles WHERE uuid = ?1;",
            EntityKind::Principle,
            evidence.principle_uuid,
        )?;
        let component_instrument = owning_instrument(
            &tx,
            "SELECT instrument_uuid FROM components WHERE uuid = ?1;",
            EntityKind::Component,
            evidence.component_uuid,
        )?;

        if self.evidence_policy == EvidencePolicy::SameInstrument
            && principle_instrument != component_instrument
        {
            return Err(RepoError::InstrumentMismatch {
                principle_instrument,
                component_instrument,
            });
        }

        tx.execute(
            "INSERT INTO evidence (uuid, principle_uuid, component_uuid) VALUES (?1, ?2, ?3);",
            params![
                evidence.uuid.to_string(),
                evidence.principle_uuid.to_string(),
                evidence.component_uuid.to_string(),
            ],
        )
        .map_err(|err| map_write_error(err, UniqueConstraint::EvidencePair))?;
        tx.commit()?;

        Ok(evidence.uuid)
    }

    fn get_evidence(&self, id: EvidenceId) -> RepoResult<Option<Evidence>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVIDENCE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_evidence_row(row)?));
        }

        Ok(None)
    }

    fn list_evidence(&self, principle: PrincipleId) -> RepoResult<Vec<Evidence>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVIDENCE_SELECT_SQL}
             WHERE principle_uuid = ?1
             ORDER BY rowid DESC;"
        ))?;
        let mut rows = stmt.query([principle.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_evidence_row(row)?);
        }

        Ok(items)
    }

    fn delete_evidence(&self, id: EvidenceId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM evidence WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Evidence, id));
        }

        Ok(())
    }

    fn count_evidence(&self, filter: &EvidenceFilter) -> RepoResult<u64> {
        let mut sql = String::from(
            "SELECT COUNT(*)
             FROM evidence e
             INNER JOIN components c ON c.uuid = e.component_uuid
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(principle) = filter.principle {
            sql.push_str(" AND e.principle_uuid = ?");
            bind_values.push(Value::Text(principle.to_string()));
        }
        if let Some(instrument) = filter.instrument_of_component {
            sql.push_str(" AND c.instrument_uuid = ?");
            bind_values.push(Value::Text(instrument.to_string()));
        }
        if let Some(component_type) = filter.component_type {
            sql.push_str(" AND c.component_type = ?");
            bind_values.push(Value::Text(component_type.label().to_string()));
        }

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        to_count(count)
    }
}

fn owning_instrument(
    tx: &Transaction<'_>,
    sql: &str,
    kind: EntityKind,
    id: Uuid,
) -> RepoResult<InstrumentId> {
    let instrument_text: Option<String> = tx
        .query_row(sql, [id.to_string()], |row| row.get(0))
        .optional()?;
    match instrument_text {
        Some(value) => parse_uuid(&value, "instrument_uuid"),
        None => Err(RepoError::not_found(kind, id)),
    }
}

fn parse_evidence_row(row: &Row<'_>) -> RepoResult<Evidence> {
    let uuid_text: String = row.get("uuid")?;
    let principle_text: String = row.get("principle_uuid")?;
    let component_text: String = row.get("component_uuid")?;

    Ok(Evidence {
        uuid: parse_uuid(&uuid_text, "evidence.uuid")?,
        principle_uuid: parse_uuid(&principle_text, "evidence.principle_uuid")?,
        component_uuid: parse_uuid(&component_text, "evidence.component_uuid")?,
    })
}

