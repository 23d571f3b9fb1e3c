//! Shared repository errors and the SQLite-backed rubric store handle.
//!
//! # Responsibility
//! - Own the error vocabulary shared by all entity repositories.
//! - Verify that a borrowed connection is migrated before use.
//! - Translate SQLite constraint failures into semantic errors.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::ModelValidationError;
use crate::repo::evidence_repo::EvidencePolicy;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const REQUIRED_TABLES: [&str; 4] = ["instruments", "principles", "components", "evidence"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Entity kinds addressed by repository errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Instrument,
    Principle,
    Component,
    Evidence,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Instrument => "instrument",
            Self::Principle => "principle",
            Self::Component => "component",
            Self::Evidence => "evidence",
        };
        f.write_str(name)
    }
}

/// Uniqueness constraints enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    /// `(name, owner)` on instruments.
    InstrumentNamePerOwner,
    /// `(instrument, category)` on principles.
    PrincipleCategoryPerInstrument,
    /// `(principle, component)` on evidence.
    EvidencePair,
}

impl Display for UniqueConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InstrumentNamePerOwner => {
                write!(f, "instrument name already used by this owner")
            }
            Self::PrincipleCategoryPerInstrument => {
                write!(f, "principle category already present in this instrument")
            }
            Self::EvidencePair => write!(f, "evidence already links this principle and component"),
        }
    }
}

/// Repository error for rubric persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    NotFound {
        kind: EntityKind,
        id: Uuid,
    },
    ConstraintViolation(UniqueConstraint),
    /// Evidence would link a principle and a component of different
    /// instruments while [`EvidencePolicy::SameInstrument`] is active.
    InstrumentMismatch {
        principle_instrument: Uuid,
        component_instrument: Uuid,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::ConstraintViolation(constraint) => {
                write!(f, "constraint violation: {constraint}")
            }
            Self::InstrumentMismatch {
                principle_instrument,
                component_instrument,
            } => write!(
                f,
                "principle belongs to instrument {principle_instrument} but component belongs to {component_instrument}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "rubric repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "rubric repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted rubric data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// Returns `true` for not-found errors regardless of entity kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// SQLite-backed rubric store.
///
/// Implements every entity repository trait over one borrowed connection.
pub struct SqliteRubricRepository<'conn> {
    pub(crate) conn: &'conn Connection,
    pub(crate) evidence_policy: EvidencePolicy,
}

impl<'conn> SqliteRubricRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Uses [`EvidencePolicy::Permissive`].
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_rubric_connection_ready(conn)?;
        Ok(Self {
            conn,
            evidence_policy: EvidencePolicy::default(),
        })
    }

    /// Replaces the cross-instrument evidence policy.
    pub fn with_evidence_policy(mut self, policy: EvidencePolicy) -> Self {
        self.evidence_policy = policy;
        self
    }

    pub fn evidence_policy(&self) -> EvidencePolicy {
        self.evidence_policy
    }
}

/// Maps unique-index failures to `constraint`; everything else stays a DB error.
pub(crate) fn map_write_error(err: rusqlite::Error, constraint: UniqueConstraint) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::ConstraintViolation(constraint)
    } else {
        err.into()
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(inner, _) => {
            inner.code == ErrorCode::ConstraintViolation
                && inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn to_count(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{value}`")))
}

/// Returns whether a row with `uuid` exists in `table`.
///
/// `table` must be one of the fixed rubric table names.
pub(crate) fn row_exists(conn: &Connection, table: &str, uuid: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE uuid = ?1);"),
        [uuid.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_rubric_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
