//! Core domain logic for Meejel assessment instruments.
//! This crate owns the rubric data model, its SQLite store and the scoring
//! rules that derive principle weights and instrument levels.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scoring;
pub mod service;

pub use config::{load_config, ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::component::{Component, ComponentId, ComponentType};
pub use model::evidence::{Evidence, EvidenceId};
pub use model::instrument::{Instrument, InstrumentId, INSTRUMENT_NAME_MAX_CHARS};
pub use model::principle::{Grade, Principle, PrincipleCategory, PrincipleId};
pub use model::ModelValidationError;
pub use repo::component_repo::ComponentRepository;
pub use repo::evidence_repo::{EvidenceFilter, EvidencePolicy, EvidenceRepository};
pub use repo::instrument_repo::{CascadeSummary, InstrumentRepository};
pub use repo::principle_repo::PrincipleRepository;
pub use repo::rubric_repo::{
    EntityKind, RepoError, RepoResult, SqliteRubricRepository, UniqueConstraint,
};
pub use scoring::{
    EvidenceCounts, GradeTable, GradeTableError, InstrumentReport, PrincipleScore,
    ScoredPrinciple, ScoringEngine, ScoringStore, LEVEL_DIVISOR,
};
pub use service::rubric_service::{RubricService, RubricStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
