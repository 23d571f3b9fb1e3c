//! Repository layer abstractions and the SQLite rubric store.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity kind.
//! - Isolate SQLite query details from service and scoring code.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Uniqueness violations surface as `RepoError::ConstraintViolation`.
//! - Missing parents and targets surface as `RepoError::NotFound`.

pub mod component_repo;
pub mod evidence_repo;
pub mod instrument_repo;
pub mod principle_repo;
pub mod rubric_repo;
