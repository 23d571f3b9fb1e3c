//! Principle weight and instrument level computation.
//!
//! # Responsibility
//! - Turn filtered evidence counts into principle weights.
//! - Aggregate principle weights into an instrument level.
//!
//! # Invariants
//! - Scoring never mutates or caches store state; every call recomputes.
//! - Ratio sub-scores with an empty denominator contribute `0`.
//! - Grade multipliers come from a validated, caller-supplied `GradeTable`.

pub mod engine;
pub mod grade;

pub use engine::{
    level_from_weights, score_counts, EvidenceCounts, InstrumentReport, PrincipleScore,
    ScoredPrinciple, ScoringEngine, ScoringStore, LEVEL_DIVISOR,
};
pub use grade::{GradeTable, GradeTableError};
