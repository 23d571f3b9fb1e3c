//! Rubric domain model.
//!
//! # Responsibility
//! - Define canonical records for instruments, principles, components and
//!   evidence links.
//! - Define the closed choice sets (principle category, grade, component
//!   type) and their persisted labels.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Derived scores (`weight`, `level`) are never part of a record.
//! - Records validate their own text fields before persistence.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod component;
pub mod evidence;
pub mod instrument;
pub mod principle;

/// Validation failures for record text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Instrument name is empty after trimming.
    EmptyName,
    /// Instrument name exceeds the storage limit.
    NameTooLong { max_chars: usize, actual_chars: usize },
    /// Instrument owner reference is empty after trimming.
    EmptyOwner,
    /// Component description is empty after trimming.
    EmptyDescription,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "instrument name cannot be empty"),
            Self::NameTooLong {
                max_chars,
                actual_chars,
            } => write!(
                f,
                "instrument name has {actual_chars} characters; at most {max_chars} allowed"
            ),
            Self::EmptyOwner => write!(f, "instrument owner cannot be empty"),
            Self::EmptyDescription => write!(f, "component description cannot be empty"),
        }
    }
}

impl Error for ModelValidationError {}
