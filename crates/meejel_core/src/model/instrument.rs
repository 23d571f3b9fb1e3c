//! Instrument (assessment rubric) record.
//!
//! # Invariants
//! - `name` is non-empty and at most [`INSTRUMENT_NAME_MAX_CHARS`] characters.
//! - `(name, owner)` is unique in storage.
//! - Deleting an instrument cascades to its principles, components and their
//!   evidence.

use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an instrument.
pub type InstrumentId = Uuid;

/// Upper bound on instrument name length, in characters.
pub const INSTRUMENT_NAME_MAX_CHARS: usize = 100;

/// Named assessment rubric owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub uuid: InstrumentId,
    pub name: String,
    /// Opaque owner reference. User management lives outside this crate.
    pub owner: String,
}

impl Instrument {
    /// Creates an instrument with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
    ) -> Result<Self, ModelValidationError> {
        Self::with_id(Uuid::new_v4(), name, owner)
    }

    /// Creates an instrument with a caller-provided stable ID.
    ///
    /// `name` and `owner` are stored trimmed.
    pub fn with_id(
        uuid: InstrumentId,
        name: impl Into<String>,
        owner: impl Into<String>,
    ) -> Result<Self, ModelValidationError> {
        let instrument = Self {
            uuid,
            name: name.into().trim().to_string(),
            owner: owner.into().trim().to_string(),
        };
        instrument.validate()?;
        Ok(instrument)
    }

    /// Checks text field constraints.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ModelValidationError::EmptyName);
        }
        let actual_chars = name.chars().count();
        if actual_chars > INSTRUMENT_NAME_MAX_CHARS {
            return Err(ModelValidationError::NameTooLong {
                max_chars: INSTRUMENT_NAME_MAX_CHARS,
                actual_chars,
            });
        }
        if self.owner.trim().is_empty() {
            return Err(ModelValidationError::EmptyOwner);
        }
        Ok(())
    }
}
