//! Principle record and its closed choice sets.
//!
//! # Invariants
//! - A principle belongs to exactly one instrument.
//! - `(instrument_uuid, category)` is unique in storage.
//! - `weight` is derived by the scoring engine and never stored here.

use super::instrument::InstrumentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a principle.
pub type PrincipleId = Uuid;

/// Scorable dimension of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrincipleCategory {
    #[serde(rename = "Motivacion")]
    Motivation,
    #[serde(rename = "Retroalimentacion")]
    Feedback,
    #[serde(rename = "Colaboracion")]
    Collaboration,
    #[serde(rename = "Reto")]
    Challenge,
    #[serde(rename = "Autonomia")]
    Autonomy,
    #[serde(rename = "Progresion")]
    Progression,
}

impl PrincipleCategory {
    pub const ALL: [Self; 6] = [
        Self::Motivation,
        Self::Feedback,
        Self::Collaboration,
        Self::Challenge,
        Self::Autonomy,
        Self::Progression,
    ];

    /// Persisted label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Motivation => "Motivacion",
            Self::Feedback => "Retroalimentacion",
            Self::Collaboration => "Colaboracion",
            Self::Challenge => "Reto",
            Self::Autonomy => "Autonomia",
            Self::Progression => "Progresion",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == value)
    }
}

/// Achievement level of a principle. Each grade maps to a multiplier through
/// [`crate::scoring::GradeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "Bajo")]
    Low,
    #[serde(rename = "Medio")]
    Medium,
    #[serde(rename = "Alto")]
    High,
}

impl Grade {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Persisted label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Bajo",
            Self::Medium => "Medio",
            Self::High => "Alto",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|grade| grade.label() == value)
    }
}

/// Principle composing an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principle {
    pub uuid: PrincipleId,
    pub instrument_uuid: InstrumentId,
    pub category: PrincipleCategory,
    pub grade: Grade,
}

impl Principle {
    /// Creates a principle with a generated stable ID.
    pub fn new(instrument_uuid: InstrumentId, category: PrincipleCategory, grade: Grade) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            instrument_uuid,
            category,
            grade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Grade, PrincipleCategory};

    #[test]
    fn labels_roundtrip_for_every_variant() {
        for category in PrincipleCategory::ALL {
            assert_eq!(PrincipleCategory::from_label(category.label()), Some(category));
        }
        for grade in Grade::ALL {
            assert_eq!(Grade::from_label(grade.label()), Some(grade));
        }
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert_eq!(Grade::from_label("alto"), None);
        assert_eq!(PrincipleCategory::from_label(""), None);
    }

    #[test]
    fn serde_uses_persisted_labels() {
        let json = serde_json::to_string(&Grade::Medium).unwrap();
        assert_eq!(json, "\"Medio\"");
        let parsed: PrincipleCategory = serde_json::from_str("\"Retroalimentacion\"").unwrap();
        assert_eq!(parsed, PrincipleCategory::Feedback);
    }
}
