//! Component record: a typed piece of rubric content.

use super::instrument::InstrumentId;
use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a component.
pub type ComponentId = Uuid;

/// Component category. Only the first five types take part in the principle
/// weight formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    #[serde(rename = "Objetivos")]
    Objectives,
    #[serde(rename = "Reglas")]
    Rules,
    #[serde(rename = "Roles")]
    Roles,
    #[serde(rename = "Materiales")]
    Materials,
    #[serde(rename = "Pasos")]
    Steps,
    #[serde(rename = "Recompensas")]
    Rewards,
    #[serde(rename = "Evaluacion")]
    Assessment,
    #[serde(rename = "Otros")]
    Other,
}

impl ComponentType {
    pub const ALL: [Self; 8] = [
        Self::Objectives,
        Self::Rules,
        Self::Roles,
        Self::Materials,
        Self::Steps,
        Self::Rewards,
        Self::Assessment,
        Self::Other,
    ];

    /// Persisted label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Objectives => "Objetivos",
            Self::Rules => "Reglas",
            Self::Roles => "Roles",
            Self::Materials => "Materiales",
            Self::Steps => "Pasos",
            Self::Rewards => "Recompensas",
            Self::Assessment => "Evaluacion",
            Self::Other => "Otros",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|component_type| component_type.label() == value)
    }
}

/// Piece of rubric content belonging to one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub uuid: ComponentId,
    pub instrument_uuid: InstrumentId,
    pub description: String,
    pub component_type: ComponentType,
}

impl Component {
    /// Creates a component with a generated stable ID.
    pub fn new(
        instrument_uuid: InstrumentId,
        component_type: ComponentType,
        description: impl Into<String>,
    ) -> Result<Self, ModelValidationError> {
        let component = Self {
            uuid: Uuid::new_v4(),
            instrument_uuid,
            description: description.into(),
            component_type,
        };
        component.validate()?;
        Ok(component)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.description.trim().is_empty() {
            return Err(ModelValidationError::EmptyDescription);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Component, ComponentType};
    use crate::model::ModelValidationError;
    use uuid::Uuid;

    #[test]
    fn labels_roundtrip_for_every_variant() {
        for component_type in ComponentType::ALL {
            assert_eq!(
                ComponentType::from_label(component_type.label()),
                Some(component_type)
            );
        }
    }

    #[test]
    fn blank_description_is_rejected() {
        let err = Component::new(Uuid::new_v4(), ComponentType::Rules, "\n ").unwrap_err();
        assert_eq!(err, ModelValidationError::EmptyDescription);
    }
}
