//! Evidence record: links one principle to one component.
//!
//! # Invariants
//! - `(principle_uuid, component_uuid)` is unique in storage.
//! - Deleted together with either parent.

use super::component::ComponentId;
use super::principle::PrincipleId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an evidence link.
pub type EvidenceId = Uuid;

/// Assertion that a component supports a principle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub uuid: EvidenceId,
    pub principle_uuid: PrincipleId,
    pub component_uuid: ComponentId,
}

impl Evidence {
    pub fn new(principle_uuid: PrincipleId, component_uuid: ComponentId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            principle_uuid,
            component_uuid,
        }
    }
}
