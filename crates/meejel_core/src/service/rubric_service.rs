//! Rubric use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for building, editing and scoring
//!   instruments.
//! - Delegate persistence to repository implementations and scoring to
//!   [`ScoringEngine`].
//!
//! # Invariants
//! - Store errors (not found, constraint violations) are returned unchanged.
//! - Scores are recomputed on every call.

use crate::model::component::{Component, ComponentId, ComponentType};
use crate::model::evidence::{Evidence, EvidenceId};
use crate::model::instrument::{Instrument, InstrumentId};
use crate::model::principle::{Grade, Principle, PrincipleCategory, PrincipleId};
use crate::repo::component_repo::ComponentRepository;
use crate::repo::instrument_repo::CascadeSummary;
use crate::repo::rubric_repo::{EntityKind, RepoError, RepoResult};
use crate::scoring::{InstrumentReport, PrincipleScore, ScoringEngine, ScoringStore};
use log::info;

/// Store capabilities required by [`RubricService`].
pub trait RubricStore: ScoringStore + ComponentRepository {}

impl<T> RubricStore for T where T: ScoringStore + ComponentRepository {}

/// Use-case facade over a rubric store and a scoring engine.
pub struct RubricService<R: RubricStore> {
    repo: R,
    engine: ScoringEngine,
}

impl<R: RubricStore> RubricService<R> {
    pub fn new(repo: R, engine: ScoringEngine) -> Self {
        Self { repo, engine }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Creates an instrument for `owner`.
    ///
    /// # Errors
    /// - `RepoError::Validation` for blank/oversized names or blank owner.
    /// - `RepoError::ConstraintViolation` when the owner already has this name.
    pub fn create_instrument(
        &self,
        name: impl Into<String>,
        owner: impl Into<String>,
    ) -> RepoResult<Instrument> {
        let instrument = Instrument::new(name, owner)?;
        self.repo.create_instrument(&instrument)?;
        info!(
            "event=instrument_create module=service status=ok instrument={}",
            instrument.uuid
        );
        Ok(instrument)
    }

    pub fn rename_instrument(
        &self,
        id: InstrumentId,
        name: impl Into<String>,
    ) -> RepoResult<Instrument> {
        let current = self.require_instrument(id)?;
        let instrument = Instrument::with_id(current.uuid, name, current.owner)?;
        self.repo.update_instrument(&instrument)?;
        Ok(instrument)
    }

    pub fn get_instrument(&self, id: InstrumentId) -> RepoResult<Option<Instrument>> {
        self.repo.get_instrument(id)
    }

    pub fn list_instruments(&self, owner: Option<&str>) -> RepoResult<Vec<Instrument>> {
        self.repo.list_instruments(owner)
    }

    /// Deletes an instrument with all its principles, components and evidence.
    pub fn delete_instrument(&self, id: InstrumentId) -> RepoResult<CascadeSummary> {
        self.repo.delete_instrument(id)
    }

    pub fn add_principle(
        &self,
        instrument: InstrumentId,
        category: PrincipleCategory,
        grade: Grade,
    ) -> RepoResult<Principle> {
        let principle = Principle::new(instrument, category, grade);
        self.repo.create_principle(&principle)?;
        info!(
            "event=principle_create module=service status=ok instrument={} category={} grade={}",
            instrument,
            category.label(),
            grade.label()
        );
        Ok(principle)
    }

    pub fn regrade_principle(&self, id: PrincipleId, grade: Grade) -> RepoResult<Principle> {
        let mut principle = self.require_principle(id)?;
        principle.grade = grade;
        self.repo.update_principle(&principle)?;
        Ok(principle)
    }

    pub fn list_principles(&self, instrument: InstrumentId) -> RepoResult<Vec<Principle>> {
        self.repo.list_principles(instrument)
    }

    pub fn remove_principle(&self, id: PrincipleId) -> RepoResult<()> {
        self.repo.delete_principle(id)
    }

    pub fn add_component(
        &self,
        instrument: InstrumentId,
        component_type: ComponentType,
        description: impl Into<String>,
    ) -> RepoResult<Component> {
        let component = Component::new(instrument, component_type, description)?;
        self.repo.create_component(&component)?;
        info!(
            "event=component_create module=service status=ok instrument={} component_type={}",
            instrument,
            component_type.label()
        );
        Ok(component)
    }

    /// Replaces description and type of a component.
    pub fn update_component(
        &self,
        id: ComponentId,
        component_type: ComponentType,
        description: impl Into<String>,
    ) -> RepoResult<Component> {
        let mut component = self
            .repo
            .get_component(id)?
            .ok_or(RepoError::NotFound {
                kind: EntityKind::Component,
                id,
            })?;
        component.component_type = component_type;
        component.description = description.into();
        self.repo.update_component(&component)?;
        Ok(component)
    }

    pub fn list_components(
        &self,
        instrument: InstrumentId,
        component_type: Option<ComponentType>,
    ) -> RepoResult<Vec<Component>> {
        self.repo.list_components(instrument, component_type)
    }

    pub fn remove_component(&self, id: ComponentId) -> RepoResult<()> {
        self.repo.delete_component(id)
    }

    /// Records that `component` evidences `principle`.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when either side does not exist.
    /// - `RepoError::ConstraintViolation` when the pair is already linked.
    /// - `RepoError::InstrumentMismatch` under the same-instrument policy.
    pub fn link_evidence(
        &self,
        principle: PrincipleId,
        component: ComponentId,
    ) -> RepoResult<Evidence> {
        let evidence = Evidence::new(principle, component);
        self.repo.create_evidence(&evidence)?;
        info!(
            "event=evidence_link module=service status=ok principle={} component={}",
            principle, component
        );
        Ok(evidence)
    }

    pub fn list_evidence(&self, principle: PrincipleId) -> RepoResult<Vec<Evidence>> {
        self.repo.list_evidence(principle)
    }

    pub fn unlink_evidence(&self, id: EvidenceId) -> RepoResult<()> {
        self.repo.delete_evidence(id)
    }

    pub fn principle_weight(&self, id: PrincipleId) -> RepoResult<f64> {
        let principle = self.require_principle(id)?;
        self.engine.principle_weight(&self.repo, &principle)
    }

    pub fn principle_score(&self, id: PrincipleId) -> RepoResult<PrincipleScore> {
        let principle = self.require_principle(id)?;
        self.engine.principle_score(&self.repo, &principle)
    }

    pub fn instrument_level(&self, id: InstrumentId) -> RepoResult<f64> {
        self.engine.instrument_level(&self.repo, id)
    }

    pub fn instrument_report(&self, id: InstrumentId) -> RepoResult<InstrumentReport> {
        self.engine.instrument_report(&self.repo, id)
    }

    fn require_instrument(&self, id: InstrumentId) -> RepoResult<Instrument> {
        self.repo.get_instrument(id)?.ok_or(RepoError::NotFound {
            kind: EntityKind::Instrument,
            id,
        })
    }

    fn require_principle(&self, id: PrincipleId) -> RepoResult<Principle> {
        self.repo.get_principle(id)?.ok_or(RepoError::NotFound {
            kind: EntityKind::Principle,
            id,
        })
    }
}
