//! Scoring engine over the rubric store.
//!
//! Weight of a principle `P` in instrument `I`:
//!
//! ```text
//! tlg = 40 * x / n   (x: Objetivos evidence across I, n: Objetivos evidence of P; 0 if n == 0)
//! tru = 30 * y / m   (y: Reglas evidence across I,    m: Reglas evidence of P;    0 if m == 0)
//! r   = 10 if P has Roles evidence
//! s   =  5 if P has Pasos evidence
//! mat =  5 if P has Materiales evidence
//! weight = (r + s + mat + tru + tlg) * multiplier(P.grade)
//! ```
//!
//! "Across I" counts evidence whose component belongs to `I`, whatever
//! principle it is linked to. Instrument level is the sum of its principle
//! weights divided by [`LEVEL_DIVISOR`].

use crate::model::component::ComponentType;
use crate::model::instrument::{Instrument, InstrumentId};
use crate::model::principle::Principle;
use crate::repo::evidence_repo::{EvidenceFilter, EvidenceRepository};
use crate::repo::instrument_repo::InstrumentRepository;
use crate::repo::principle_repo::PrincipleRepository;
use crate::repo::rubric_repo::{EntityKind, RepoError, RepoResult};
use crate::scoring::grade::GradeTable;
use log::debug;
use serde::Serialize;

const OBJECTIVES_FACTOR: f64 = 40.0;
const RULES_FACTOR: f64 = 30.0;
const ROLES_BONUS: f64 = 10.0;
const STEPS_BONUS: f64 = 5.0;
const MATERIALS_BONUS: f64 = 5.0;

/// Divisor normalizing the summed principle weights into an instrument level.
pub const LEVEL_DIVISOR: f64 = 50.0;

/// Store capabilities the engine reads from.
pub trait ScoringStore: InstrumentRepository + PrincipleRepository + EvidenceRepository {}

impl<T> ScoringStore for T where T: InstrumentRepository + PrincipleRepository + EvidenceRepository {}

/// Evidence counts feeding one principle weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvidenceCounts {
    /// `x`: Objetivos evidence across the instrument.
    pub instrument_objectives: u64,
    /// `n`: Objetivos evidence of the principle.
    pub principle_objectives: u64,
    /// `y`: Reglas evidence across the instrument.
    pub instrument_rules: u64,
    /// `m`: Reglas evidence of the principle.
    pub principle_rules: u64,
    pub principle_roles: u64,
    pub principle_materials: u64,
    pub principle_steps: u64,
}

/// Breakdown of one principle weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrincipleScore {
    pub objectives: f64,
    pub rules: f64,
    pub roles: f64,
    pub materials: f64,
    pub steps: f64,
    /// Sum of the five sub-scores.
    pub raw: f64,
    pub multiplier: f64,
    pub weight: f64,
}

/// Principle paired with its score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPrinciple {
    pub principle: Principle,
    pub score: PrincipleScore,
}

/// Full scoring view of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentReport {
    pub instrument: Instrument,
    pub level: f64,
    /// Same order as `PrincipleRepository::list_principles`.
    pub principles: Vec<ScoredPrinciple>,
}

/// Applies the weight formula to already-collected counts.
pub fn score_counts(counts: &EvidenceCounts, multiplier: f64) -> PrincipleScore {
    let objectives = ratio_score(
        OBJECTIVES_FACTOR,
        counts.instrument_objectives,
        counts.principle_objectives,
    );
    let rules = ratio_score(RULES_FACTOR, counts.instrument_rules, counts.principle_rules);
    let roles = presence_bonus(ROLES_BONUS, counts.principle_roles);
    let materials = presence_bonus(MATERIALS_BONUS, counts.principle_materials);
    let steps = presence_bonus(STEPS_BONUS, counts.principle_steps);
    let raw = roles + steps + materials + rules + objectives;

    PrincipleScore {
        objectives,
        rules,
        roles,
        materials,
        steps,
        raw,
        multiplier,
        weight: raw * multiplier,
    }
}

/// Sums principle weights and normalizes by [`LEVEL_DIVISOR`].
pub fn level_from_weights(weights: impl IntoIterator<Item = f64>) -> f64 {
    weights.into_iter().sum::<f64>() / LEVEL_DIVISOR
}

fn ratio_score(factor: f64, numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    factor * numerator as f64 / denominator as f64
}

fn presence_bonus(points: f64, count: u64) -> f64 {
    if count > 0 {
        points
    } else {
        0.0
    }
}

/// Computes derived scores from live store state.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    grades: GradeTable,
}

impl ScoringEngine {
    pub fn new(grades: GradeTable) -> Self {
        Self { grades }
    }

    pub fn grades(&self) -> &GradeTable {
        &self.grades
    }

    /// Runs the seven counting queries for `principle`.
    pub fn evidence_counts<S>(&self, store: &S, principle: &Principle) -> RepoResult<EvidenceCounts>
    where
        S: EvidenceRepository + ?Sized,
    {
        let instrument = principle.instrument_uuid;
        let own = |component_type| {
            store.count_evidence(&EvidenceFilter::for_principle(principle.uuid, component_type))
        };
        let across = |component_type| {
            store.count_evidence(&EvidenceFilter::for_instrument(instrument, component_type))
        };

        Ok(EvidenceCounts {
            instrument_objectives: across(ComponentType::Objectives)?,
            principle_objectives: own(ComponentType::Objectives)?,
            instrument_rules: across(ComponentType::Rules)?,
            principle_rules: own(ComponentType::Rules)?,
            principle_roles: own(ComponentType::Roles)?,
            principle_materials: own(ComponentType::Materials)?,
            principle_steps: own(ComponentType::Steps)?,
        })
    }

    /// Weight breakdown for one principle.
    ///
    /// Uses `principle` as given: its grade is not re-read and a principle
    /// missing from the store scores `0` instead of failing. Callers holding
    /// only an id should go through `RubricService::principle_score`.
    pub fn principle_score<S>(&self, store: &S, principle: &Principle) -> RepoResult<PrincipleScore>
    where
        S: EvidenceRepository + ?Sized,
    {
        let counts = self.evidence_counts(store, principle)?;
        let score = score_counts(&counts, self.grades.multiplier(principle.grade));
        debug!(
            "event=principle_weight module=scoring status=ok principle={} grade={} raw={} weight={}",
            principle.uuid,
            principle.grade.label(),
            score.raw,
            score.weight
        );
        Ok(score)
    }

    /// Final weight of `principle`, with the same staleness caveat as
    /// [`ScoringEngine::principle_score`].
    pub fn principle_weight<S>(&self, store: &S, principle: &Principle) -> RepoResult<f64>
    where
        S: EvidenceRepository + ?Sized,
    {
        Ok(self.principle_score(store, principle)?.weight)
    }

    /// Aggregate level of an instrument; `0` when it has no principles.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when the instrument does not exist.
    pub fn instrument_level<S>(&self, store: &S, instrument: InstrumentId) -> RepoResult<f64>
    where
        S: ScoringStore + ?Sized,
    {
        Ok(self.instrument_report(store, instrument)?.level)
    }

    /// Scores every principle of an instrument and its level.
    pub fn instrument_report<S>(
        &self,
        store: &S,
        instrument: InstrumentId,
    ) -> RepoResult<InstrumentReport>
    where
        S: ScoringStore + ?Sized,
    {
        let record = store
            .get_instrument(instrument)?
            .ok_or(RepoError::NotFound {
                kind: EntityKind::Instrument,
                id: instrument,
            })?;

        let mut principles = Vec::new();
        for principle in store.list_principles(instrument)? {
            let score = self.principle_score(store, &principle)?;
            principles.push(ScoredPrinciple { principle, score });
        }
        let level = level_from_weights(principles.iter().map(|item| item.score.weight));

        debug!(
            "event=instrument_level module=scoring status=ok instrument={} principles={} level={}",
            instrument,
            principles.len(),
            level
        );
        Ok(InstrumentReport {
            instrument: record,
            level,
            principles,
        })
    }
}
