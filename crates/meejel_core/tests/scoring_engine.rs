use meejel_core::db::open_db_in_memory;
use meejel_core::{
    ComponentType, EntityKind, Grade, GradeTable, Instrument, PrincipleCategory, RepoError,
    RubricService, ScoringEngine, SqliteRubricRepository, UniqueConstraint, LEVEL_DIVISOR,
};
use rusqlite::Connection;

const LOW: f64 = 1.5;
const MEDIUM: f64 = 2.0;
const HIGH: f64 = 4.0;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> RubricService<SqliteRubricRepository<'_>> {
    let repo = SqliteRubricRepository::try_new(conn).unwrap();
    let engine = ScoringEngine::new(GradeTable::new(LOW, MEDIUM, HIGH).unwrap());
    RubricService::new(repo, engine)
}

fn instrument(service: &RubricService<SqliteRubricRepository<'_>>) -> Instrument {
    service.create_instrument("Rubrica", "ana").unwrap()
}

#[test]
fn principle_without_evidence_weighs_zero() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let principle = service
        .add_principle(instrument.uuid, PrincipleCategory::Motivation, Grade::High)
        .unwrap();

    // Components alone do not count; only evidence does.
    service
        .add_component(instrument.uuid, ComponentType::Objectives, "Meta")
        .unwrap();

    assert_eq!(service.principle_weight(principle.uuid).unwrap(), 0.0);
    assert_eq!(service.instrument_level(instrument.uuid).unwrap(), 0.0);
}

#[test]
fn instrument_without_principles_has_level_zero() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);

    assert_eq!(service.instrument_level(instrument.uuid).unwrap(), 0.0);
    assert!(service
        .instrument_report(instrument.uuid)
        .unwrap()
        .principles
        .is_empty());
}

#[test]
fn single_objectives_evidence_scores_forty_times_grade() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let principle = service
        .add_principle(instrument.uuid, PrincipleCategory::Feedback, Grade::Medium)
        .unwrap();
    let objectives = service
        .add_component(instrument.uuid, ComponentType::Objectives, "Meta")
        .unwrap();
    service
        .link_evidence(principle.uuid, objectives.uuid)
        .unwrap();

    let score = service.principle_score(principle.uuid).unwrap();
    assert_eq!(score.objectives, 40.0);
    assert_eq!(score.rules, 0.0);
    assert_eq!(score.roles + score.materials + score.steps, 0.0);
    assert_eq!(score.weight, 40.0 * MEDIUM);
    assert_eq!(
        service.instrument_level(instrument.uuid).unwrap(),
        40.0 * MEDIUM / LEVEL_DIVISOR
    );
}

#[test]
fn roles_materials_and_steps_score_fixed_bonuses() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let principle = service
        .add_principle(instrument.uuid, PrincipleCategory::Autonomy, Grade::Low)
        .unwrap();
    for (component_type, description) in [
        (ComponentType::Roles, "Juez"),
        (ComponentType::Materials, "Dados"),
        (ComponentType::Steps, "Lanzar"),
    ] {
        let component = service
            .add_component(instrument.uuid, component_type, description)
            .unwrap();
        service.link_evidence(principle.uuid, component.uuid).unwrap();
    }

    let score = service.principle_score(principle.uuid).unwrap();
    assert_eq!(score.roles, 10.0);
    assert_eq!(score.materials, 5.0);
    assert_eq!(score.steps, 5.0);
    assert_eq!(score.raw, 20.0);
    assert_eq!(score.weight, 20.0 * LOW);

    // A second Roles evidence does not raise the capped bonus.
    let extra_role = service
        .add_component(instrument.uuid, ComponentType::Roles, "Narrador")
        .unwrap();
    service
        .link_evidence(principle.uuid, extra_role.uuid)
        .unwrap();
    assert_eq!(service.principle_weight(principle.uuid).unwrap(), 20.0 * LOW);
}

#[test]
fn ratio_terms_use_instrument_wide_counts() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let focus = service
        .add_principle(instrument.uuid, PrincipleCategory::Challenge, Grade::High)
        .unwrap();
    let other = service
        .add_principle(instrument.uuid, PrincipleCategory::Progression, Grade::Low)
        .unwrap();

    let objective_a = service
        .add_component(instrument.uuid, ComponentType::Objectives, "A")
        .unwrap();
    let objective_b = service
        .add_component(instrument.uuid, ComponentType::Objectives, "B")
        .unwrap();
    let rule = service
        .add_component(instrument.uuid, ComponentType::Rules, "R")
        .unwrap();
    let unscored = service
        .add_component(instrument.uuid, ComponentType::Rewards, "Medalla")
        .unwrap();

    // focus: one Objetivos, one Reglas; other: two Objetivos, one Reglas.
    service.link_evidence(focus.uuid, objective_a.uuid).unwrap();
    service.link_evidence(focus.uuid, rule.uuid).unwrap();
    service.link_evidence(focus.uuid, unscored.uuid).unwrap();
    service.link_evidence(other.uuid, objective_a.uuid).unwrap();
    service.link_evidence(other.uuid, objective_b.uuid).unwrap();
    service.link_evidence(other.uuid, rule.uuid).unwrap();

    // x = 3, n = 1 -> 120; y = 2, m = 1 -> 60.
    let focus_score = service.principle_score(focus.uuid).unwrap();
    assert_eq!(focus_score.objectives, 120.0);
    assert_eq!(focus_score.rules, 60.0);
    assert_eq!(focus_score.weight, 180.0 * HIGH);

    // x = 3, n = 2 -> 60; y = 2, m = 1 -> 60.
    let other_score = service.principle_score(other.uuid).unwrap();
    assert_eq!(other_score.objectives, 60.0);
    assert_eq!(other_score.rules, 60.0);
    assert_eq!(other_score.weight, 120.0 * LOW);

    let report = service.instrument_report(instrument.uuid).unwrap();
    assert_eq!(report.principles.len(), 2);
    assert_eq!(
        report.level,
        (180.0 * HIGH + 120.0 * LOW) / LEVEL_DIVISOR
    );
    assert_eq!(service.instrument_level(instrument.uuid).unwrap(), report.level);
}

#[test]
fn evidence_on_sibling_principle_raises_weight() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let focus = service
        .add_principle(instrument.uuid, PrincipleCategory::Motivation, Grade::Medium)
        .unwrap();
    let sibling = service
        .add_principle(instrument.uuid, PrincipleCategory::Feedback, Grade::Medium)
        .unwrap();
    let objective = service
        .add_component(instrument.uuid, ComponentType::Objectives, "Meta")
        .unwrap();
    service.link_evidence(focus.uuid, objective.uuid).unwrap();

    let before = service.principle_weight(focus.uuid).unwrap();
    service.link_evidence(sibling.uuid, objective.uuid).unwrap();
    let after = service.principle_weight(focus.uuid).unwrap();

    assert!(after > before);
    assert_eq!(after, 80.0 * MEDIUM);
}

#[test]
fn own_objectives_evidence_can_lower_weight() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let focus = service
        .add_principle(instrument.uuid, PrincipleCategory::Motivation, Grade::Medium)
        .unwrap();
    let sibling = service
        .add_principle(instrument.uuid, PrincipleCategory::Feedback, Grade::Low)
        .unwrap();
    let first = service
        .add_component(instrument.uuid, ComponentType::Objectives, "A")
        .unwrap();
    let second = service
        .add_component(instrument.uuid, ComponentType::Objectives, "B")
        .unwrap();
    service.link_evidence(focus.uuid, first.uuid).unwrap();
    service.link_evidence(sibling.uuid, first.uuid).unwrap();

    // x = 2, n = 1 -> 80.
    let before = service.principle_score(focus.uuid).unwrap();
    assert_eq!(before.objectives, 80.0);

    // x = 3, n = 2 -> 60: the ratio term is not monotonic in own evidence.
    service.link_evidence(focus.uuid, second.uuid).unwrap();
    let after = service.principle_score(focus.uuid).unwrap();
    assert_eq!(after.objectives, 60.0);
    assert!(after.weight < before.weight);
    assert_eq!(after.weight, 60.0 * MEDIUM);
}

#[test]
fn regrading_principle_rescales_weight() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let principle = service
        .add_principle(instrument.uuid, PrincipleCategory::Collaboration, Grade::Low)
        .unwrap();
    let roles = service
        .add_component(instrument.uuid, ComponentType::Roles, "Equipo")
        .unwrap();
    service.link_evidence(principle.uuid, roles.uuid).unwrap();
    assert_eq!(service.principle_weight(principle.uuid).unwrap(), 10.0 * LOW);

    service.regrade_principle(principle.uuid, Grade::High).unwrap();
    assert_eq!(service.principle_weight(principle.uuid).unwrap(), 10.0 * HIGH);
}

#[test]
fn deleted_instrument_level_is_not_found() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let principle = service
        .add_principle(instrument.uuid, PrincipleCategory::Motivation, Grade::High)
        .unwrap();
    let objective = service
        .add_component(instrument.uuid, ComponentType::Objectives, "Meta")
        .unwrap();
    service.link_evidence(principle.uuid, objective.uuid).unwrap();

    service.delete_instrument(instrument.uuid).unwrap();

    let err = service.instrument_level(instrument.uuid).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: EntityKind::Instrument, id } if id == instrument.uuid
    ));
    let err = service.principle_weight(principle.uuid).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Principle,
            ..
        }
    ));
}

#[test]
fn engine_scores_a_held_principle_without_rereading_it() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let principle = service
        .add_principle(instrument.uuid, PrincipleCategory::Autonomy, Grade::High)
        .unwrap();
    let roles = service
        .add_component(instrument.uuid, ComponentType::Roles, "Guia")
        .unwrap();
    service.link_evidence(principle.uuid, roles.uuid).unwrap();

    service.remove_principle(principle.uuid).unwrap();

    // The engine trusts the record it is handed; the service checks the store.
    let stale = service
        .engine()
        .principle_score(service.repo(), &principle)
        .unwrap();
    assert_eq!(stale.raw, 0.0);
    assert_eq!(stale.multiplier, HIGH);
    assert!(service.principle_score(principle.uuid).unwrap_err().is_not_found());
}

#[test]
fn service_propagates_constraint_violations_unchanged() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let principle = service
        .add_principle(instrument.uuid, PrincipleCategory::Challenge, Grade::High)
        .unwrap();
    let component = service
        .add_component(instrument.uuid, ComponentType::Steps, "Inicio")
        .unwrap();
    service.link_evidence(principle.uuid, component.uuid).unwrap();

    let err = service
        .link_evidence(principle.uuid, component.uuid)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation(UniqueConstraint::EvidencePair)
    ));

    let err = service.create_instrument("Rubrica", "ana").unwrap_err();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation(UniqueConstraint::InstrumentNamePerOwner)
    ));
}

#[test]
fn unlinking_evidence_lowers_weight_back() {
    let conn = setup();
    let service = service(&conn);
    let instrument = instrument(&service);
    let principle = service
        .add_principle(instrument.uuid, PrincipleCategory::Progression, Grade::Medium)
        .unwrap();
    let steps = service
        .add_component(instrument.uuid, ComponentType::Steps, "Avanzar")
        .unwrap();
    let evidence = service.link_evidence(principle.uuid, steps.uuid).unwrap();
    assert_eq!(service.principle_weight(principle.uuid).unwrap(), 5.0 * MEDIUM);

    service.unlink_evidence(evidence.uuid).unwrap();
    assert_eq!(service.principle_weight(principle.uuid).unwrap(), 0.0);
    assert!(service.list_evidence(principle.uuid).unwrap().is_empty());
}
