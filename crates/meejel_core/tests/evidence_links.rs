use meejel_core::db::open_db_in_memory;
use meejel_core::{
    Component, ComponentRepository, ComponentType, EntityKind, Evidence, EvidenceFilter,
    EvidencePolicy, EvidenceRepository, Grade, Instrument, InstrumentRepository, Principle,
    PrincipleCategory, PrincipleRepository, RepoError, SqliteRubricRepository, UniqueConstraint,
};
use rusqlite::Connection;
use uuid::Uuid;

struct Fixture {
    instrument: Instrument,
    principle: Principle,
    component: Component,
}

fn seed(repo: &SqliteRubricRepository<'_>, name: &str) -> Fixture {
    let instrument = Instrument::new(name, "ana").unwrap();
    repo.create_instrument(&instrument).unwrap();
    let principle = Principle::new(instrument.uuid, PrincipleCategory::Challenge, Grade::Medium);
    repo.create_principle(&principle).unwrap();
    let component = Component::new(instrument.uuid, ComponentType::Objectives, "Ganar").unwrap();
    repo.create_component(&component).unwrap();
    Fixture {
        instrument,
        principle,
        component,
    }
}

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

#[test]
fn duplicate_evidence_pair_is_a_constraint_violation() {
    let conn = setup();
    let repo = SqliteRubricRepository::try_new(&conn).unwrap();
    let fx = seed(&repo, "Rubrica");

    repo.create_evidence(&Evidence::new(fx.principle.uuid, fx.component.uuid))
        .unwrap();
    let err = repo
        .create_evidence(&Evidence::new(fx.principle.uuid, fx.component.uuid))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation(UniqueConstraint::EvidencePair)
    ));
    assert_eq!(repo.list_evidence(fx.principle.uuid).unwrap().len(), 1);
}

#[test]
fn evidence_requires_existing_parents() {
    let conn = setup();
    let repo = SqliteRubricRepository::try_new(&conn).unwrap();
    let fx = seed(&repo, "Rubrica");

    let missing_principle = Uuid::new_v4();
    let err = repo
        .create_evidence(&Evidence::new(missing_principle, fx.component.uuid))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: EntityKind::Principle, id } if id == missing_principle
    ));

    let missing_component = Uuid::new_v4();
    let err = repo
        .create_evidence(&Evidence::new(fx.principle.uuid, missing_component))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: EntityKind::Component, id } if id == missing_component
    ));
}

#[test]
fn permissive_policy_allows_cross_instrument_links() {
    let conn = setup();
    let repo = SqliteRubricRepository::try_new(&conn).unwrap();
    assert_eq!(repo.evidence_policy(), EvidencePolicy::Permissive);
    let first = seed(&repo, "Primera");
    let second = seed(&repo, "Segunda");

    repo.create_evidence(&Evidence::new(first.principle.uuid, second.component.uuid))
        .unwrap();

    // Counted against the component's instrument, not the principle's.
    let across_second = repo
        .count_evidence(&EvidenceFilter::for_instrument(
            second.instrument.uuid,
            ComponentType::Objectives,
        ))
        .unwrap();
    let across_first = repo
        .count_evidence(&EvidenceFilter::for_instrument(
            first.instrument.uuid,
            ComponentType::Objectives,
        ))
        .unwrap();
    assert_eq!(across_second, 1);
    assert_eq!(across_first, 0);
}

#[test]
fn same_instrument_policy_rejects_cross_instrument_links() {
    let conn = setup();
    let repo = SqliteRubricRepository::try_new(&conn)
        .unwrap()
        .with_evidence_policy(EvidencePolicy::SameInstrument);
    let first = seed(&repo, "Primera");
    let second = seed(&repo, "Segunda");

    let err = repo
        .create_evidence(&Evidence::new(first.principle.uuid, second.component.uuid))
        .unwrap_err();
    match err {
        RepoError::InstrumentMismatch {
            principle_instrument,
            component_instrument,
        } => {
            assert_eq!(principle_instrument, first.instrument.uuid);
            assert_eq!(component_instrument, second.instrument.uuid);
        }
        other => panic!("unexpected error: {other}"),
    }

    repo.create_evidence(&Evidence::new(first.principle.uuid, first.component.uuid))
        .unwrap();
}

#[test]
fn count_evidence_applies_every_set_filter() {
    let conn = setup();
    let repo = SqliteRubricRepository::try_new(&conn).unwrap();
    let fx = seed(&repo, "Rubrica");

    let other_principle = Principle::new(
        fx.instrument.uuid,
        PrincipleCategory::Collaboration,
        Grade::Low,
    );
    repo.create_principle(&other_principle).unwrap();
    let rules = Component::new(fx.instrument.uuid, ComponentType::Rules, "Sin trampas").unwrap();
    repo.create_component(&rules).unwrap();

    repo.create_evidence(&Evidence::new(fx.principle.uuid, fx.component.uuid))
        .unwrap();
    repo.create_evidence(&Evidence::new(fx.principle.uuid, rules.uuid))
        .unwrap();
    repo.create_evidence(&Evidence::new(other_principle.uuid, fx.component.uuid))
        .unwrap();

    assert_eq!(repo.count_evidence(&EvidenceFilter::default()).unwrap(), 3);
    assert_eq!(
        repo.count_evidence(&EvidenceFilter::for_principle(
            fx.principle.uuid,
            ComponentType::Objectives
        ))
        .unwrap(),
        1
    );
    assert_eq!(
        repo.count_evidence(&EvidenceFilter::for_instrument(
            fx.instrument.uuid,
            ComponentType::Objectives
        ))
        .unwrap(),
        2
    );
    assert_eq!(
        repo.count_evidence(&EvidenceFilter {
            principle: Some(fx.principle.uuid),
            ..EvidenceFilter::default()
        })
        .unwrap(),
        2
    );
}

#[test]
fn deleting_component_or_principle_removes_its_evidence() {
    let conn = setup();
    let repo = SqliteRubricRepository::try_new(&conn).unwrap();
    let fx = seed(&repo, "Rubrica");
    let roles = Component::new(fx.instrument.uuid, ComponentType::Roles, "Narrador").unwrap();
    repo.create_component(&roles).unwrap();

    let via_component = Evidence::new(fx.principle.uuid, fx.component.uuid);
    repo.create_evidence(&via_component).unwrap();
    repo.create_evidence(&Evidence::new(fx.principle.uuid, roles.uuid))
        .unwrap();

    repo.delete_component(fx.component.uuid).unwrap();
    assert!(repo.get_evidence(via_component.uuid).unwrap().is_none());
    assert_eq!(repo.list_evidence(fx.principle.uuid).unwrap().len(), 1);

    repo.delete_principle(fx.principle.uuid).unwrap();
    assert_eq!(repo.count_evidence(&EvidenceFilter::default()).unwrap(), 0);
    assert!(repo.get_component(roles.uuid).unwrap().is_some());
}

#[test]
fn deleting_missing_evidence_returns_not_found() {
    let conn = setup();
    let repo = SqliteRubricRepository::try_new(&conn).unwrap();

    let err = repo.delete_evidence(Uuid::new_v4()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Evidence,
            ..
        }
    ));
}
