use lafe_score::auth::{Credentials, Session};
use lafe_score::backend::SectionBackend;
use lafe_score::errors::StoreError;
use lafe_score::local_cache::{LocalBackend, SectionCache, seed_sections};
use lafe_score::section::{NewSection, SectionId, SectionPatch, Side};

fn admin() -> Session {
    Session::offline(&Credentials::new("admin@lafe.edu", "secret"))
}

fn team_payload(a: &str, b: &str) -> NewSection {
    NewSection::Score {
        code_a: a.to_string(),
        code_b: b.to_string(),
        score_a: 0,
        score_b: 0,
    }
}

#[test]
fn falls_back_to_seed_until_written() {
    let cache = SectionCache::open_in_memory().expect("cache");
    assert!(cache.read("futbol").unwrap().is_none());

    let seeded = cache.load_or_seed("futbol").unwrap();
    assert_eq!(seeded, seed_sections("futbol"));
    assert_eq!(seeded.len(), 2);
    assert!(cache.load_or_seed("kickingball").unwrap().is_empty());

    cache.write("futbol", &[]).unwrap();
    assert!(cache.load_or_seed("futbol").unwrap().is_empty());
    assert_eq!(cache.keys().unwrap(), vec!["futbol".to_string()]);
}

#[test]
fn mutations_persist_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("sections.sqlite");
    let session = admin();

    let created_id = {
        let mut backend = LocalBackend::new(SectionCache::open(&path).unwrap());
        let created = backend
            .create(&session, "futbol", &team_payload("5a", "6b"))
            .expect("create");
        assert!(created.date.is_some());
        assert!(!created.finished);
        created.id
    };

    let mut backend = LocalBackend::new(SectionCache::open(&path).unwrap());
    assert_eq!(backend.cache().keys().unwrap(), vec!["futbol".to_string()]);
    let sections = backend.list("futbol").unwrap();
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[2].id, created_id);
    assert_eq!(sections[2].code(Side::A), "5a");

    let updated = backend
        .update(&session, &created_id, &SectionPatch::score(Side::B, 7))
        .expect("update");
    assert_eq!(updated.score(Side::B), 7);

    backend.delete(&session, &created_id).expect("delete");
    let sections = backend.list("futbol").unwrap();
    assert_eq!(sections.len(), 2);
    assert!(sections.iter().all(|s| s.id != created_id));
}

#[test]
fn ids_are_unique_within_one_millisecond() {
    let mut backend = LocalBackend::new(SectionCache::open_in_memory().unwrap());
    let session = admin();
    let a = backend
        .create(&session, "balonmano", &team_payload("1a", "2a"))
        .unwrap();
    let b = backend
        .create(&session, "balonmano", &team_payload("3a", "4a"))
        .unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn finished_results_are_locked_locally() {
    let mut backend = LocalBackend::new(SectionCache::open_in_memory().unwrap());
    let session = admin();
    let id = SectionId::from("seed-futbol-1");

    let err = backend
        .update(&session, &id, &SectionPatch::score(Side::A, 9))
        .unwrap_err();
    assert!(matches!(err, StoreError::SectionFinished(_)));

    let reopened = backend
        .update(
            &session,
            &id,
            &SectionPatch::finished(false, "2024-05-11T10:00:00.000Z".to_string()),
        )
        .expect("reopen");
    assert!(!reopened.finished);
    assert_eq!(reopened.date.as_deref(), Some("2024-05-11T10:00:00.000Z"));
}

#[test]
fn scoreboard_spans_every_category() {
    let mut backend = LocalBackend::new(SectionCache::open_in_memory().unwrap());
    let finished = backend.finished().unwrap();
    let mut categories: Vec<&str> = finished.iter().map(|s| s.category.as_str()).collect();
    categories.sort_unstable();
    assert_eq!(
        categories,
        vec![
            "ajedrez",
            "atletismo_velocidad",
            "basketball",
            "futbol",
            "voleibol"
        ]
    );
    assert!(finished.iter().all(|s| s.finished));
}

#[test]
fn unknown_id_is_not_found() {
    let mut backend = LocalBackend::new(SectionCache::open_in_memory().unwrap());
    let err = backend
        .delete(&admin(), &SectionId::from("missing"))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn offline_login_is_admin() {
    let mut backend = LocalBackend::new(SectionCache::open_in_memory().unwrap());
    let session = backend
        .login(&Credentials::new("  coach@lafe.edu ", "pw"))
        .expect("login");
    assert!(session.is_admin());
    assert_eq!(session.email(), "coach@lafe.edu");
    assert!(backend.login(&Credentials::new("", "pw")).is_err());
}
