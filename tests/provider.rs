use lafe_score::auth::Credentials;
use lafe_score::local_cache::{LocalBackend, SectionCache};
use lafe_score::provider::Provider;
use lafe_score::section::{NewSection, SectionId};
use lafe_score::state::{AppState, Delta, ProviderCommand, apply_delta};
use lafe_score::store::SectionUpdate;

fn offline_provider() -> Provider {
    let cache = SectionCache::open_in_memory().expect("cache");
    Provider::new(Box::new(LocalBackend::new(cache)), 999)
}

fn login(provider: &mut Provider) {
    let deltas = provider.handle(ProviderCommand::Login(Credentials::new(
        "admin@lafe.edu",
        "secret",
    )));
    assert!(matches!(deltas.first(), Some(Delta::SessionChanged(Some(info))) if info.is_admin));
}

#[test]
fn load_replies_with_sections_for_category() {
    let mut provider = offline_provider();
    let deltas = provider.handle(ProviderCommand::LoadSections {
        category: "futbol".to_string(),
    });
    match deltas.as_slice() {
        [Delta::SetSections { category, sections }] => {
            assert_eq!(category, "futbol");
            assert_eq!(sections.len(), 2);
        }
        other => panic!("unexpected deltas {other:?}"),
    }
}

#[test]
fn mutation_without_login_raises_alert() {
    let mut provider = offline_provider();
    provider.handle(ProviderCommand::LoadSections {
        category: "futbol".to_string(),
    });
    let deltas = provider.handle(ProviderCommand::UpdateSection {
        id: SectionId::from("seed-futbol-2"),
        change: SectionUpdate::ToggleFinished,
    });
    match deltas.as_slice() {
        [Delta::Alert(alert)] => assert_eq!(alert.message, "Inicia sesión para modificar secciones"),
        other => panic!("unexpected deltas {other:?}"),
    }
    assert!(!provider.store().get(&SectionId::from("seed-futbol-2")).unwrap().finished);
}

#[test]
fn create_then_delete_round_trip_through_state() {
    let mut provider = offline_provider();
    let mut state = AppState::new("OFFLINE");
    for c in "ajedrez".chars() {
        state.push_search_char(c);
    }
    state.open_selected_category().unwrap();

    login(&mut provider);
    for delta in provider.handle(ProviderCommand::LoadSections {
        category: "ajedrez".to_string(),
    }) {
        apply_delta(&mut state, delta);
    }
    assert_eq!(state.sections.len(), 1);

    state.open_form();
    for delta in provider.handle(ProviderCommand::CreateSection {
        category: "ajedrez".to_string(),
        payload: NewSection::Position {
            gender: None,
            positions: vec!["3A".to_string(), "1B".to_string()],
        },
    }) {
        apply_delta(&mut state, delta);
    }
    assert!(state.form.is_none());
    assert_eq!(state.sections.len(), 2);
    let created = state.selected_section().unwrap().id.clone();

    for delta in provider.handle(ProviderCommand::DeleteSection { id: created.clone() }) {
        apply_delta(&mut state, delta);
    }
    assert_eq!(state.sections.len(), 1);
    assert!(state.sections.iter().all(|s| s.id != created));
    assert!(state.alert.is_none());
}

#[test]
fn scores_and_logout() {
    let mut provider = offline_provider();
    let deltas = provider.handle(ProviderCommand::FetchScores);
    match deltas.as_slice() {
        [Delta::SetScoreboard(groups)] => {
            assert_eq!(groups[0].label, "10/05/2024");
            assert_eq!(groups.len(), 3);
        }
        other => panic!("unexpected deltas {other:?}"),
    }

    login(&mut provider);
    assert!(provider.session().is_some());
    let deltas = provider.handle(ProviderCommand::Logout);
    assert!(matches!(deltas.as_slice(), [Delta::SessionChanged(None)]));
    assert!(provider.session().is_none());
}

#[test]
fn empty_credentials_fail_login() {
    let mut provider = offline_provider();
    let deltas = provider.handle(ProviderCommand::Login(Credentials::new("", "")));
    match deltas.as_slice() {
        [Delta::Alert(alert)] => assert_eq!(alert.title, "Login fallido"),
        other => panic!("unexpected deltas {other:?}"),
    }
    assert!(provider.session().is_none());
}
