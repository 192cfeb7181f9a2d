use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{error, info, warn};

use crate::auth::Session;
use crate::backend::{SectionBackend, build_backend};
use crate::config::AppConfig;
use crate::errors::{Action, Alert, StoreError, alert_for};
use crate::state::{Delta, ProviderCommand, SessionInfo};
use crate::store::SectionStore;

/// Owns the store and the session; runs one command at a time.
pub struct Provider {
    store: SectionStore,
    session: Option<Session>,
}

impl Provider {
    pub fn new(backend: Box<dyn SectionBackend>, max_score: u32) -> Self {
        Self {
            store: SectionStore::new(backend, max_score),
            session: None,
        }
    }

    pub fn store(&self) -> &SectionStore {
        &self.store
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn handle(&mut self, cmd: ProviderCommand) -> Vec<Delta> {
        match cmd {
            ProviderCommand::LoadSections { category } => match self
                .store
                .load(&category)
                .map(<[_]>::to_vec)
            {
                Ok(sections) => vec![Delta::SetSections { category, sections }],
                Err(err) => {
                    // The list keeps its previous value; echo it so the screen stops loading.
                    let mut out = failure(Action::Load, &err);
                    out.push(self.snapshot(&category));
                    out
                }
            },
            ProviderCommand::CreateSection { category, payload } => {
                let created = self
                    .store
                    .create(self.session.as_ref(), &category, payload)
                    .map(|section| section.id.clone());
                match created {
                    Ok(id) => vec![
                        self.snapshot(&category),
                        Delta::SectionCreated { category },
                        Delta::Log(format!("[INFO] Section {id} created")),
                    ],
                    Err(err) => failure(Action::Create, &err),
                }
            }
            ProviderCommand::UpdateSection { id, change } => {
                let updated = self
                    .store
                    .update(self.session.as_ref(), &id, change)
                    .map(|_| ());
                match updated {
                    Ok(()) => self.current_snapshot(),
                    Err(err) => failure(Action::Update, &err),
                }
            }
            ProviderCommand::DeleteSection { id } => {
                let result = self
                    .store
                    .request_delete(&id)
                    .and_then(|pending| self.store.delete(self.session.as_ref(), pending));
                match result {
                    Ok(()) => {
                        let mut out = self.current_snapshot();
                        out.push(Delta::Log(format!("[INFO] Section {id} deleted")));
                        out
                    }
                    Err(err) => failure(Action::Delete, &err),
                }
            }
            ProviderCommand::FetchScores => match self.store.scoreboard() {
                Ok(groups) => vec![Delta::SetScoreboard(groups)],
                Err(err) => {
                    warn!(error = %err, "scoreboard fetch failed");
                    vec![Delta::ScoresFailed(alert_for(Action::Scores, &err))]
                }
            },
            ProviderCommand::Login(credentials) => match self.store.login(&credentials) {
                Ok(session) => {
                    info!(email = session.email(), admin = session.is_admin(), "signed in");
                    let info = SessionInfo::from(&session);
                    self.session = Some(session);
                    let mut out = vec![Delta::SessionChanged(Some(info.clone()))];
                    if !info.is_admin {
                        out.push(Delta::Notice(Alert::new(
                            "Sesión iniciada",
                            "Tu usuario puede ver resultados pero no editarlos",
                        )));
                    }
                    out
                }
                Err(err) => failure(Action::Login, &err),
            },
            ProviderCommand::Register {
                credentials,
                is_admin,
            } => match self.store.register(&credentials, is_admin) {
                Ok(msg) => {
                    let message = if msg.is_empty() {
                        "Usuario creado; ya puedes iniciar sesión".to_string()
                    } else {
                        msg
                    };
                    vec![Delta::Notice(Alert::new("Registro", message))]
                }
                Err(err) => failure(Action::Register, &err),
            },
            ProviderCommand::Logout => {
                self.session = None;
                vec![Delta::SessionChanged(None)]
            }
        }
    }

    fn snapshot(&self, category: &str) -> Delta {
        let sections = if self.store.category() == Some(category) {
            self.store.sections().to_vec()
        } else {
            Vec::new()
        };
        Delta::SetSections {
            category: category.to_string(),
            sections,
        }
    }

    fn current_snapshot(&self) -> Vec<Delta> {
        match self.store.category() {
            Some(category) => vec![self.snapshot(category)],
            None => Vec::new(),
        }
    }
}

fn failure(action: Action, err: &StoreError) -> Vec<Delta> {
    warn!(?action, error = %err, "section operation failed");
    vec![Delta::Alert(alert_for(action, err))]
}

pub fn spawn_provider(
    config: AppConfig,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let backend = match build_backend(&config) {
            Ok(backend) => backend,
            Err(err) => {
                error!(error = %err, "backend unavailable");
                let _ = tx.send(Delta::Alert(Alert::new(
                    "Error",
                    format!("No se pudo iniciar el almacenamiento: {err}"),
                )));
                return;
            }
        };
        let _ = tx.send(Delta::Log(format!("[INFO] Backend: {}", backend.name())));

        let mut provider = Provider::new(backend, config.max_score);
        while let Ok(cmd) = cmd_rx.recv() {
            for delta in provider.handle(cmd) {
                if tx.send(delta).is_err() {
                    return;
                }
            }
        }
    })
}
