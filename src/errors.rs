//! Error taxonomy for section and auth operations.
//!
//! Every failure ends up as a one-shot alert in the UI; nothing here is retried.

use thiserror::Error;

use crate::section::SectionId;
use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("not signed in")]
    Unauthorized,

    #[error("session is not allowed to modify sections")]
    Forbidden,

    #[error("section {0} not found")]
    NotFound(SectionId),

    #[error("section {0} is finished")]
    SectionFinished(SectionId),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid response: {0}")]
    Decode(#[source] anyhow::Error),

    #[error("local cache error: {0}")]
    Cache(#[source] anyhow::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Network(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Create,
    Update,
    Delete,
    Scores,
    Login,
    Register,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// User-facing text for a failed action, in the app's language.
pub fn alert_for(action: Action, err: &StoreError) -> Alert {
    if action == Action::Login {
        let message = match err {
            StoreError::Unauthorized => "Credenciales inválidas",
            StoreError::Validation(_) => "Ingresa usuario y contraseña",
            _ => "Error inesperado al autenticar",
        };
        return Alert::new("Login fallido", message);
    }
    if action == Action::Register {
        let message = match err {
            StoreError::Http { status: 400, .. } => "El usuario ya existe",
            StoreError::Validation(_) => "Ingresa usuario y contraseña",
            _ => "No se pudo registrar el usuario",
        };
        return Alert::new("Registro fallido", message);
    }

    let message = match err {
        StoreError::Unauthorized => "Inicia sesión para modificar secciones".to_string(),
        StoreError::Forbidden => "Tu usuario no tiene permisos de administrador".to_string(),
        StoreError::SectionFinished(_) => {
            "La sección está finalizada; desmárcala para editarla".to_string()
        }
        StoreError::Validation(reason) => format!("Formulario incompleto: {reason}"),
        StoreError::NotFound(_) => "La sección ya no existe".to_string(),
        _ => match action {
            Action::Load => "No se pudieron cargar las secciones".to_string(),
            Action::Create => "No se pudo crear la sección".to_string(),
            Action::Update => "No se pudo actualizar".to_string(),
            Action::Delete => "No se pudo eliminar".to_string(),
            Action::Scores => "No se pudieron cargar los resultados".to_string(),
            Action::Login | Action::Register => "Error inesperado al autenticar".to_string(),
        },
    };
    Alert::new("Error", message)
}
