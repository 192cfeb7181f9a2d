use anyhow::anyhow;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::{Credentials, Session, UserRecord};
use crate::backend::SectionBackend;
use crate::errors::StoreError;
use crate::section::{NewSection, Section, SectionId, SectionPatch, parse_sections_json};
use crate::validate::ValidationError;

/// REST backend: `/sections`, `/scores` and `/api/auth`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn list_sections(&self, category: &str) -> Result<Vec<Section>, StoreError> {
        let url = self.url(&format!("sections/{category}"));
        debug!(%url, "listing sections");
        let resp = self.client.get(&url).send()?;
        read_sections(resp)
    }

    pub fn create_section(
        &self,
        session: &Session,
        category: &str,
        payload: &NewSection,
    ) -> Result<Section, StoreError> {
        let url = self.url(&format!("sections/{category}"));
        let resp = authorized(self.client.post(&url), session).json(payload).send()?;
        read_json(resp)
    }

    pub fn update_section(
        &self,
        session: &Session,
        id: &SectionId,
        patch: &SectionPatch,
    ) -> Result<Section, StoreError> {
        let url = self.url(&format!("sections/{id}"));
        let resp = authorized(self.client.put(&url), session).json(patch).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.clone()));
        }
        read_json(resp)
    }

    pub fn delete_section(&self, session: &Session, id: &SectionId) -> Result<(), StoreError> {
        let url = self.url(&format!("sections/{id}"));
        let resp = authorized(self.client.delete(&url), session).send()?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.clone()));
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(status_error(status, body));
        }
        if status != StatusCode::NO_CONTENT {
            warn!(%status, %id, "delete answered without 204");
        }
        Ok(())
    }

    pub fn finished_scores(&self) -> Result<Vec<Section>, StoreError> {
        let resp = self.client.get(self.url("scores/")).send()?;
        read_sections(resp)
    }

    pub fn login(&self, credentials: &Credentials) -> Result<Session, StoreError> {
        if !credentials.can_submit() {
            return Err(ValidationError::MissingCredentials.into());
        }
        let header = credentials.basic_header();
        let resp = self
            .client
            .get(self.url("api/auth/login"))
            .header(AUTHORIZATION, header.as_str())
            .send()?;
        let user: UserRecord = read_json(resp)?;
        Ok(Session::new(user, header))
    }

    pub fn register(&self, credentials: &Credentials, is_admin: bool) -> Result<String, StoreError> {
        if !credentials.can_submit() {
            return Err(ValidationError::MissingCredentials.into());
        }
        let body = json!({
            "email": credentials.email.trim(),
            "password": credentials.password,
            "is_admin": is_admin,
        });
        let resp = self
            .client
            .post(self.url("api/auth/register"))
            .json(&body)
            .send()?;
        let reply: serde_json::Value = read_json(resp)?;
        Ok(reply
            .get("msg")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }
}

impl SectionBackend for ApiClient {
    fn name(&self) -> &'static str {
        "api"
    }

    fn list(&mut self, category: &str) -> Result<Vec<Section>, StoreError> {
        self.list_sections(category)
    }

    fn create(
        &mut self,
        session: &Session,
        category: &str,
        payload: &NewSection,
    ) -> Result<Section, StoreError> {
        self.create_section(session, category, payload)
    }

    fn update(
        &mut self,
        session: &Session,
        id: &SectionId,
        patch: &SectionPatch,
    ) -> Result<Section, StoreError> {
        self.update_section(session, id, patch)
    }

    fn delete(&mut self, session: &Session, id: &SectionId) -> Result<(), StoreError> {
        self.delete_section(session, id)
    }

    fn finished(&mut self) -> Result<Vec<Section>, StoreError> {
        self.finished_scores()
    }

    fn login(&mut self, credentials: &Credentials) -> Result<Session, StoreError> {
        ApiClient::login(self, credentials)
    }

    fn register(&mut self, credentials: &Credentials, is_admin: bool) -> Result<String, StoreError> {
        ApiClient::register(self, credentials, is_admin)
    }
}

fn authorized(req: RequestBuilder, session: &Session) -> RequestBuilder {
    req.header(AUTHORIZATION, session.auth_header())
}

pub fn status_error(status: StatusCode, body: String) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
        StatusCode::FORBIDDEN => StoreError::Forbidden,
        _ => StoreError::Http {
            status: status.as_u16(),
            body,
        },
    }
}

// List endpoints may answer `null` or an empty body for "nothing yet".
fn read_sections(resp: Response) -> Result<Vec<Section>, StoreError> {
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(status_error(status, body));
    }
    parse_sections_json(&body).map_err(StoreError::Decode)
}

fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, StoreError> {
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(status_error(status, body));
    }
    serde_json::from_str(&body).map_err(|err| StoreError::Decode(anyhow!(err)))
}
