use anyhow::{Context, Result};
use tracing::info;

use crate::api::ApiClient;
use crate::auth::{Credentials, Session};
use crate::config::{AppConfig, BackendMode};
use crate::errors::StoreError;
use crate::http_client::http_client_with_timeout;
use crate::local_cache::{LocalBackend, SectionCache};
use crate::section::{NewSection, Section, SectionId, SectionPatch};

/// Durable side of the section store: the REST API or the on-device cache.
pub trait SectionBackend: Send {
    fn name(&self) -> &'static str;

    fn list(&mut self, category: &str) -> Result<Vec<Section>, StoreError>;

    fn create(
        &mut self,
        session: &Session,
        category: &str,
        payload: &NewSection,
    ) -> Result<Section, StoreError>;

    fn update(
        &mut self,
        session: &Session,
        id: &SectionId,
        patch: &SectionPatch,
    ) -> Result<Section, StoreError>;

    fn delete(&mut self, session: &Session, id: &SectionId) -> Result<(), StoreError>;

    /// Finished sections across every category.
    fn finished(&mut self) -> Result<Vec<Section>, StoreError>;

    fn login(&mut self, credentials: &Credentials) -> Result<Session, StoreError>;

    /// Returns the server's confirmation message.
    fn register(&mut self, credentials: &Credentials, is_admin: bool) -> Result<String, StoreError>;
}

pub fn build_backend(config: &AppConfig) -> Result<Box<dyn SectionBackend>> {
    match config.backend {
        BackendMode::Remote => {
            let client = http_client_with_timeout(config.http_timeout)?.clone();
            info!(api_url = %config.api_url, "using remote section backend");
            Ok(Box::new(ApiClient::new(&config.api_url, client)))
        }
        BackendMode::Local => {
            let path = config
                .cache_db_path()
                .context("unable to resolve local cache path")?;
            info!(path = %path.display(), "using local section backend");
            let cache = SectionCache::open(&path)?;
            Ok(Box::new(LocalBackend::new(cache)))
        }
    }
}
