use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use crate::auth::{Credentials, Session};
use crate::backend::SectionBackend;
use crate::category::CATEGORIES;
use crate::errors::StoreError;
use crate::section::{NewSection, Section, SectionId, SectionPatch};

const SEED_JSON: &str = include_str!("../data/seed_sections.json");

/// One row per category key holding the JSON-serialized section list.
pub struct SectionCache {
    conn: Connection,
}

impl SectionCache {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn read(&self, key: &str) -> Result<Option<Vec<Section>>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM section_cache WHERE category_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("read cache entry {key}"))?;
        let Some(body) = body else {
            return Ok(None);
        };
        let sections = serde_json::from_str::<Vec<Section>>(&body)
            .with_context(|| format!("decode cache entry {key}"))?;
        Ok(Some(sections))
    }

    pub fn write(&self, key: &str, sections: &[Section]) -> Result<()> {
        let body = serde_json::to_string(sections).context("serialize sections")?;
        self.conn
            .execute(
                r#"
                INSERT INTO section_cache (category_key, body, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(category_key) DO UPDATE SET
                    body = excluded.body,
                    updated_at = excluded.updated_at
                "#,
                params![key, body, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("write cache entry {key}"))?;
        Ok(())
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category_key FROM section_cache ORDER BY category_key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }

    /// Cached list, or the bundled seed when the category was never written.
    pub fn load_or_seed(&self, key: &str) -> Result<Vec<Section>> {
        match self.read(key)? {
            Some(sections) => Ok(sections),
            None => Ok(seed_sections(key)),
        }
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS section_cache (
            category_key TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .context("init section cache schema")?;
    Ok(())
}

pub fn seed_sections(key: &str) -> Vec<Section> {
    match serde_json::from_str::<HashMap<String, Vec<Section>>>(SEED_JSON) {
        Ok(mut seed) => seed.remove(key).unwrap_or_default(),
        Err(err) => {
            warn!(error = %err, "bundled seed dataset is invalid");
            Vec::new()
        }
    }
}

/// Offline backend: every mutation reads the category list, edits it, and writes it back whole.
pub struct LocalBackend {
    cache: SectionCache,
    last_id: i64,
}

impl LocalBackend {
    pub fn new(cache: SectionCache) -> Self {
        Self { cache, last_id: 0 }
    }

    pub fn cache(&self) -> &SectionCache {
        &self.cache
    }

    // Millisecond timestamps, bumped when two sections land in the same millisecond.
    fn next_id(&mut self) -> SectionId {
        let now = Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        SectionId::new(self.last_id.to_string())
    }

    fn known_keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = CATEGORIES.iter().map(|c| c.key.to_string()).collect();
        for key in self.cache.keys()? {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn locate(&self, id: &SectionId) -> Result<(String, Vec<Section>, usize), StoreError> {
        for key in self.known_keys().map_err(StoreError::Cache)? {
            let sections = self.cache.load_or_seed(&key).map_err(StoreError::Cache)?;
            if let Some(idx) = sections.iter().position(|s| &s.id == id) {
                return Ok((key, sections, idx));
            }
        }
        Err(StoreError::NotFound(id.clone()))
    }
}

impl SectionBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn list(&mut self, category: &str) -> Result<Vec<Section>, StoreError> {
        self.cache.load_or_seed(category).map_err(StoreError::Cache)
    }

    fn create(
        &mut self,
        _session: &Session,
        category: &str,
        payload: &NewSection,
    ) -> Result<Section, StoreError> {
        let mut sections = self
            .cache
            .load_or_seed(category)
            .map_err(StoreError::Cache)?;
        let date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let section = Section::from_new(self.next_id(), category, Some(date), payload);
        sections.push(section.clone());
        self.cache
            .write(category, &sections)
            .map_err(StoreError::Cache)?;
        debug!(id = %section.id, category, "section stored locally");
        Ok(section)
    }

    fn update(
        &mut self,
        _session: &Session,
        id: &SectionId,
        patch: &SectionPatch,
    ) -> Result<Section, StoreError> {
        let (key, mut sections, idx) = self.locate(id)?;
        // Same lock the server applies: results of a finished section are frozen.
        if sections[idx].finished && patch.touches_results() {
            return Err(StoreError::SectionFinished(id.clone()));
        }
        patch.apply_to(&mut sections[idx]);
        let updated = sections[idx].clone();
        self.cache.write(&key, &sections).map_err(StoreError::Cache)?;
        Ok(updated)
    }

    fn delete(&mut self, _session: &Session, id: &SectionId) -> Result<(), StoreError> {
        let (key, mut sections, idx) = self.locate(id)?;
        sections.remove(idx);
        self.cache.write(&key, &sections).map_err(StoreError::Cache)?;
        Ok(())
    }

    fn finished(&mut self) -> Result<Vec<Section>, StoreError> {
        let mut out = Vec::new();
        for key in self.known_keys().map_err(StoreError::Cache)? {
            let sections = self.cache.load_or_seed(&key).map_err(StoreError::Cache)?;
            out.extend(sections.into_iter().filter(|s| s.finished));
        }
        Ok(out)
    }

    fn login(&mut self, credentials: &Credentials) -> Result<Session, StoreError> {
        if !credentials.can_submit() {
            return Err(crate::validate::ValidationError::MissingCredentials.into());
        }
        Ok(Session::offline(credentials))
    }

    // No user table offline; any non-empty credentials sign in.
    fn register(&mut self, credentials: &Credentials, _is_admin: bool) -> Result<String, StoreError> {
        if !credentials.can_submit() {
            return Err(crate::validate::ValidationError::MissingCredentials.into());
        }
        Ok(format!("{} puede iniciar sesión sin conexión", credentials.email.trim()))
    }
}
