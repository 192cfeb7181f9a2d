//! The section store: the in-memory list for one category, kept in step with the backend.
//!
//! Every mutation goes to the backend first; the local list only changes once the
//! backend has accepted it.

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::auth::{Credentials, Session, require_admin};
use crate::backend::SectionBackend;
use crate::category::{CategoryKind, kind_for_key};
use crate::errors::StoreError;
use crate::scoreboard::{ScoreboardGroup, group_by_date};
use crate::section::{NewSection, Section, SectionId, SectionPatch, Side};
use crate::validate::{
    ValidationError, apply_score_delta, clamp_score, parse_score_text, sanitize_position_code,
    validate_new_section, validate_positions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionUpdate {
    ScoreDelta { side: Side, delta: i32 },
    ScoreValue { side: Side, value: i64 },
    ScoreText { side: Side, text: String },
    Position { index: usize, code: String },
    ToggleFinished,
}

impl SectionUpdate {
    fn is_finished_toggle(&self) -> bool {
        matches!(self, SectionUpdate::ToggleFinished)
    }
}

/// Proof that the user confirmed a delete; only `SectionStore::request_delete` makes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    id: SectionId,
}

impl PendingDelete {
    pub fn id(&self) -> &SectionId {
        &self.id
    }
}

pub struct SectionStore {
    backend: Box<dyn SectionBackend>,
    category: Option<String>,
    sections: Vec<Section>,
    max_score: u32,
}

impl SectionStore {
    pub fn new(backend: Box<dyn SectionBackend>, max_score: u32) -> Self {
        Self {
            backend,
            category: None,
            sections: Vec::new(),
            max_score: max_score.max(1),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn kind(&self) -> CategoryKind {
        self.category
            .as_deref()
            .map(kind_for_key)
            .unwrap_or(CategoryKind::Score)
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn get(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    /// Switching category starts from an empty list; a failed reload keeps what was there.
    pub fn load(&mut self, category: &str) -> Result<&[Section], StoreError> {
        if self.category.as_deref() != Some(category) {
            self.category = Some(category.to_string());
            self.sections.clear();
        }
        let mut fetched = self.backend.list(category)?;
        for section in fetched.iter_mut().filter(|s| s.category.is_empty()) {
            section.category = category.to_string();
        }
        info!(category, count = fetched.len(), "sections loaded");
        self.sections = fetched;
        Ok(&self.sections)
    }

    pub fn create(
        &mut self,
        session: Option<&Session>,
        category: &str,
        payload: NewSection,
    ) -> Result<&Section, StoreError> {
        let session = require_admin(session)?;
        validate_new_section(kind_for_key(category), &payload)?;
        if self.category.as_deref() != Some(category) {
            self.load(category)?;
        }
        let mut created = self.backend.create(session, category, &payload)?;
        if created.category.is_empty() {
            created.category = category.to_string();
        }
        info!(id = %created.id, category, "section created");
        self.sections.push(created);
        let last = self.sections.len() - 1;
        Ok(&self.sections[last])
    }

    pub fn update(
        &mut self,
        session: Option<&Session>,
        id: &SectionId,
        change: SectionUpdate,
    ) -> Result<&Section, StoreError> {
        let session = require_admin(session)?;
        let idx = self
            .sections
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let current = &self.sections[idx];
        if current.finished && !change.is_finished_toggle() {
            return Err(StoreError::SectionFinished(id.clone()));
        }
        let patch = self.patch_for(current, change)?;
        let mut updated = self.backend.update(session, id, &patch)?;
        if updated.category.is_empty() {
            updated.category = current.category.clone();
        }
        if updated.id != *id {
            warn!(requested = %id, returned = %updated.id, "backend returned a different id");
        }
        self.sections[idx] = updated;
        Ok(&self.sections[idx])
    }

    pub fn request_delete(&self, id: &SectionId) -> Result<PendingDelete, StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(PendingDelete { id: id.clone() })
    }

    pub fn delete(
        &mut self,
        session: Option<&Session>,
        confirmed: PendingDelete,
    ) -> Result<(), StoreError> {
        let session = require_admin(session)?;
        self.backend.delete(session, &confirmed.id)?;
        self.sections.retain(|s| s.id != confirmed.id);
        info!(id = %confirmed.id, "section deleted");
        Ok(())
    }

    pub fn scoreboard(&mut self) -> Result<Vec<ScoreboardGroup>, StoreError> {
        let finished = self.backend.finished()?;
        Ok(group_by_date(finished))
    }

    pub fn login(&mut self, credentials: &Credentials) -> Result<Session, StoreError> {
        if !credentials.can_submit() {
            return Err(ValidationError::MissingCredentials.into());
        }
        self.backend.login(credentials)
    }

    pub fn register(&mut self, credentials: &Credentials, is_admin: bool) -> Result<String, StoreError> {
        if !credentials.can_submit() {
            return Err(ValidationError::MissingCredentials.into());
        }
        let msg = self.backend.register(credentials, is_admin)?;
        info!(email = credentials.email.trim(), is_admin, "user registered");
        Ok(msg)
    }

    fn patch_for(&self, current: &Section, change: SectionUpdate) -> Result<SectionPatch, StoreError> {
        let kind = current.kind();
        if !change.is_finished_toggle() {
            let wants_positions = matches!(change, SectionUpdate::Position { .. });
            if wants_positions == kind.is_score() {
                return Err(ValidationError::WrongKind.into());
            }
        }

        let patch = match change {
            SectionUpdate::ScoreDelta { side, delta } => SectionPatch::score(
                side,
                apply_score_delta(current.score(side), delta, self.max_score),
            ),
            SectionUpdate::ScoreValue { side, value } => {
                SectionPatch::score(side, clamp_score(value, self.max_score))
            }
            SectionUpdate::ScoreText { side, text } => {
                SectionPatch::score(side, parse_score_text(&text, self.max_score))
            }
            SectionUpdate::Position { index, code } => {
                let mut positions = current.positions().to_vec();
                let slot = positions
                    .get_mut(index)
                    .ok_or(ValidationError::PositionMissing { index })?;
                *slot = sanitize_position_code(&code);
                validate_positions(kind, &positions)?;
                SectionPatch::positions(positions)
            }
            SectionUpdate::ToggleFinished => SectionPatch::finished(
                !current.finished,
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        };
        Ok(patch)
    }
}
