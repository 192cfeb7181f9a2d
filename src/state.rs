use std::collections::VecDeque;
use std::time::SystemTime;

use crate::auth::{Credentials, Session};
use crate::category::{Category, search_categories};
use crate::errors::Alert;
use crate::scoreboard::ScoreboardGroup;
use crate::section::{NewSection, Section, SectionId, Side};
use crate::store::SectionUpdate;
use crate::validate::SectionForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Categories,
    Category,
    Scores,
    Login,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub form: SectionForm,
    pub field: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Score(Side),
    Position(usize),
}

/// Inline edit of one score or one position code of the selected section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub id: SectionId,
    pub target: EditTarget,
    pub buffer: String,
}

impl FieldEdit {
    pub fn into_update(self) -> (SectionId, SectionUpdate) {
        let change = match self.target {
            EditTarget::Score(side) => SectionUpdate::ScoreText {
                side,
                text: self.buffer,
            },
            EditTarget::Position(index) => SectionUpdate::Position {
                index,
                code: self.buffer,
            },
        };
        (self.id, change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub credentials: Credentials,
    pub field: LoginField,
    pub show_password: bool,
}

impl LoginForm {
    fn new() -> Self {
        Self {
            credentials: Credentials::default(),
            field: LoginField::Email,
            show_password: false,
        }
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Email => &mut self.credentials.email,
            LoginField::Password => &mut self.credentials.password,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.active_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.active_mut().pop();
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub email: String,
    pub is_admin: bool,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        Self {
            email: session.email().to_string(),
            is_admin: session.is_admin(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub backend_label: &'static str,
    pub search: String,
    pub search_active: bool,
    pub category_selected: usize,
    pub category: Option<&'static Category>,
    pub sections: Vec<Section>,
    pub sections_loading: bool,
    pub section_selected: usize,
    pub side: Side,
    pub position_index: usize,
    pub form: Option<FormState>,
    pub confirm_delete: Option<SectionId>,
    pub field_edit: Option<FieldEdit>,
    pub scoreboard: Vec<ScoreboardGroup>,
    pub scores_scroll: u16,
    pub scores_updated_at: Option<SystemTime>,
    pub scores_in_flight: bool,
    pub login: LoginForm,
    pub session: Option<SessionInfo>,
    pub alert: Option<Alert>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new("API")
    }
}

impl AppState {
    pub fn new(backend_label: &'static str) -> Self {
        Self {
            screen: Screen::Categories,
            backend_label,
            search: String::new(),
            search_active: false,
            category_selected: 0,
            category: None,
            sections: Vec::with_capacity(16),
            sections_loading: false,
            section_selected: 0,
            side: Side::A,
            position_index: 0,
            form: None,
            confirm_delete: None,
            field_edit: None,
            scoreboard: Vec::new(),
            scores_scroll: 0,
            scores_updated_at: None,
            scores_in_flight: false,
            login: LoginForm::new(),
            session: None,
            alert: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn visible_categories(&self) -> Vec<&'static Category> {
        search_categories(&self.search)
    }

    pub fn selected_category(&self) -> Option<&'static Category> {
        self.visible_categories()
            .get(self.category_selected)
            .copied()
    }

    /// Switches to the category screen; the caller sends the load command.
    pub fn open_selected_category(&mut self) -> Option<&'static Category> {
        let category = self.selected_category()?;
        self.category = Some(category);
        self.sections.clear();
        self.section_selected = 0;
        self.side = Side::A;
        self.position_index = 0;
        self.sections_loading = true;
        self.form = None;
        self.confirm_delete = None;
        self.field_edit = None;
        self.screen = Screen::Category;
        Some(category)
    }

    pub fn selected_section(&self) -> Option<&Section> {
        self.sections.get(self.section_selected)
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Categories => {
                let total = self.visible_categories().len();
                if total > 0 {
                    self.category_selected = (self.category_selected + 1) % total;
                }
            }
            Screen::Category => {
                let total = self.sections.len();
                if total > 0 {
                    self.section_selected = (self.section_selected + 1) % total;
                }
            }
            Screen::Scores => {
                self.scores_scroll = self.scores_scroll.saturating_add(1);
                self.clamp_scores_scroll();
            }
            Screen::Login => self.login.next_field(),
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Categories => {
                let total = self.visible_categories().len();
                if total > 0 {
                    self.category_selected = (self.category_selected + total - 1) % total;
                }
            }
            Screen::Category => {
                let total = self.sections.len();
                if total > 0 {
                    self.section_selected = (self.section_selected + total - 1) % total;
                }
            }
            Screen::Scores => self.scores_scroll = self.scores_scroll.saturating_sub(1),
            Screen::Login => self.login.next_field(),
        }
    }

    pub fn clamp_selection(&mut self) {
        let categories = self.visible_categories().len();
        if self.category_selected >= categories {
            self.category_selected = categories.saturating_sub(1);
        }
        if self.section_selected >= self.sections.len() {
            self.section_selected = self.sections.len().saturating_sub(1);
        }
    }

    /// Header, one row per section and a spacer per group, as the Scores screen draws them.
    pub fn scoreboard_line_count(&self) -> usize {
        self.scoreboard.iter().map(|g| g.sections.len() + 2).sum()
    }

    pub fn clamp_scores_scroll(&mut self) {
        let max = self.scoreboard_line_count().saturating_sub(1);
        let max = u16::try_from(max).unwrap_or(u16::MAX);
        self.scores_scroll = self.scores_scroll.min(max);
    }

    /// Marks a scoreboard fetch as pending; false while the previous one has not answered.
    pub fn begin_scores_fetch(&mut self) -> bool {
        if self.scores_in_flight {
            return false;
        }
        self.scores_in_flight = true;
        true
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.category_selected = 0;
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.category_selected = 0;
    }

    pub fn open_form(&mut self) {
        let Some(category) = self.category else {
            return;
        };
        self.form = Some(FormState {
            form: SectionForm::new(category.kind),
            field: 0,
        });
    }

    pub fn form_push_char(&mut self, c: char) {
        let Some(state) = self.form.as_mut() else {
            return;
        };
        let raw = format!("{}{c}", state.form.field_value(state.field));
        state.form.set_field(state.field, &raw);
        // Auto-advance once a code is complete.
        if state.form.field_value(state.field).chars().count() == crate::validate::CODE_LEN
            && state.field + 1 < state.form.field_count()
        {
            state.field += 1;
        }
    }

    pub fn form_backspace(&mut self) {
        let Some(state) = self.form.as_mut() else {
            return;
        };
        let mut raw = state.form.field_value(state.field).to_string();
        raw.pop();
        state.form.set_field(state.field, &raw);
    }

    pub fn form_next_field(&mut self) {
        if let Some(state) = self.form.as_mut() {
            let total = state.form.field_count().max(1);
            state.field = (state.field + 1) % total;
        }
    }

    pub fn form_prev_field(&mut self) {
        if let Some(state) = self.form.as_mut() {
            let total = state.form.field_count().max(1);
            state.field = (state.field + total - 1) % total;
        }
    }

    /// Left/right: team side for scores, slot for positions.
    pub fn move_cursor(&mut self, forward: bool) {
        let Some(section) = self.selected_section() else {
            return;
        };
        if section.kind().is_score() {
            self.side = self.side.other();
            return;
        }
        let total = section.positions().len();
        if total == 0 {
            return;
        }
        self.position_index = if forward {
            (self.position_index + 1) % total
        } else {
            (self.position_index + total - 1) % total
        };
    }

    pub fn begin_field_edit(&mut self) -> bool {
        let Some(section) = self.selected_section() else {
            return false;
        };
        if section.finished {
            return false;
        }
        let (target, buffer) = if section.kind().is_score() {
            (
                EditTarget::Score(self.side),
                section.score(self.side).to_string(),
            )
        } else {
            let index = self
                .position_index
                .min(section.positions().len().saturating_sub(1));
            let current = section.positions().get(index).cloned().unwrap_or_default();
            (EditTarget::Position(index), current)
        };
        self.field_edit = Some(FieldEdit {
            id: section.id.clone(),
            target,
            buffer,
        });
        true
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetSections {
        category: String,
        sections: Vec<Section>,
    },
    SectionCreated {
        category: String,
    },
    SetScoreboard(Vec<ScoreboardGroup>),
    ScoresFailed(Alert),
    SessionChanged(Option<SessionInfo>),
    Alert(Alert),
    /// Informational popup; logged as INFO rather than WARN.
    Notice(Alert),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    LoadSections {
        category: String,
    },
    CreateSection {
        category: String,
        payload: NewSection,
    },
    UpdateSection {
        id: SectionId,
        change: SectionUpdate,
    },
    DeleteSection {
        id: SectionId,
    },
    FetchScores,
    Login(Credentials),
    Register {
        credentials: Credentials,
        is_admin: bool,
    },
    Logout,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetSections { category, sections } => {
            // Late replies for a category the user already left are dropped.
            if state.category.map(|c| c.key) != Some(category.as_str()) {
                return;
            }
            let selected_id = state.selected_section().map(|s| s.id.clone());
            state.sections = sections;
            state.sections_loading = false;
            if let Some(id) = selected_id
                && let Some(idx) = state.sections.iter().position(|s| s.id == id)
            {
                state.section_selected = idx;
            }
            state.clamp_selection();
        }
        Delta::SectionCreated { category } => {
            if state.category.map(|c| c.key) == Some(category.as_str()) {
                state.form = None;
                state.section_selected = state.sections.len().saturating_sub(1);
            }
        }
        Delta::SetScoreboard(groups) => {
            state.scoreboard = groups;
            state.scores_updated_at = Some(SystemTime::now());
            state.scores_in_flight = false;
            state.clamp_scores_scroll();
        }
        Delta::ScoresFailed(alert) => {
            state.scores_in_flight = false;
            state.push_log(format!("[WARN] {}: {}", alert.title, alert.message));
            // A failing poll should not stack popups on top of one another.
            if state.alert.is_none() {
                state.alert = Some(alert);
            }
        }
        Delta::SessionChanged(session) => {
            match &session {
                Some(info) => state.push_log(format!("[INFO] Signed in as {}", info.email)),
                None => state.push_log("[INFO] Signed out"),
            }
            if session.is_some() {
                state.login.clear();
                if state.screen == Screen::Login {
                    state.screen = Screen::Categories;
                }
            }
            state.session = session;
        }
        Delta::Alert(alert) => {
            state.sections_loading = false;
            state.push_log(format!("[WARN] {}: {}", alert.title, alert.message));
            state.alert = Some(alert);
        }
        Delta::Notice(alert) => {
            state.push_log(format!("[INFO] {}: {}", alert.title, alert.message));
            state.alert = Some(alert);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
