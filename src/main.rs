use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tracing::info;

use lafe_score::auth::Credentials;
use lafe_score::category::CategoryKind;
use lafe_score::config::{AppConfig, load_env_files};
use lafe_score::logging::init_tracing;
use lafe_score::provider::spawn_provider;
use lafe_score::section::{Section, Side};
use lafe_score::state::{
    self, AppState, EditTarget, LoginField, ProviderCommand, Screen, apply_delta,
};
use lafe_score::store::SectionUpdate;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    scores_refresh: Duration,
    last_scores_refresh: Instant,
}

impl App {
    fn new(config: &AppConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(config.backend.label()),
            should_quit: false,
            cmd_tx,
            scores_refresh: config.scores_poll,
            last_scores_refresh: Instant::now(),
        }
    }

    fn send(&mut self, cmd: ProviderCommand) -> bool {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Provider unavailable");
            return false;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider request failed");
            return false;
        }
        true
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.state.alert = None;
            }
            return;
        }
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }

        match self.state.screen {
            Screen::Categories => self.on_categories_key(key),
            Screen::Category => self.on_category_key(key),
            Screen::Scores => self.on_scores_key(key),
            Screen::Login => self.on_login_key(key),
        }
    }

    fn on_categories_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            match key.code {
                KeyCode::Esc => self.state.search_active = false,
                KeyCode::Enter => {
                    self.state.search_active = false;
                    self.open_category();
                }
                KeyCode::Backspace => self.state.pop_search_char(),
                KeyCode::Down => self.state.select_next(),
                KeyCode::Up => self.state.select_prev(),
                KeyCode::Char(c) => self.state.push_search_char(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Esc => {
                self.state.search.clear();
                self.state.clamp_selection();
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter | KeyCode::Char('d') => self.open_category(),
            KeyCode::Char('s') => self.open_scores(),
            KeyCode::Char('p') => self.state.screen = Screen::Login,
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_category_key(&mut self, key: KeyEvent) {
        if self.state.form.is_some() {
            self.on_form_key(key);
            return;
        }
        if let Some(id) = self.state.confirm_delete.clone() {
            match key.code {
                KeyCode::Char('s') | KeyCode::Char('y') => {
                    self.state.confirm_delete = None;
                    self.send(ProviderCommand::DeleteSection { id });
                }
                KeyCode::Char('n') | KeyCode::Esc => self.state.confirm_delete = None,
                _ => {}
            }
            return;
        }
        if let Some(edit) = self.state.field_edit.as_mut() {
            match key.code {
                KeyCode::Esc => self.state.field_edit = None,
                KeyCode::Backspace => {
                    edit.buffer.pop();
                }
                KeyCode::Enter => {
                    if let Some(edit) = self.state.field_edit.take() {
                        let (id, change) = edit.into_update();
                        self.send(ProviderCommand::UpdateSection { id, change });
                    }
                }
                KeyCode::Char(c) => edit.buffer.push(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Categories,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('h') | KeyCode::Left => self.state.move_cursor(false),
            KeyCode::Char('l') | KeyCode::Right => self.state.move_cursor(true),
            KeyCode::Char('+') | KeyCode::Char('=') => self.bump_score(1),
            KeyCode::Char('-') => self.bump_score(-1),
            KeyCode::Char('e') | KeyCode::Enter => {
                if !self.state.begin_field_edit() && self.state.selected_section().is_some() {
                    self.state.push_log("[INFO] Sección finalizada; desmárcala para editar");
                }
            }
            KeyCode::Char('f') => {
                if let Some(section) = self.state.selected_section() {
                    let id = section.id.clone();
                    self.send(ProviderCommand::UpdateSection {
                        id,
                        change: SectionUpdate::ToggleFinished,
                    });
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(section) = self.state.selected_section() {
                    self.state.confirm_delete = Some(section.id.clone());
                }
            }
            KeyCode::Char('n') => self.state.open_form(),
            KeyCode::Char('r') => self.reload_category(),
            KeyCode::Char('s') => self.open_scores(),
            KeyCode::Char('p') => self.state.screen = Screen::Login,
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.form = None,
            KeyCode::Tab | KeyCode::Down => self.state.form_next_field(),
            KeyCode::BackTab | KeyCode::Up => self.state.form_prev_field(),
            KeyCode::Backspace => self.state.form_backspace(),
            KeyCode::Left | KeyCode::Right => {
                if let Some(form) = self.state.form.as_mut()
                    && form.form.kind.uses_gender()
                {
                    form.form.toggle_gender();
                }
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => self.state.form_push_char(c),
            _ => {}
        }
    }

    fn on_scores_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Categories,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('r') => self.request_scores(true),
            KeyCode::Char('p') => self.state.screen = Screen::Login,
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        if self.state.session.is_some() {
            match key.code {
                KeyCode::Char('o') => {
                    self.send(ProviderCommand::Logout);
                }
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Categories,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.state.screen = Screen::Categories,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
                self.state.login.next_field()
            }
            KeyCode::Backspace => self.state.login.backspace(),
            KeyCode::F(2) => self.state.login.show_password = !self.state.login.show_password,
            KeyCode::F(3) => self.submit_register(false),
            KeyCode::F(4) => self.submit_register(true),
            KeyCode::Enter => {
                let credentials = self.state.login.credentials.clone();
                if !credentials.can_submit() {
                    self.state.push_log("[INFO] Ingresa usuario y contraseña");
                    return;
                }
                if self.send(ProviderCommand::Login(credentials)) {
                    self.state.push_log("[INFO] Login request sent");
                }
            }
            KeyCode::Char(c) => self.state.login.push_char(c),
            _ => {}
        }
    }

    fn open_category(&mut self) {
        let Some(category) = self.state.open_selected_category() else {
            self.state.push_log("[INFO] No category selected");
            return;
        };
        self.send(ProviderCommand::LoadSections {
            category: category.key.to_string(),
        });
    }

    fn reload_category(&mut self) {
        let Some(category) = self.state.category else {
            return;
        };
        self.state.sections_loading = true;
        if self.send(ProviderCommand::LoadSections {
            category: category.key.to_string(),
        }) {
            self.state.push_log("[INFO] Reload request sent");
        }
    }

    fn bump_score(&mut self, delta: i32) {
        let Some(section) = self.state.selected_section() else {
            return;
        };
        if !section.kind().is_score() {
            return;
        }
        if section.finished {
            self.state
                .push_log("[INFO] Sección finalizada; desmárcala para editar");
            return;
        }
        let id = section.id.clone();
        let side = self.state.side;
        self.send(ProviderCommand::UpdateSection {
            id,
            change: SectionUpdate::ScoreDelta { side, delta },
        });
    }

    fn submit_form(&mut self) {
        let (Some(category), Some(form)) = (self.state.category, self.state.form.as_ref()) else {
            return;
        };
        match form.form.to_payload() {
            Ok(payload) => {
                if self.send(ProviderCommand::CreateSection {
                    category: category.key.to_string(),
                    payload,
                }) {
                    self.state.push_log("[INFO] Create request sent");
                }
            }
            Err(err) => self.state.push_log(format!("[INFO] Formulario incompleto: {err}")),
        }
    }

    fn submit_register(&mut self, is_admin: bool) {
        let credentials: Credentials = self.state.login.credentials.clone();
        if !credentials.can_submit() {
            self.state.push_log("[INFO] Ingresa usuario y contraseña");
            return;
        }
        if self.send(ProviderCommand::Register {
            credentials,
            is_admin,
        }) {
            self.state.push_log("[INFO] Register request sent");
        }
    }

    fn open_scores(&mut self) {
        self.state.screen = Screen::Scores;
        self.state.scores_scroll = 0;
        self.request_scores(true);
    }

    fn request_scores(&mut self, announce: bool) {
        if !self.state.begin_scores_fetch() {
            if announce {
                self.state.push_log("[INFO] Scores request already pending");
            }
            return;
        }
        if self.send(ProviderCommand::FetchScores) {
            if announce {
                self.state.push_log("[INFO] Scores request sent");
            }
            self.last_scores_refresh = Instant::now();
        } else {
            self.state.scores_in_flight = false;
        }
    }

    fn maybe_refresh_scores(&mut self) {
        if self.state.screen != Screen::Scores {
            return;
        }
        if !self.state.scores_in_flight && self.last_scores_refresh.elapsed() >= self.scores_refresh {
            self.request_scores(false);
        }
    }
}

fn main() -> io::Result<()> {
    load_env_files();
    let _log_guard = init_tracing("lafe_score.log");
    let config = AppConfig::from_env();
    info!(backend = config.backend.label(), "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let _provider = spawn_provider(config.clone(), tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_refresh_scores();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Categories => render_categories(frame, chunks[1], &app.state),
        Screen::Category => render_category(frame, chunks[1], &app.state),
        Screen::Scores => render_scores(frame, chunks[1], &app.state),
        Screen::Login => render_login(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::TOP));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.screen == Screen::Category {
        if app.state.form.is_some() {
            render_form(frame, frame.size(), &app.state);
        } else if app.state.confirm_delete.is_some() {
            render_confirm_delete(frame, frame.size());
        } else if app.state.field_edit.is_some() {
            render_field_edit(frame, frame.size(), &app.state);
        }
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    if app.state.alert.is_some() {
        render_alert(frame, frame.size(), &app.state);
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Categories => "LA FE SCORE | Categorías".to_string(),
        Screen::Category => match state.category {
            Some(category) => format!("LA FE SCORE | {}", category.label),
            None => "LA FE SCORE".to_string(),
        },
        Screen::Scores => "LA FE SCORE | Resultados".to_string(),
        Screen::Login => "LA FE SCORE | Perfil".to_string(),
    };
    let user = match &state.session {
        Some(info) if info.is_admin => format!("{} (admin)", info.email),
        Some(info) => info.email.clone(),
        None => "sin sesión".to_string(),
    };
    let line1 = format!("  ( o )  {title}");
    let line2 = format!("   \\_/   {} | {user}", state.backend_label);
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Categories if state.search_active => {
            "Type to filter | Enter Open | Esc Done".to_string()
        }
        Screen::Categories => {
            "Enter Open | / Search | j/k Move | s Scores | p Profile | ? Help | q Quit".to_string()
        }
        Screen::Category => {
            "n New | +/- Score | ←/→ Side | e Edit | f Finish | x Delete | r Reload | b Back | ? Help"
                .to_string()
        }
        Screen::Scores => "j/k Scroll | r Refresh | b Back | ? Help | q Quit".to_string(),
        Screen::Login if state.session.is_some() => "o Logout | b/Esc Back".to_string(),
        Screen::Login => {
            "Tab Field | Enter Login | F2 Show password | F3 Register | F4 Register admin | Esc Back"
                .to_string()
        }
    }
}

fn kind_label(kind: CategoryKind) -> String {
    match kind {
        CategoryKind::Score => "marcador".to_string(),
        CategoryKind::Position { count } => format!("{count} posiciones"),
        CategoryKind::Chess => "ajedrez".to_string(),
        CategoryKind::PlaneRace => "vuelo".to_string(),
    }
}

fn render_categories(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);

    let cursor = if state.search_active { "_" } else { "" };
    let search = Paragraph::new(format!(" Buscar: {}{cursor}", state.search))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(search, rows[0]);

    let categories = state.visible_categories();
    if categories.is_empty() {
        frame.render_widget(Paragraph::new(" Sin coincidencias"), rows[1]);
        return;
    }
    let visible = rows[1].height as usize;
    let (start, end) = visible_range(state.category_selected, categories.len(), visible);
    let lines: Vec<Line> = categories[start..end]
        .iter()
        .enumerate()
        .map(|(offset, category)| {
            let idx = start + offset;
            let text = format!(" {:<24} {}", category.label, kind_label(category.kind));
            if idx == state.category_selected {
                Line::styled(
                    text,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Line::raw(text)
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), rows[1]);
}

fn render_category(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = state
        .category
        .map(|c| format!("Secciones | {}", kind_label(c.kind)))
        .unwrap_or_else(|| "Secciones".to_string());
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.sections.is_empty() {
        let text = if state.sections_loading {
            " Cargando..."
        } else {
            " Sin secciones aún. Pulsa n para crear una."
        };
        frame.render_widget(Paragraph::new(text), inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.section_selected, state.sections.len(), visible);
    let lines: Vec<Line> = state.sections[start..end]
        .iter()
        .enumerate()
        .map(|(offset, section)| {
            let idx = start + offset;
            let selected = idx == state.section_selected;
            section_line(section, selected, state)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn section_line(section: &Section, selected: bool, state: &AppState) -> Line<'static> {
    let status = if section.finished { "[FIN]" } else { "[   ]" };
    let base = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else if section.finished {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let marker = if selected { ">" } else { " " };
    let mut spans = vec![Span::styled(format!("{marker} {status} "), base)];

    if section.kind().is_score() {
        for side in [Side::A, Side::B] {
            let text = format!("{} {}", section.code(side).to_uppercase(), section.score(side));
            let style = if selected && state.side == side && !section.finished {
                base.fg(Color::Black).bg(Color::Yellow)
            } else {
                base
            };
            spans.push(Span::styled(text, style));
            if side == Side::A {
                spans.push(Span::styled("  vs  ", base));
            }
        }
    } else {
        if let Some(gender) = section.gender {
            spans.push(Span::styled(format!("[{}] ", gender.label()), base));
        }
        for (idx, code) in section.positions().iter().enumerate() {
            let style = if selected && state.position_index == idx && !section.finished {
                base.fg(Color::Black).bg(Color::Yellow)
            } else {
                base
            };
            spans.push(Span::styled(format!("{}°{}", idx + 1, code), style));
            spans.push(Span::styled(" ", base));
        }
    }

    if let Some(date) = section.date.as_deref() {
        spans.push(Span::styled(format!("  {}", format_date(date)), base.fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn format_date(raw: &str) -> String {
    match lafe_score::scoreboard::parse_section_date(raw) {
        Some(day) => day.format("%d/%m/%Y").to_string(),
        None => raw.to_string(),
    }
}

fn render_scores(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match state.scores_updated_at {
        Some(at) => {
            let secs = SystemTime::now()
                .duration_since(at)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            format!("Resultados | actualizado hace {secs}s")
        }
        None => "Resultados | cargando".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if state.scoreboard.is_empty() {
        let text = if state.scores_updated_at.is_some() {
            " No hay resultados finalizados"
        } else {
            " Cargando..."
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for group in &state.scoreboard {
        lines.push(Line::styled(
            format!(" {}", group.label),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        for section in &group.sections {
            lines.push(Line::raw(format!(
                "   {:<22} {}",
                lafe_score::category::category_label(&section.category),
                section.headline()
            )));
        }
        lines.push(Line::raw(""));
    }
    let scores = Paragraph::new(lines)
        .block(block)
        .scroll((state.scores_scroll, 0));
    frame.render_widget(scores, area);
}

fn render_login(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Perfil").borders(Borders::ALL);
    if let Some(info) = &state.session {
        let role = if info.is_admin { "administrador" } else { "lector" };
        let text = format!(" Usuario: {}\n Rol: {role}\n\n Pulsa o para cerrar sesión", info.email);
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let login = &state.login;
    let password = if login.show_password {
        login.credentials.password.clone()
    } else {
        "*".repeat(login.credentials.password.chars().count())
    };
    let field_style = |field: LoginField| {
        if login.field == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };
    let submit_style = if login.credentials.can_submit() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let lines = vec![
        Line::raw(""),
        Line::styled(
            format!(" Usuario:    {}", login.credentials.email),
            field_style(LoginField::Email),
        ),
        Line::styled(format!(" Contraseña: {password}"), field_style(LoginField::Password)),
        Line::raw(""),
        Line::styled(" [Enter] Iniciar sesión", submit_style),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(form_state) = state.form.as_ref() else {
        return;
    };
    let form = &form_state.form;
    let popup_area = centered_rect(50, 60, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = vec![Line::raw("")];
    for idx in 0..form.field_count() {
        let label = if form.kind.is_score() {
            if idx == 0 { "Equipo A".to_string() } else { "Equipo B".to_string() }
        } else {
            format!("Posición {}", idx + 1)
        };
        let value = form.field_value(idx);
        let style = if idx == form_state.field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let shown = if value.is_empty() { "__" } else { value };
        lines.push(Line::styled(format!(" {label:<12} {shown}"), style));
    }
    if form.kind.uses_gender() {
        lines.push(Line::raw(format!(" {:<12} < {} >", "Género", form.gender.label())));
    }
    lines.push(Line::raw(""));
    let submit_style = if form.can_submit() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::styled(" [Enter] Guardar", submit_style));
    lines.push(Line::raw(" [Esc] Cancelar"));

    let popup = Paragraph::new(lines)
        .block(Block::default().title("Nueva sección").borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_confirm_delete(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(40, 20, area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new("\n ¿Estás seguro?\n\n [s] Eliminar   [n] Cancelar")
        .block(Block::default().title("Eliminar sección").borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_field_edit(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(edit) = state.field_edit.as_ref() else {
        return;
    };
    let label = match edit.target {
        EditTarget::Score(Side::A) => "Puntaje equipo A".to_string(),
        EditTarget::Score(Side::B) => "Puntaje equipo B".to_string(),
        EditTarget::Position(idx) => format!("Posición {}", idx + 1),
    };
    let popup_area = centered_rect(40, 20, area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(format!("\n {label}: {}_\n\n [Enter] Guardar   [Esc] Cancelar", edit.buffer))
        .block(Block::default().title("Editar").borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_alert(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(alert) = state.alert.as_ref() else {
        return;
    };
    let popup_area = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(format!("\n {}\n\n [Enter] Cerrar", alert.message))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(alert.title.as_str())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(popup, popup_area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "La Fe Score - Help",
        "",
        "Global:",
        "  s            Scores",
        "  p            Profile / login",
        "  b / Esc      Back",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Categories:",
        "  / then type  Filter by name",
        "  Enter        Open category",
        "",
        "Category:",
        "  n            New section",
        "  + / -        Score of the selected side",
        "  ← / →        Pick side or position",
        "  e            Edit score or position",
        "  f            Toggle finished",
        "  x            Delete (asks first)",
        "  r            Reload",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
