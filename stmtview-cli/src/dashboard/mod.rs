//! Interactive terminal dashboard.
//!
//! `App` holds the view state and turns key presses into state changes;
//! `ui` draws it; `worker` runs the analysis off the UI loop.

pub mod ui;
pub mod worker;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;
use stmtview_core::{
    Column, DashboardState, RowId, TableState, Transaction, export_to_dir, find_row,
};
use stmtview_ingest::{HttpAnalysisService, Readiness, validate_upload};
use tokio::runtime::Handle;
use tracing::info;

use crate::config::Config;
use worker::{AnalysisEvent, AnalysisRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Recurring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    OpenFile,
}

#[derive(Debug)]
pub enum Action {
    None,
    Quit,
    Analyze(AnalysisRequest),
}

pub struct App {
    pub state: DashboardState,
    pub table: TableState,
    pub focus: Focus,
    pub mode: InputMode,
    pub path_input: String,
    /// Position within the visible (sorted, filtered) rows
    pub cursor: usize,
    pub recurring_cursor: usize,
    pub highlighted: Option<RowId>,
    pub status: Option<String>,
    pub export_dir: PathBuf,
    pub server: String,
}

impl App {
    pub fn new(export_dir: PathBuf, server: impl Into<String>) -> Self {
        Self {
            state: DashboardState::new(),
            table: TableState::new(),
            focus: Focus::Table,
            mode: InputMode::Normal,
            path_input: String::new(),
            cursor: 0,
            recurring_cursor: 0,
            highlighted: None,
            status: None,
            export_dir,
            server: server.into(),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.state
            .statement()
            .map(|s| s.transactions.as_slice())
            .unwrap_or(&[])
    }

    pub fn recurring(&self) -> &[String] {
        self.state
            .statement()
            .map(|s| s.recurring_transactions.as_slice())
            .unwrap_or(&[])
    }

    pub fn visible_rows(&self) -> Vec<RowId> {
        self.table.visible_rows(self.transactions())
    }

    pub fn select_file(&mut self, path: PathBuf) {
        if let Err(e) = validate_upload(&path) {
            self.status = Some(e.to_string());
            return;
        }
        self.state.select_file(path);
        self.reset_view();
        self.status = None;
    }

    fn reset_view(&mut self) {
        self.cursor = 0;
        self.recurring_cursor = 0;
        self.highlighted = None;
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        match self.mode {
            InputMode::Normal => self.handle_normal(code),
            InputMode::Search => {
                self.handle_search(code);
                Action::None
            }
            InputMode::OpenFile => {
                self.handle_open(code);
                Action::None
            }
        }
    }

    fn handle_normal(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char('a') => return self.start_analysis(),
            KeyCode::Char('o') => {
                self.path_input = self
                    .state
                    .selected_file()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.mode = InputMode::OpenFile;
            }
            KeyCode::Char('/') => self.mode = InputMode::Search,
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.table.click_header(Column::ALL[idx]);
                self.cursor = 0;
            }
            KeyCode::Char('0') => {
                self.table.clear_sort();
                self.cursor = 0;
            }
            KeyCode::Char('e') => self.export(chrono::Local::now().naive_local()),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Table => Focus::Recurring,
                    Focus::Recurring => Focus::Table,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Enter if self.focus == Focus::Recurring => self.highlight_recurring(),
            _ => {}
        }
        Action::None
    }

    fn handle_search(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Esc => {
                self.table.set_query("");
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => self.table.pop_query_char(),
            KeyCode::Char(c) => self.table.push_query_char(c),
            _ => return,
        }
        self.cursor = 0;
    }

    fn handle_open(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                let path = self.path_input.trim().to_string();
                if !path.is_empty() {
                    self.select_file(PathBuf::from(path));
                }
            }
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.path_input.pop();
            }
            KeyCode::Char(c) => self.path_input.push(c),
            _ => {}
        }
    }

    fn start_analysis(&mut self) -> Action {
        match self.state.begin_analysis() {
            Some((ticket, file)) => {
                self.reset_view();
                self.status = Some(format!("Analyzing {} ...", file.display()));
                Action::Analyze(AnalysisRequest { ticket, file })
            }
            None => Action::None,
        }
    }

    pub fn apply(&mut self, event: AnalysisEvent) {
        match event {
            AnalysisEvent::Finished { ticket, result } => {
                let ok = result.is_ok();
                if !self.state.complete_analysis(ticket, result) {
                    self.status = Some("Discarded results for a previous file".to_string());
                    return;
                }
                self.reset_view();
                self.status = ok.then(|| format!("Loaded {} transactions", self.transactions().len()));
            }
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = match self.focus {
            Focus::Table => self.visible_rows().len(),
            Focus::Recurring => self.recurring().len(),
        };
        let pos = match self.focus {
            Focus::Table => &mut self.cursor,
            Focus::Recurring => &mut self.recurring_cursor,
        };
        if len == 0 {
            *pos = 0;
            return;
        }
        *pos = pos.saturating_add_signed(delta).min(len - 1);
    }

    /// Point the table at the row behind the selected recurring entry.
    /// A filter hiding that row is cleared first.
    fn highlight_recurring(&mut self) {
        let Some(label) = self.recurring().get(self.recurring_cursor).cloned() else {
            return;
        };
        let Some(row) = find_row(self.transactions(), &label) else {
            self.status = Some(format!("No transaction matches '{label}'"));
            return;
        };

        if !self.visible_rows().contains(&row) {
            self.table.set_query("");
        }
        self.highlighted = Some(row);
        self.cursor = self
            .visible_rows()
            .iter()
            .position(|r| *r == row)
            .unwrap_or(0);
        self.focus = Focus::Table;
    }

    fn export(&mut self, now: chrono::NaiveDateTime) {
        let Some(statement) = self.state.statement() else {
            self.status = Some("Nothing to export yet".to_string());
            return;
        };
        self.status = Some(match export_to_dir(&self.export_dir, &statement.transactions, now) {
            Ok(path) => {
                info!(path = %path.display(), "exported transactions");
                format!("Exported {} transactions to {}", statement.transactions.len(), path.display())
            }
            Err(e) => format!("Export failed: {e:#}"),
        });
    }
}

pub fn run(cfg: &Config, initial: Option<PathBuf>, handle: Handle) -> Result<()> {
    let service = Arc::new(cfg.service()?);
    let readiness = cfg.readiness();

    let mut app = App::new(cfg.export.directory.clone(), cfg.server.base_url.clone());
    if let Some(path) = initial {
        app.select_file(path);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, &mut app, &service, readiness, &handle);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    service: &Arc<HttpAnalysisService>,
    readiness: Readiness,
    handle: &Handle,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<AnalysisEvent>();

    loop {
        while let Ok(ev) = rx.try_recv() {
            app.apply(ev);
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key.code) {
                    Action::Quit => break,
                    Action::Analyze(req) => {
                        info!(file = %req.file.display(), "starting analysis");
                        worker::spawn_analysis(handle, service.clone(), readiness, req, tx.clone());
                    }
                    Action::None => {}
                }
            }
        }
    }

    Ok(())
}
