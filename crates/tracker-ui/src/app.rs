//! Main application state and TUI event loop for the E-Bill Tracker.
//!
//! [`App`] owns the stores, the active tab, the form fields and a cached
//! snapshot of everything derived from the reading log. Key handling is a
//! plain state transition ([`App::handle_key`]) so it can be exercised
//! without a terminal; [`App::run`] wraps it in the crossterm loop.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use tracing::{debug, info, warn};

use tracker_core::appliances::{estimate_monthly, Appliance, EstimateComparison};
use tracker_core::config::TrackerConfig;
use tracker_core::formatting::{format_currency, format_date, format_number, format_units};
use tracker_core::models::{Bucket, DateRange, DeltaWarning, Granularity, HistoryFilter, Reading};
use tracker_core::time_utils::{parse_reading_date, TimezoneHandler};
use tracker_core::{ErrorKind, TrackerError};
use tracker_data::aggregator::{available_years, ConsumptionEngine};
use tracker_data::analysis::{compare_month_to_estimate, summarize, UsageSummary};
use tracker_data::appliance_store::ApplianceStore;
use tracker_data::store::ReadingStore;

use crate::chart_view;
use crate::components::header::Header;
use crate::components::input::TextField;
use crate::table_view::{self, HistoryRow};
use crate::themes::Theme;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Top-level views, in the order they appear in the tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Log,
    History,
    Analytics,
    Appliances,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Log, Tab::History, Tab::Analytics, Tab::Appliances];

    /// Parse a `--view` value; unknown names open the log tab.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "history" => Tab::History,
            "analytics" => Tab::Analytics,
            "appliances" => Tab::Appliances,
            _ => Tab::Log,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Log => "Log Reading",
            Tab::History => "History",
            Tab::Analytics => "Analytics",
            Tab::Appliances => "Appliances",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── Status line ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One-line feedback shown under the active view until replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

// ── Modal dialogs ─────────────────────────────────────────────────────────────

/// Which view a custom date range applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeTarget {
    History,
    Analytics,
}

/// Dialog overlaying the active tab. While one is open it receives every key.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    None,
    /// First reset step: type the secret (masked).
    ResetSecret(TextField),
    /// Second reset step: the secret matched, ask y/n.
    ResetConfirm { secret: String },
    CustomRange {
        target: RangeTarget,
        start: TextField,
        end: TextField,
        /// 0 = start field, 1 = end field.
        focus: usize,
    },
}

/// Feedback for the reading just logged from the form.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedEntry {
    pub reading: Reading,
    /// `None` when no earlier reading exists to compare against.
    pub delta_units: Option<f64>,
    pub cost: Option<f64>,
    pub warning: Option<DeltaWarning>,
}

/// Granularities offered by the `g` key, in cycle order.
const GRANULARITY_CYCLE: [Granularity; 4] = [
    Granularity::Day,
    Granularity::Week,
    Granularity::Month,
    Granularity::Year,
];

fn next_granularity(current: Granularity) -> Granularity {
    GRANULARITY_CYCLE
        .iter()
        .position(|g| *g == current)
        .map(|i| GRANULARITY_CYCLE[(i + 1) % GRANULARITY_CYCLE.len()])
        .unwrap_or(Granularity::Day)
}

fn next_history_filter(current: HistoryFilter) -> HistoryFilter {
    match current {
        HistoryFilter::All => HistoryFilter::ThisMonth,
        HistoryFilter::ThisMonth => HistoryFilter::ThisYear,
        HistoryFilter::ThisYear | HistoryFilter::Custom(_) => HistoryFilter::All,
    }
}

fn describe_range(range: &DateRange) -> String {
    format!(
        "{} to {}",
        format_date(range.start()),
        format_date(range.end())
    )
}

/// Parse a numeric form field, naming the field in the error.
fn parse_number(label: &str, text: &str) -> tracker_core::Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::validation(format!("{} is required", label)));
    }
    trimmed.parse::<f64>().map_err(|_| {
        TrackerError::validation(format!("{} \"{}\" is not a number", label, trimmed))
    })
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    theme: Theme,
    timezone: String,
    clock: TimezoneHandler,
    today: NaiveDate,
    store: ReadingStore,
    appliance_store: ApplianceStore,
    engine: ConsumptionEngine,
    tab: Tab,

    // Snapshot of persisted state, refreshed after every write.
    readings: Vec<Reading>,
    appliances: Vec<Appliance>,

    // Derived from the snapshot.
    summary: UsageSummary,
    history_rows: Vec<HistoryRow>,
    buckets: Vec<Bucket>,
    years: Vec<i32>,

    // Log tab.
    log_fields: [TextField; 2],
    log_focus: usize,
    last_logged: Option<LoggedEntry>,

    // History tab.
    history_filter: HistoryFilter,

    // Analytics tab.
    granularity: Granularity,
    analytics_year: Option<i32>,

    // Appliances tab.
    appliance_fields: [TextField; 3],
    appliance_focus: usize,
    selected_appliance: usize,

    modal: Modal,
    status: Option<StatusMessage>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: &TrackerConfig,
        store: ReadingStore,
        appliance_store: ApplianceStore,
        theme_name: &str,
        timezone: impl Into<String>,
        today: NaiveDate,
        tab: Tab,
    ) -> Self {
        let engine = ConsumptionEngine::new(config);
        let timezone = timezone.into();
        let mut app = Self {
            theme: Theme::from_name(theme_name),
            clock: TimezoneHandler::new(&timezone),
            timezone,
            today,
            store,
            appliance_store,
            summary: summarize(&[], engine.unit_rate(), today),
            engine,
            tab,
            readings: Vec::new(),
            appliances: Vec::new(),
            history_rows: Vec::new(),
            buckets: Vec::new(),
            years: Vec::new(),
            log_fields: [
                TextField::new("Date")
                    .with_placeholder("DD-MM-YYYY")
                    .with_value(format_date(today)),
                TextField::new("Meter reading").with_placeholder("e.g. 1234.5"),
            ],
            log_focus: 1,
            last_logged: None,
            history_filter: HistoryFilter::All,
            granularity: Granularity::Month,
            analytics_year: None,
            appliance_fields: [
                TextField::new("Appliance").with_placeholder("e.g. Fridge"),
                TextField::new("Power (W)").with_placeholder("e.g. 150"),
                TextField::new("Hours per day").with_placeholder("0-24"),
            ],
            appliance_focus: 0,
            selected_appliance: 0,
            modal: Modal::None,
            status: None,
            should_quit: false,
        };
        app.reload();
        app
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Re-read both stores and recompute every derived view.
    pub fn reload(&mut self) {
        match self.store.list_readings(None) {
            Ok(readings) => self.readings = readings,
            Err(e) => self.report_error(&e),
        }
        match self.appliance_store.list() {
            Ok(appliances) => self.appliances = appliances,
            Err(e) => self.report_error(&e),
        }
        if self.selected_appliance >= self.appliances.len() {
            self.selected_appliance = self.appliances.len().saturating_sub(1);
        }
        self.refresh();
    }

    /// Move "today" forward when the calendar date changes under a running
    /// session. An untouched date field follows the new day.
    fn roll_date(&mut self, today: NaiveDate) {
        if today == self.today {
            return;
        }
        info!("date changed from {} to {}", self.today, today);
        if self.log_fields[0].value == format_date(self.today) {
            self.log_fields[0].value = format_date(today);
        }
        self.today = today;
        self.refresh();
    }

    fn refresh(&mut self) {
        let rate = self.engine.unit_rate();
        self.summary = summarize(&self.readings, rate, self.today);

        let range = self.history_filter.to_range(self.today);
        self.history_rows = table_view::build_history_rows(&self.readings, range.as_ref(), rate);

        self.years = available_years(&self.readings);
        if let Some(year) = self.analytics_year {
            if !self.years.contains(&year) {
                self.analytics_year = None;
            }
        }

        // Bucket the whole log so deltas crossing a year boundary are kept,
        // then narrow to the selected year.
        let mut buckets = self.engine.bucket_by(&self.readings, self.granularity);
        if let (Some(year), false) = (
            self.analytics_year,
            matches!(self.granularity, Granularity::Custom(_)),
        ) {
            buckets.retain(|b| b.start.year() == year);
        }
        self.buckets = buckets;
        debug!(
            "refreshed views: {} readings, {} history rows, {} buckets",
            self.readings.len(),
            self.history_rows.len(),
            self.buckets.len()
        );
    }

    fn report_error(&mut self, err: &TrackerError) {
        let status = match err.kind() {
            ErrorKind::Validation => {
                debug!("rejected input: {}", err);
                StatusMessage::warning(err.to_string())
            }
            ErrorKind::Authorization => StatusMessage::error(err.to_string()),
            ErrorKind::Persistence | ErrorKind::Config => {
                warn!("{}", err);
                StatusMessage::error(err.to_string())
            }
        };
        self.status = Some(status);
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            self.should_quit = true;
            return;
        }

        if !matches!(self.modal, Modal::None) {
            self.handle_modal_key(key);
            return;
        }

        if ctrl && key.code == KeyCode::Char('r') {
            self.modal = Modal::ResetSecret(TextField::new("Reset secret").masked());
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.tab = self.tab.next();
                return;
            }
            KeyCode::BackTab => {
                self.tab = self.tab.prev();
                return;
            }
            KeyCode::Esc => {
                self.status = None;
                return;
            }
            _ => {}
        }

        match self.tab {
            Tab::Log => self.handle_log_key(key),
            Tab::History => self.handle_history_key(key),
            Tab::Analytics => self.handle_analytics_key(key),
            Tab::Appliances => self.handle_appliance_key(key),
        }
    }

    fn handle_log_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Down => self.log_focus = 1 - self.log_focus,
            KeyCode::Enter if self.log_focus == 0 => self.log_focus = 1,
            KeyCode::Enter => self.submit_reading(),
            KeyCode::Backspace => self.log_fields[self.log_focus].backspace(),
            KeyCode::Char(c) => self.log_fields[self.log_focus].push(c),
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.history_filter = next_history_filter(self.history_filter);
                self.refresh();
            }
            KeyCode::Char('c') | KeyCode::Char('C') => self.open_custom_range(RangeTarget::History),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_analytics_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('g') | KeyCode::Char('G') => {
                self.granularity = next_granularity(self.granularity);
                self.refresh();
            }
            KeyCode::Char('[') => self.step_year(-1),
            KeyCode::Char(']') => self.step_year(1),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.open_custom_range(RangeTarget::Analytics)
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_appliance_key(&mut self, key: KeyEvent) {
        let field_count = self.appliance_fields.len();
        match key.code {
            KeyCode::Down => self.appliance_focus = (self.appliance_focus + 1) % field_count,
            KeyCode::Up => {
                self.appliance_focus = (self.appliance_focus + field_count - 1) % field_count
            }
            KeyCode::Enter if self.appliance_focus + 1 < field_count => self.appliance_focus += 1,
            KeyCode::Enter => self.submit_appliance(),
            KeyCode::PageDown => {
                if self.selected_appliance + 1 < self.appliances.len() {
                    self.selected_appliance += 1;
                }
            }
            KeyCode::PageUp => self.selected_appliance = self.selected_appliance.saturating_sub(1),
            KeyCode::Delete => self.remove_selected_appliance(),
            KeyCode::Backspace => self.appliance_fields[self.appliance_focus].backspace(),
            KeyCode::Char(c) => self.appliance_fields[self.appliance_focus].push(c),
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let modal = std::mem::replace(&mut self.modal, Modal::None);
        self.modal = match modal {
            Modal::None => Modal::None,

            Modal::ResetSecret(mut field) => match key.code {
                KeyCode::Esc => {
                    self.status = Some(StatusMessage::info("Reset cancelled"));
                    Modal::None
                }
                KeyCode::Enter => {
                    if self.store.verify_secret(&field.value) {
                        Modal::ResetConfirm {
                            secret: field.value,
                        }
                    } else {
                        warn!("reset prompt: incorrect secret entered");
                        self.report_error(&TrackerError::Authorization);
                        Modal::None
                    }
                }
                KeyCode::Backspace => {
                    field.backspace();
                    Modal::ResetSecret(field)
                }
                KeyCode::Char(c) => {
                    field.push(c);
                    Modal::ResetSecret(field)
                }
                _ => Modal::ResetSecret(field),
            },

            Modal::ResetConfirm { secret } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_reset(&secret);
                    Modal::None
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Enter => {
                    self.status = Some(StatusMessage::info("Reset cancelled"));
                    Modal::None
                }
                _ => Modal::ResetConfirm { secret },
            },

            Modal::CustomRange {
                target,
                mut start,
                mut end,
                focus,
            } => {
                let mut focus = focus;
                match key.code {
                    KeyCode::Esc => return,
                    KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                        focus = 1 - focus
                    }
                    KeyCode::Enter => {
                        match self.apply_custom_range(target, &start.value, &end.value) {
                            Ok(()) => return,
                            Err(e) => self.report_error(&e),
                        }
                    }
                    KeyCode::Backspace if focus == 0 => start.backspace(),
                    KeyCode::Backspace => end.backspace(),
                    KeyCode::Char(c) if focus == 0 => start.push(c),
                    KeyCode::Char(c) => end.push(c),
                    _ => {}
                }
                Modal::CustomRange {
                    target,
                    start,
                    end,
                    focus,
                }
            }
        };
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    fn submit_reading(&mut self) {
        let date_text = self.log_fields[0].value.clone();
        let value_text = self.log_fields[1].value.clone();

        match self.store.add_reading_input(&date_text, &value_text) {
            Ok(reading) => {
                // Latest existing reading on or before the new date; readings
                // are date-sorted with ties in log order.
                let previous = self
                    .readings
                    .iter()
                    .filter(|r| r.date <= reading.date)
                    .last()
                    .map(|r| r.value);
                let delta_units = previous.map(|p| reading.value - p);
                let warning = delta_units
                    .filter(|d| *d < 0.0)
                    .map(|delta| DeltaWarning::NegativeDelta { delta });

                self.status = Some(match &warning {
                    Some(w) => StatusMessage::warning(w.message()),
                    None => StatusMessage::success(format!(
                        "Recorded {} on {}",
                        format_number(reading.value, 2),
                        format_date(reading.date)
                    )),
                });
                self.last_logged = Some(LoggedEntry {
                    cost: delta_units.map(|d| self.engine.estimate_cost(d)),
                    reading,
                    delta_units,
                    warning,
                });
                self.log_fields[1].clear();
                self.log_focus = 1;
                self.reload();
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn confirm_reset(&mut self, secret: &str) {
        match self.store.reset_all(secret) {
            Ok(()) => {
                self.last_logged = None;
                self.reload();
                self.status = Some(StatusMessage::success("All readings have been erased"));
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn open_custom_range(&mut self, target: RangeTarget) {
        let month = DateRange::for_month_of(self.today);
        self.modal = Modal::CustomRange {
            target,
            start: TextField::new("From")
                .with_placeholder("DD-MM-YYYY")
                .with_value(format_date(month.start())),
            end: TextField::new("To")
                .with_placeholder("DD-MM-YYYY")
                .with_value(format_date(self.today)),
            focus: 0,
        };
    }

    fn apply_custom_range(
        &mut self,
        target: RangeTarget,
        start_text: &str,
        end_text: &str,
    ) -> tracker_core::Result<()> {
        let start = parse_reading_date(start_text)?;
        let end = parse_reading_date(end_text)?;
        let range = DateRange::new(start, end)?;

        match target {
            RangeTarget::History => self.history_filter = HistoryFilter::Custom(range),
            RangeTarget::Analytics => self.granularity = Granularity::Custom(range),
        }
        self.refresh();
        self.status = Some(StatusMessage::info(format!(
            "Showing {}",
            describe_range(&range)
        )));
        Ok(())
    }

    fn step_year(&mut self, step: isize) {
        if matches!(self.granularity, Granularity::Custom(_)) {
            self.granularity = Granularity::Month;
        }
        // Position 0 is "all years".
        let options: Vec<Option<i32>> = std::iter::once(None)
            .chain(self.years.iter().copied().map(Some))
            .collect();
        let current = options
            .iter()
            .position(|y| *y == self.analytics_year)
            .unwrap_or(0) as isize;
        let len = options.len() as isize;
        let next = (current + step).rem_euclid(len) as usize;
        self.analytics_year = options.get(next).copied().flatten();
        self.refresh();
    }

    fn submit_appliance(&mut self) {
        let name = self.appliance_fields[0].value.clone();
        let parsed = parse_number("power", &self.appliance_fields[1].value).and_then(|power| {
            parse_number("hours", &self.appliance_fields[2].value).map(|hours| (power, hours))
        });

        let result =
            parsed.and_then(|(power, hours)| self.appliance_store.add(&name, power, hours));
        match result {
            Ok(appliance) => {
                self.status = Some(StatusMessage::success(format!(
                    "Added {} ({}/month)",
                    appliance.name,
                    format_units(appliance.monthly_kwh())
                )));
                for field in &mut self.appliance_fields {
                    field.clear();
                }
                self.appliance_focus = 0;
                self.reload();
                self.selected_appliance = self.appliances.len().saturating_sub(1);
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn remove_selected_appliance(&mut self) {
        let Some(name) = self
            .appliances
            .get(self.selected_appliance)
            .map(|a| a.name.clone())
        else {
            return;
        };
        match self.appliance_store.remove(&name) {
            Ok(()) => {
                self.status = Some(StatusMessage::info(format!("Removed {}", name)));
                self.reload();
            }
            Err(e) => self.report_error(&e),
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Take over the terminal until the user quits.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout; the terminal is
    /// restored even when drawing fails.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        info!("UI started on the {} tab", self.tab.title());
        let result = self.event_loop(&mut terminal, Duration::from_millis(250));

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("UI closed");
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        while !self.should_quit {
            let today = self.clock.today();
            self.roll_date(today);
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let header = Header::new(self.engine.unit_rate(), &self.timezone, &self.theme);
        frame.render_widget(Paragraph::new(header.to_lines()), chunks[0]);

        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active)
            .divider(Span::styled("|", self.theme.separator));
        frame.render_widget(tabs, chunks[1]);

        match self.tab {
            Tab::Log => self.render_log_tab(frame, chunks[2]),
            Tab::History => self.render_history_tab(frame, chunks[2]),
            Tab::Analytics => self.render_analytics_tab(frame, chunks[2]),
            Tab::Appliances => self.render_appliances_tab(frame, chunks[2]),
        }

        if let Some(status) = &self.status {
            let style = match status.level {
                StatusLevel::Info => self.theme.info,
                StatusLevel::Success => self.theme.success,
                StatusLevel::Warning => self.theme.warning,
                StatusLevel::Error => self.theme.error,
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(status.text.clone(), style))),
                chunks[3],
            );
        }

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(self.help_text(), self.theme.dim))),
            chunks[4],
        );

        self.render_modal(frame, area);
    }

    fn help_text(&self) -> &'static str {
        match (&self.modal, self.tab) {
            (Modal::ResetSecret(_), _) => "Enter: continue | Esc: cancel",
            (Modal::ResetConfirm { .. }, _) => "y: erase everything | n: keep readings",
            (Modal::CustomRange { .. }, _) => "Tab: switch field | Enter: apply | Esc: cancel",
            (Modal::None, Tab::Log) => {
                "Enter: next/save | Up/Down: field | Tab: switch view | Ctrl+R: reset | Ctrl+C: quit"
            }
            (Modal::None, Tab::History) => "f: filter | c: custom range | Tab: switch view | q: quit",
            (Modal::None, Tab::Analytics) => {
                "g: granularity | [ ]: year | c: custom range | Tab: switch view | q: quit"
            }
            (Modal::None, Tab::Appliances) => {
                "Enter: next/add | Up/Down: field | PgUp/PgDn: select | Del: remove | Ctrl+C: quit"
            }
        }
    }

    fn label_value(&self, label: &str, value: String, value_style: Style) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:<20}", label), self.theme.label),
            Span::styled(value, value_style),
        ])
    }

    fn render_log_tab(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(4),
            ])
            .split(columns[0]);

        let form_active = matches!(self.modal, Modal::None);
        for (i, field) in self.log_fields.iter().enumerate() {
            field.render(frame, rows[i], form_active && self.log_focus == i, &self.theme);
        }

        let preview = match &self.last_logged {
            None => vec![Line::from(Span::styled(
                "Type the date and meter value, then press Enter.",
                self.theme.dim,
            ))],
            Some(entry) => {
                let mut lines = vec![
                    self.label_value("Date", format_date(entry.reading.date), self.theme.value),
                    self.label_value(
                        "Reading",
                        format_number(entry.reading.value, 2),
                        self.theme.value,
                    ),
                ];
                match (entry.delta_units, entry.cost) {
                    (Some(delta), Some(cost)) => {
                        let style = if entry.warning.is_some() {
                            self.theme.warning
                        } else {
                            self.theme.value
                        };
                        lines.push(self.label_value("Consumed", format_units(delta), style));
                        lines.push(self.label_value("Estimated cost", format_currency(cost), style));
                    }
                    _ => lines.push(Line::from(Span::styled(
                        "First reading: nothing to compare against yet.",
                        self.theme.dim,
                    ))),
                }
                if let Some(w) = &entry.warning {
                    lines.push(Line::from(Span::styled(w.message(), self.theme.warning)));
                }
                lines
            }
        };
        frame.render_widget(
            Paragraph::new(preview)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Last entry ")),
            rows[2],
        );

        frame.render_widget(
            Paragraph::new(self.summary_lines())
                .block(Block::default().borders(Borders::ALL).title(" Summary ")),
            columns[1],
        );
    }

    fn summary_lines(&self) -> Vec<Line<'static>> {
        let s = &self.summary;
        if !s.has_history() {
            return vec![Line::from(Span::styled(
                "No readings yet. Log your first meter reading to start.",
                self.theme.dim,
            ))];
        }
        let v = self.theme.value;
        let mut lines = vec![
            self.label_value(
                "Current reading",
                s.current_reading
                    .map(|r| format_number(r, 2))
                    .unwrap_or_else(|| "-".to_string()),
                v,
            ),
            self.label_value("This month", format_units(s.this_month_units), v),
            self.label_value("This month's bill", format_currency(s.this_month_cost), v),
            self.label_value("Total consumed", format_units(s.total_units), v),
            self.label_value("Total bill", format_currency(s.total_cost), v),
            self.label_value("Readings", s.readings_count.to_string(), v),
            self.label_value("Unit rate", format_currency(s.unit_rate), v),
        ];
        if s.warnings_count > 0 {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(
                    "{} reading(s) went backwards; check the History tab.",
                    s.warnings_count
                ),
                self.theme.warning,
            )));
        }
        lines
    }

    fn render_history_tab(&self, frame: &mut Frame, area: Rect) {
        let title = match self.history_filter {
            HistoryFilter::Custom(range) => format!("History: {}", describe_range(&range)),
            filter => format!("History: {}", filter.name()),
        };
        if self.history_rows.is_empty() {
            table_view::render_no_data(
                frame,
                area,
                &title,
                "Log readings on the first tab, or press 'f' to widen the filter.",
                &self.theme,
            );
        } else {
            table_view::render_history_table(frame, area, &title, &self.history_rows, &self.theme);
        }
    }

    fn render_analytics_tab(&self, frame: &mut Frame, area: Rect) {
        let title = match (self.granularity, self.analytics_year) {
            (Granularity::Custom(range), _) => format!("Consumption: {}", describe_range(&range)),
            (g, Some(year)) => format!("{} consumption, {}", g.name(), year),
            (g, None) => format!("{} consumption, all years", g.name()),
        };
        if self.buckets.is_empty() {
            table_view::render_no_data(
                frame,
                area,
                &title,
                "At least two readings are needed to measure consumption.",
                &self.theme,
            );
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        chart_view::render_usage_chart(frame, rows[0], &title, &self.buckets, &self.theme);
        table_view::render_bucket_table(frame, rows[1], "Breakdown", &self.buckets, &self.theme);
    }

    fn render_appliances_tab(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);
        let form_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(4),
            ])
            .split(columns[0]);

        let form_active = matches!(self.modal, Modal::None);
        for (i, field) in self.appliance_fields.iter().enumerate() {
            field.render(
                frame,
                form_rows[i],
                form_active && self.appliance_focus == i,
                &self.theme,
            );
        }

        let estimate = estimate_monthly(&self.appliances, self.engine.unit_rate());
        let v = self.theme.value;
        let mut lines = vec![
            self.label_value("Estimated usage", format_units(estimate.monthly_kwh), v),
            self.label_value("Estimated bill", format_currency(estimate.monthly_cost), v),
            Line::from(""),
        ];
        lines.push(match compare_month_to_estimate(&self.summary, &estimate) {
            EstimateComparison::NoUsageYet => Line::from(Span::styled(
                "No consumption recorded this month yet.",
                self.theme.dim,
            )),
            EstimateComparison::CloseToEstimate { actual_kwh } => Line::from(Span::styled(
                format!("This month: {}, in line with the estimate.", format_units(actual_kwh)),
                self.theme.success,
            )),
            EstimateComparison::AboveEstimate {
                actual_kwh,
                difference_kwh,
            } => Line::from(Span::styled(
                format!(
                    "This month: {}, {} above the estimate.",
                    format_units(actual_kwh),
                    format_units(difference_kwh)
                ),
                self.theme.warning,
            )),
            EstimateComparison::BelowEstimate {
                actual_kwh,
                difference_kwh,
            } => Line::from(Span::styled(
                format!(
                    "This month: {}, {} below the estimate.",
                    format_units(actual_kwh),
                    format_units(difference_kwh)
                ),
                self.theme.success,
            )),
        });
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Monthly estimate ")),
            form_rows[3],
        );

        let items: Vec<ListItem> = self
            .appliances
            .iter()
            .map(|a| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<18}", a.name), self.theme.text),
                    Span::styled(
                        format!(
                            "{:>8} W  {:>5} h/day  {:>14}",
                            format_number(a.power_watts, 0),
                            format_number(a.hours_per_day, 1),
                            format_units(a.monthly_kwh())
                        ),
                        self.theme.dim,
                    ),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Appliances ({}) ", self.appliances.len())),
            )
            .highlight_style(self.theme.tab_active)
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(if self.appliances.is_empty() {
            None
        } else {
            Some(self.selected_appliance)
        });
        frame.render_stateful_widget(list, columns[1], &mut state);
    }

    fn render_modal(&self, frame: &mut Frame, area: Rect) {
        match &self.modal {
            Modal::None => {}
            Modal::ResetSecret(field) => {
                let popup = centered_rect(50, 6, area);
                frame.render_widget(Clear, popup);
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.error)
                    .title(" Reset all readings ");
                let inner = block.inner(popup);
                frame.render_widget(block, popup);
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(1), Constraint::Length(3)])
                    .split(inner);
                frame.render_widget(
                    Paragraph::new(Span::styled("Enter the reset secret:", self.theme.text)),
                    rows[0],
                );
                field.render(frame, rows[1], true, &self.theme);
            }
            Modal::ResetConfirm { .. } => {
                let popup = centered_rect(50, 5, area);
                frame.render_widget(Clear, popup);
                frame.render_widget(
                    Paragraph::new(vec![
                        Line::from(Span::styled(
                            "Erase ALL readings? This cannot be undone.",
                            self.theme.warning,
                        )),
                        Line::from(""),
                        Line::from(Span::styled("[y] erase   [n] keep", self.theme.bold)),
                    ])
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(self.theme.error)
                            .title(" Confirm reset "),
                    ),
                    popup,
                );
            }
            Modal::CustomRange {
                start, end, focus, ..
            } => {
                let popup = centered_rect(40, 8, area);
                frame.render_widget(Clear, popup);
                let block = Block::default()
                    .borders(Borders::ALL)
                    .title(" Custom date range ");
                let inner = block.inner(popup);
                frame.render_widget(block, popup);
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Length(3)])
                    .split(inner);
                start.render(frame, rows[0], *focus == 0, &self.theme);
                end.render(frame, rows[1], *focus == 1, &self.theme);
            }
        }
    }
}

/// A `width` x `height` rectangle centred in `area`, clipped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn app_in(tmp: &TempDir, tab: Tab) -> App {
        let config = TrackerConfig::default();
        let store = ReadingStore::in_dir(tmp.path(), &config);
        let appliances = ApplianceStore::in_dir(tmp.path());
        App::new(&config, store, appliances, "dark", "UTC", d(2024, 2, 15), tab)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn log_reading(app: &mut App, date: &str, value: &str) {
        press(app, KeyCode::Up);
        for _ in 0..20 {
            press(app, KeyCode::Backspace);
        }
        type_text(app, date);
        press(app, KeyCode::Enter);
        for _ in 0..20 {
            press(app, KeyCode::Backspace);
        }
        type_text(app, value);
        press(app, KeyCode::Enter);
    }

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    // ── Tab ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_tab_from_name() {
        assert_eq!(Tab::from_name("history"), Tab::History);
        assert_eq!(Tab::from_name("Analytics"), Tab::Analytics);
        assert_eq!(Tab::from_name("appliances"), Tab::Appliances);
        assert_eq!(Tab::from_name("bogus"), Tab::Log);
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Log.next(), Tab::History);
        assert_eq!(Tab::Appliances.next(), Tab::Log);
        assert_eq!(Tab::Log.prev(), Tab::Appliances);
    }

    #[test]
    fn test_tab_key_switches_view() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab(), Tab::History);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.tab(), Tab::Log);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        ctrl(&mut app, 'c');
        assert!(app.should_quit());
    }

    #[test]
    fn test_q_types_on_log_but_quits_on_history() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit());
        assert_eq!(app.log_fields[1].value, "q");

        let mut app = app_in(&tmp, Tab::History);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    // ── Logging readings ──────────────────────────────────────────────────────

    #[test]
    fn test_log_form_defaults_date_to_today() {
        let tmp = TempDir::new().unwrap();
        let app = app_in(&tmp, Tab::Log);
        assert_eq!(app.log_fields[0].value, "15-02-2024");
        assert_eq!(app.log_focus, 1);
    }

    #[test]
    fn test_date_rollover_moves_filters_and_form_date() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::History);
        app.store.add_reading(d(2024, 2, 1), 100.0).unwrap();
        app.store.add_reading(d(2024, 3, 1), 150.0).unwrap();
        app.history_filter = HistoryFilter::ThisMonth;
        app.reload();
        assert_eq!(app.history_rows.len(), 1);
        assert_eq!(app.history_rows[0].date, d(2024, 2, 1));

        app.roll_date(d(2024, 3, 1));
        assert_eq!(app.history_rows.len(), 1);
        assert_eq!(app.history_rows[0].date, d(2024, 3, 1));
        assert_eq!(app.log_fields[0].value, "01-03-2024");
    }

    #[test]
    fn test_date_rollover_keeps_edited_form_date() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        app.log_fields[0].value = "10-02-2024".to_string();
        app.roll_date(d(2024, 2, 16));
        assert_eq!(app.today, d(2024, 2, 16));
        assert_eq!(app.log_fields[0].value, "10-02-2024");
    }

    #[test]
    fn test_submit_reading_persists_and_previews() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);

        type_text(&mut app, "100");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status().unwrap().level, StatusLevel::Success);
        assert_eq!(app.last_logged.as_ref().unwrap().delta_units, None);

        type_text(&mut app, "150");
        press(&mut app, KeyCode::Enter);
        let entry = app.last_logged.clone().unwrap();
        assert_eq!(entry.delta_units, Some(50.0));
        assert_eq!(entry.cost, Some(600.0));
        assert!(app.log_fields[1].value.is_empty());

        assert_eq!(app.store.list_readings(None).unwrap().len(), 2);
        assert_eq!(app.summary.this_month_units, 50.0);
    }

    #[test]
    fn test_negative_delta_warns_but_saves() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        log_reading(&mut app, "01-02-2024", "500");
        log_reading(&mut app, "10-02-2024", "480");

        let status = app.status().unwrap();
        assert_eq!(status.level, StatusLevel::Warning);
        assert!(status.text.contains("decreased"));
        assert_eq!(app.readings.len(), 2);
        assert_eq!(app.summary.warnings_count, 1);
    }

    #[test]
    fn test_backdated_reading_compares_with_earlier_one() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        log_reading(&mut app, "01-01-2024", "100");
        log_reading(&mut app, "01-03-2024", "300");
        log_reading(&mut app, "01-02-2024", "180");

        assert_eq!(app.last_logged.as_ref().unwrap().delta_units, Some(80.0));
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);

        log_reading(&mut app, "31-02-2024", "100");
        assert_eq!(app.status().unwrap().level, StatusLevel::Warning);

        log_reading(&mut app, "01-02-2024", "abc");
        assert!(app.status().unwrap().text.contains("not a number"));

        log_reading(&mut app, "01-02-2024", "-5");
        assert!(app.readings.is_empty());
        assert!(!app.store.path().exists());
    }

    // ── Reset ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_reset_wrong_secret_keeps_readings() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        log_reading(&mut app, "01-02-2024", "100");

        ctrl(&mut app, 'r');
        type_text(&mut app, "guess");
        assert!(matches!(&app.modal, Modal::ResetSecret(f) if f.display_value() == "•••••"));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.modal, Modal::None);
        assert_eq!(app.status().unwrap().level, StatusLevel::Error);
        assert_eq!(app.readings.len(), 1);
    }

    #[test]
    fn test_reset_needs_confirmation() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        log_reading(&mut app, "01-02-2024", "100");

        ctrl(&mut app, 'r');
        type_text(&mut app, "reset123");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.modal, Modal::ResetConfirm { .. }));

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.modal, Modal::None);
        assert_eq!(app.readings.len(), 1);

        ctrl(&mut app, 'r');
        type_text(&mut app, "reset123");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('y'));
        assert!(app.readings.is_empty());
        assert!(app.store.list_readings(None).unwrap().is_empty());
        assert_eq!(app.status().unwrap().level, StatusLevel::Success);
    }

    #[test]
    fn test_reset_modal_swallows_tab_key() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        ctrl(&mut app, 'r');
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab(), Tab::Log);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.modal, Modal::None);
    }

    // ── History ───────────────────────────────────────────────────────────────

    #[test]
    fn test_history_filter_cycle() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        log_reading(&mut app, "20-12-2023", "50");
        log_reading(&mut app, "10-01-2024", "100");
        log_reading(&mut app, "10-02-2024", "150");
        press(&mut app, KeyCode::Tab);

        assert_eq!(app.history_rows.len(), 3);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.history_filter, HistoryFilter::ThisMonth);
        assert_eq!(app.history_rows.len(), 1);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.history_rows.len(), 2);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.history_filter, HistoryFilter::All);
    }

    #[test]
    fn test_custom_range_inverted_stays_open() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::History);
        press(&mut app, KeyCode::Char('c'));
        for _ in 0..12 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "01-03-2024");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.modal, Modal::CustomRange { .. }));
        assert_eq!(app.status().unwrap().level, StatusLevel::Warning);
        assert_eq!(app.history_filter, HistoryFilter::All);
    }

    #[test]
    fn test_custom_range_applies_to_history() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::History);
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Enter);

        let expected = DateRange::new(d(2024, 2, 1), d(2024, 2, 15)).unwrap();
        assert_eq!(app.modal, Modal::None);
        assert_eq!(app.history_filter, HistoryFilter::Custom(expected));
    }

    // ── Analytics ─────────────────────────────────────────────────────────────

    #[test]
    fn test_granularity_cycle() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Analytics);
        assert_eq!(app.granularity, Granularity::Month);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.granularity, Granularity::Year);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.granularity, Granularity::Day);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.granularity, Granularity::Week);
    }

    #[test]
    fn test_year_filter_keeps_cross_year_delta() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        log_reading(&mut app, "01-12-2023", "100");
        log_reading(&mut app, "15-12-2023", "130");
        log_reading(&mut app, "05-01-2024", "170");
        app.tab = Tab::Analytics;

        assert_eq!(app.buckets.len(), 2);
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.analytics_year, Some(2023));
        assert_eq!(app.buckets.len(), 1);
        assert_eq!(app.buckets[0].total_units, 30.0);

        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.analytics_year, Some(2024));
        assert_eq!(app.buckets[0].total_units, 40.0);

        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.analytics_year, None);
        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.analytics_year, Some(2024));
    }

    // ── Appliances ────────────────────────────────────────────────────────────

    #[test]
    fn test_add_and_remove_appliance() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Appliances);

        type_text(&mut app, "Fridge");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "150");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "24");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.appliances.len(), 1);
        assert!(app.appliance_fields.iter().all(|f| f.value.is_empty()));
        assert!(app.status().unwrap().text.contains("Fridge"));

        press(&mut app, KeyCode::Delete);
        assert!(app.appliances.is_empty());
        assert!(app.appliance_store.list().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_appliance_reports_error() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Appliances);
        type_text(&mut app, "Heater");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "lots");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "2");
        press(&mut app, KeyCode::Enter);

        assert!(app.status().unwrap().text.contains("power"));
        assert!(app.appliances.is_empty());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("power", " 60 ").unwrap(), 60.0);
        assert!(parse_number("power", "").is_err());
        assert!(parse_number("hours", "two").is_err());
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn test_render_every_tab() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        log_reading(&mut app, "01-02-2024", "100");
        log_reading(&mut app, "10-02-2024", "150");

        let log = screen(&app, 120, 30);
        assert!(log.contains("E-BILL TRACKER"));
        assert!(log.contains("₹600.00"));

        app.tab = Tab::History;
        assert!(screen(&app, 120, 30).contains("10-02-2024"));

        app.tab = Tab::Analytics;
        assert!(screen(&app, 120, 30).contains("February 2024"));

        app.tab = Tab::Appliances;
        assert!(screen(&app, 120, 30).contains("Appliances (0)"));
    }

    #[test]
    fn test_render_empty_history() {
        let tmp = TempDir::new().unwrap();
        let app = app_in(&tmp, Tab::History);
        assert!(screen(&app, 100, 24).contains("No readings found"));
    }

    #[test]
    fn test_render_reset_prompt_masks_secret() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp, Tab::Log);
        ctrl(&mut app, 'r');
        type_text(&mut app, "reset123");

        let text = screen(&app, 100, 30);
        assert!(text.contains("Reset all readings"));
        assert!(!text.contains("reset123"));
    }

    #[test]
    fn test_centered_rect_clips() {
        let area = Rect::new(0, 0, 30, 4);
        let r = centered_rect(50, 6, area);
        assert_eq!((r.width, r.height), (30, 4));
        let r = centered_rect(10, 2, Rect::new(0, 0, 30, 10));
        assert_eq!((r.x, r.y), (10, 4));
    }
}
