use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Local};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use log::warn;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs};
use ratatui::{Frame, Terminal};

use crate::catalog::Category;
use crate::config::Settings;
use crate::domain::{Entry, EntryDraft, EntryStore, check_description, check_owner, check_title, parse_entry_date};
use crate::logbooks::{recent_logbooks, remember_logbook};
use crate::stats::Statistics;
use crate::storage::{EntryRepository, FileRepository};
use crate::window::Window;

const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);
const CATEGORY_BAR_WIDTH: usize = 24;

pub fn run_dashboard(
	store: &mut EntryStore<FileRepository>,
	logbook_path: &mut PathBuf,
	settings: &Settings,
) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, store, logbook_path, settings);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	store: &mut EntryStore<FileRepository>,
	logbook_path: &mut PathBuf,
	settings: &Settings,
) -> Result<(), Box<dyn Error>> {
	let mut app = App::new(settings);

	loop {
		let now = Local::now();
		let view = build_view(&app, store.list(), now);
		app.clamp_selection(&view);
		terminal.draw(|frame| draw_dashboard(frame, &app, &view, logbook_path.as_path()))?;

		if event::poll(StdDuration::from_millis(250))? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				let should_quit = match &app.mode {
					InputMode::Prompt(_) => handle_prompt_key(&mut app, key.code),
					InputMode::Select(_) => handle_select_key(&mut app, key.code, store, logbook_path),
					InputMode::Normal => handle_normal_key(&mut app, key.code, store, logbook_path, &view),
				};

				if should_quit {
					break;
				}
			}
		}
	}

	Ok(())
}

fn draw_dashboard(frame: &mut Frame, app: &App, view: &ViewModel, logbook_path: &Path) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(4)])
		.split(frame.area());

	let tabs = Tabs::new(vec!["Entries", "Statistics"])
		.select(app.tab.index())
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(format!("Logbook: {}", logbook_path.display())),
		)
		.highlight_style(
			Style::default()
				.fg(FOCUSED_PANEL_BORDER_COLOR)
				.add_modifier(Modifier::BOLD),
		);
	frame.render_widget(tabs, layout[0]);

	match app.tab {
		Tab::Entries => render_entries_panel(frame, layout[1], app, view),
		Tab::Statistics => render_stats_panel(frame, layout[1], view),
	}
	render_footer(frame, layout[2], app);

	if let InputMode::Select(select) = &app.mode {
		render_select_popup(frame, select);
	}
}

fn render_entries_panel(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	let items = if view.entry_rows.is_empty() {
		vec![ListItem::new("(no entries in the logbook, press a to add one)")]
	} else {
		view.entry_rows
			.iter()
			.map(|row| ListItem::new(row.line.clone()))
			.collect::<Vec<_>>()
	};

	let mut state = ListState::default();
	if !view.entry_rows.is_empty() {
		state.select(Some(app.entry_index.min(view.entry_rows.len() - 1)));
	}

	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(format!("Entries ({})", view.entry_rows.len())),
		)
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR).add_modifier(Modifier::BOLD));

	frame.render_stateful_widget(list, area, &mut state);
}

fn render_stats_panel(frame: &mut Frame, area: Rect, view: &ViewModel) {
	let body = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
		.split(area);

	let stats = &view.stats;
	let mut lines = vec![
		Line::from(Span::styled(
			view.window_label.clone(),
			Style::default().add_modifier(Modifier::BOLD),
		)),
		Line::from(Span::styled(view.caption.clone(), Style::default().fg(Color::DarkGray))),
		Line::from(format!(
			"{} entries | {} completed | {} pending",
			stats.entry_count, stats.completed, stats.pending
		)),
		Line::from(""),
	];

	if stats.is_empty() {
		lines.push(Line::from("No data to show"));
	} else {
		lines.push(Line::from(Span::styled(
			format!("{:<18} {:>5} {:>9} {:>7} {:>5}", "Owner", "Total", "Completed", "Pending", "%"),
			Style::default().add_modifier(Modifier::UNDERLINED),
		)));
		for row in &stats.owners {
			let percent = row.completion_percent();
			lines.push(Line::from(vec![
				Span::raw(format!(
					"{:<18} {:>5} {:>9} {:>7} ",
					truncate(&row.owner, 18),
					row.total,
					row.completed,
					row.pending
				)),
				Span::styled(format!("{percent:>4}%"), percent_style(percent)),
			]));
		}
	}

	let owners = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("By Owner"));
	frame.render_widget(owners, body[0]);

	let mut category_lines = Vec::new();
	if stats.categories.is_empty() {
		category_lines.push(Line::from("(none)"));
	}
	let max_count = stats.categories.first().map(|row| row.count).unwrap_or(0);
	for row in &stats.categories {
		category_lines.push(Line::from(vec![
			Span::styled(format!("{:<16}", row.category.label()), category_style(row.category)),
			Span::raw(format!("{:>4} ", row.count)),
			Span::styled(
				"=".repeat(bar_width(row.count, max_count, CATEGORY_BAR_WIDTH)),
				category_style(row.category),
			),
		]));
	}

	let categories = Paragraph::new(category_lines)
		.block(Block::default().borders(Borders::ALL).title("By Category"));
	frame.render_widget(categories, body[1]);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
	let footer_lines = match &app.mode {
		InputMode::Normal => vec![
			Line::from("Tab switch view | arrows/jk move | space complete/reopen | a new entry | w window | g switch logbook | q quit"),
			Line::from(format!("Window: {:?} | {}", app.window, app.status)),
		],
		InputMode::Prompt(prompt) => vec![
			Line::from(prompt.title.clone()),
			Line::from(format!("> {}", prompt.input)),
			Line::from(format!("Enter submit | Esc cancel | {}", app.status)),
		],
		InputMode::Select(select) => vec![
			Line::from(select.title.clone()),
			Line::from(format!(
				"Selected: {}",
				select
					.selected_option()
					.map(|option| option.label.as_str())
					.unwrap_or("(none)")
			)),
			Line::from(format!("j/k or arrows move | Enter choose | Esc cancel | {}", app.status)),
		],
	};

	let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn render_select_popup(frame: &mut Frame, select: &SelectState) {
	let area = centered_rect(50, 50, frame.area());
	frame.render_widget(Clear, area);

	let items = if select.options.is_empty() {
		vec![ListItem::new("(no choices)")]
	} else {
		select
			.options
			.iter()
			.map(|option| ListItem::new(option.label.clone()).style(option.style))
			.collect::<Vec<_>>()
	};

	let current = if select.options.is_empty() {
		0
	} else {
		select.selected.saturating_add(1)
	};
	let total = select.options.len();
	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(format!("{} ({current}/{total})", select.title)),
		)
		.highlight_symbol(">> ")
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR));

	let mut state = ListState::default();
	if !select.options.is_empty() {
		state.select(Some(select.selected.min(select.options.len().saturating_sub(1))));
	}
	frame.render_stateful_widget(list, area, &mut state);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
	let popup_layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([
			Constraint::Percentage((100 - percent_y) / 2),
			Constraint::Percentage(percent_y),
			Constraint::Percentage((100 - percent_y) / 2),
		])
		.split(area);
	Layout::default()
		.direction(Direction::Horizontal)
		.constraints([
			Constraint::Percentage((100 - percent_x) / 2),
			Constraint::Percentage(percent_x),
			Constraint::Percentage((100 - percent_x) / 2),
		])
		.split(popup_layout[1])[1]
}

fn handle_normal_key(
	app: &mut App,
	code: KeyCode,
	store: &mut EntryStore<FileRepository>,
	logbook_path: &mut PathBuf,
	view: &ViewModel,
) -> bool {
	match code {
		KeyCode::Char('q') | KeyCode::Esc => true,
		KeyCode::Tab | KeyCode::BackTab => {
			app.tab = app.tab.toggle();
			false
		}
		KeyCode::Up | KeyCode::Char('k') => {
			app.move_entry_selection(-1, view);
			false
		}
		KeyCode::Down | KeyCode::Char('j') => {
			app.move_entry_selection(1, view);
			false
		}
		KeyCode::Char('w') => {
			app.window = app.window.next();
			app.status = format!("window: {:?}", app.window);
			false
		}
		KeyCode::Char('a') => {
			app.mode = InputMode::Prompt(PromptState::new("Title", PromptKind::Title));
			app.status = "New entry".to_string();
			false
		}
		KeyCode::Char('g') => {
			match build_logbook_switch_select(logbook_path.as_path()) {
				Ok(select) => app.mode = InputMode::Select(select),
				Err(err) => app.status = err,
			}
			false
		}
		KeyCode::Char(' ') => {
			if app.tab != Tab::Entries {
				app.status = "Switch to Entries to complete an entry".to_string();
				return false;
			}
			app.status = match app.selected_entry_id(view) {
				Some(id) => match toggle_entry(store, &id) {
					Ok(message) => message,
					Err(err) => format!("error: {err}"),
				},
				None => "No entry selected".to_string(),
			};
			false
		}
		_ => false,
	}
}

fn handle_prompt_key(app: &mut App, code: KeyCode) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Input cancelled".to_string();
		}
		KeyCode::Backspace => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.pop();
			}
		}
		KeyCode::Char(value) => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.push(value);
			}
		}
		KeyCode::Enter => {
			let prompt = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Prompt(prompt) => prompt,
				InputMode::Normal | InputMode::Select(_) => return false,
			};

			match submit_prompt(prompt.clone(), &app.owners) {
				Ok(PromptOutcome::NextPrompt(next_prompt)) => {
					app.mode = InputMode::Prompt(next_prompt);
					app.status.clear();
				}
				Ok(PromptOutcome::Select(select)) => {
					app.mode = InputMode::Select(select);
					app.status.clear();
				}
				Err(err) => {
					app.mode = InputMode::Prompt(prompt);
					app.status = format!("error: {err}");
				}
			}
		}
		_ => {}
	}

	false
}

fn handle_select_key(
	app: &mut App,
	code: KeyCode,
	store: &mut EntryStore<FileRepository>,
	logbook_path: &mut PathBuf,
) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Selection cancelled".to_string();
		}
		KeyCode::Up | KeyCode::Char('k') => {
			if let InputMode::Select(select) = &mut app.mode {
				select.move_selection(-1);
			}
		}
		KeyCode::Down | KeyCode::Char('j') => {
			if let InputMode::Select(select) = &mut app.mode {
				select.move_selection(1);
			}
		}
		KeyCode::Enter => {
			let select = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Select(select) => select,
				_ => return false,
			};

			match submit_select(select.clone(), store, logbook_path) {
				Ok(SelectOutcome::NextPrompt(prompt)) => app.mode = InputMode::Prompt(prompt),
				Ok(SelectOutcome::NextSelect(next_select)) => app.mode = InputMode::Select(next_select),
				Ok(SelectOutcome::Done(message)) => {
					app.mode = InputMode::Normal;
					app.status = message;
				}
				Err(err) => {
					app.mode = InputMode::Select(select);
					app.status = format!("error: {err}");
				}
			}
		}
		_ => {}
	}

	false
}

fn submit_prompt(prompt: PromptState, owners: &[String]) -> Result<PromptOutcome, String> {
	match prompt.kind {
		PromptKind::Title => {
			let title = check_title(&prompt.input).map_err(|err| err.to_string())?;
			Ok(PromptOutcome::NextPrompt(PromptState::new(
				"Description",
				PromptKind::Description {
					draft: EntryDraft {
						title,
						..EntryDraft::default()
					},
				},
			)))
		}
		PromptKind::Description { mut draft } => {
			draft.description = check_description(&prompt.input).map_err(|err| err.to_string())?;
			let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
			Ok(PromptOutcome::NextPrompt(
				PromptState::new("Activity date (YYYY-MM-DD)", PromptKind::Date { draft }).with_input(today),
			))
		}
		PromptKind::Date { mut draft } => {
			let raw = prompt.input.trim();
			if raw.is_empty() {
				return Err("date is required".to_string());
			}
			draft.date = Some(parse_entry_date(raw).ok_or_else(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))?);
			Ok(PromptOutcome::Select(build_owner_select(owners, draft)))
		}
		PromptKind::Owner { mut draft } => {
			draft.owner = check_owner(&prompt.input).map_err(|err| err.to_string())?;
			Ok(PromptOutcome::Select(build_category_select(draft)))
		}
	}
}

fn submit_select(
	select: SelectState,
	store: &mut EntryStore<FileRepository>,
	logbook_path: &mut PathBuf,
) -> Result<SelectOutcome, String> {
	let selected_value = select
		.selected_option()
		.map(|option| option.value.clone())
		.ok_or_else(|| "no option selected".to_string())?;

	match select.kind {
		SelectKind::Owner { mut draft } => match selected_value {
			Some(owner) => {
				draft.owner = owner;
				Ok(SelectOutcome::NextSelect(build_category_select(draft)))
			}
			None => Ok(SelectOutcome::NextPrompt(PromptState::new(
				"Owner name",
				PromptKind::Owner { draft },
			))),
		},
		SelectKind::Category { mut draft } => {
			let key = selected_value.ok_or_else(|| "selected category is missing".to_string())?;
			draft.category = Category::from_key(&key);
			create_entry(store, draft).map(SelectOutcome::Done)
		}
		SelectKind::LogbookSwitch => {
			let selected_path = selected_value
				.map(PathBuf::from)
				.ok_or_else(|| "selected logbook path is missing".to_string())?;
			switch_logbook(store, logbook_path, selected_path).map(SelectOutcome::Done)
		}
	}
}

fn build_owner_select(owners: &[String], draft: EntryDraft) -> SelectState {
	let mut options = owners
		.iter()
		.map(|owner| SelectOption::new(owner.clone(), Some(owner.clone()), Style::default()))
		.collect::<Vec<_>>();
	options.push(SelectOption::new(
		"Someone else...",
		None,
		Style::default().fg(Color::DarkGray),
	));
	SelectState::new("Owner", SelectKind::Owner { draft }, options)
}

fn build_category_select(draft: EntryDraft) -> SelectState {
	let options = Category::ALL
		.into_iter()
		.map(|category| {
			SelectOption::new(
				category.label(),
				Some(category.key().to_string()),
				category_style(category),
			)
		})
		.collect::<Vec<_>>();
	SelectState::new("Category", SelectKind::Category { draft }, options)
}

fn build_logbook_switch_select(current_path: &Path) -> Result<SelectState, String> {
	let options = recent_logbooks(20)
		.map_err(|err| format!("failed to read recent logbooks: {err}"))?
		.into_iter()
		.filter(|path| path != current_path)
		.map(|path| {
			let label = path.display().to_string();
			SelectOption::new(label.clone(), Some(label), Style::default())
		})
		.collect::<Vec<_>>();

	if options.is_empty() {
		return Err("No other recent logbooks".to_string());
	}

	Ok(SelectState::new("Switch logbook", SelectKind::LogbookSwitch, options))
}

fn create_entry<R: EntryRepository>(store: &mut EntryStore<R>, draft: EntryDraft) -> Result<String, String> {
	let entry = store.create(draft).map_err(|err| err.to_string())?;
	Ok(with_save_warning(store, format!("created entry: {}", entry.title)))
}

fn toggle_entry<R: EntryRepository>(store: &mut EntryStore<R>, id: &str) -> Result<String, String> {
	let entry = store.toggle_complete(id).map_err(|err| err.to_string())?;
	Ok(with_save_warning(
		store,
		format!("{}: {}", entry.title, entry.status_label().to_lowercase()),
	))
}

fn with_save_warning<R: EntryRepository>(store: &EntryStore<R>, message: String) -> String {
	if store.has_unsaved_changes() {
		format!("{message} (not saved, see log)")
	} else {
		message
	}
}

fn switch_logbook(
	store: &mut EntryStore<FileRepository>,
	logbook_path: &mut PathBuf,
	next_path: PathBuf,
) -> Result<String, String> {
	let next_store = EntryStore::open(FileRepository::new(&next_path)).map_err(|err| err.to_string())?;
	let previous = std::mem::replace(store, next_store);
	if let Err(err) = previous.close() {
		warn!("failed to save {} before switching: {err}", logbook_path.display());
	}

	*logbook_path = next_path;
	if let Err(err) = remember_logbook(logbook_path) {
		warn!("failed to store recent logbook: {err}");
	}
	Ok(format!("switched to {}", logbook_path.display()))
}

fn build_view(app: &App, entries: &[Entry], now: DateTime<Local>) -> ViewModel {
	let entry_rows = entries
		.iter()
		.map(|entry| EntryRow {
			id: entry.id.clone(),
			line: entry_line(entry),
		})
		.collect();

	ViewModel {
		entry_rows,
		stats: Statistics::compute(entries, app.window, &now),
		window_label: app.window.label(now.date_naive()),
		caption: format!("as of {}", now.format("%d/%m/%Y %H:%M")),
	}
}

fn entry_line(entry: &Entry) -> Line<'static> {
	let status_style = if entry.completed {
		Style::default().fg(Color::Green)
	} else {
		Style::default().fg(Color::Red)
	};

	Line::from(vec![
		Span::raw(format!("{} | ", entry.date_label())),
		Span::styled(entry.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
		Span::raw(format!(" | {} | ", entry.owner)),
		Span::styled(entry.category.label(), category_style(entry.category)),
		Span::raw(" | "),
		Span::styled(entry.status_label(), status_style),
	])
}

fn category_style(category: Category) -> Style {
	let color = match category {
		Category::Mail => Color::Blue,
		Category::CulturalGroups => Color::Magenta,
		Category::Event => Color::Yellow,
		Category::Report => Color::LightRed,
		Category::Meeting => Color::Green,
	};
	Style::default().fg(color)
}

fn percent_style(percent: u32) -> Style {
	match percent {
		0..=33 => Style::default().fg(Color::Red),
		34..=66 => Style::default().fg(Color::Yellow),
		_ => Style::default().fg(Color::Green),
	}
}

fn bar_width(count: usize, max_count: usize, width: usize) -> usize {
	if count == 0 || max_count == 0 {
		return 0;
	}
	((count as f64 / max_count as f64) * width as f64).round().max(1.0) as usize
}

fn truncate(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}
	let mut out = text.chars().take(max_chars.saturating_sub(1)).collect::<String>();
	out.push('~');
	out
}

#[derive(Debug, Clone)]
enum PromptOutcome {
	NextPrompt(PromptState),
	Select(SelectState),
}

#[derive(Debug, Clone)]
enum SelectOutcome {
	NextPrompt(PromptState),
	NextSelect(SelectState),
	Done(String),
}

#[derive(Debug, Clone)]
struct PromptState {
	title: String,
	input: String,
	kind: PromptKind,
}

impl PromptState {
	fn new(title: impl Into<String>, kind: PromptKind) -> Self {
		Self {
			title: title.into(),
			input: String::new(),
			kind,
		}
	}

	fn with_input(mut self, input: impl Into<String>) -> Self {
		self.input = input.into();
		self
	}
}

#[derive(Debug, Clone)]
struct SelectState {
	title: String,
	options: Vec<SelectOption>,
	selected: usize,
	kind: SelectKind,
}

impl SelectState {
	fn new(title: impl Into<String>, kind: SelectKind, options: Vec<SelectOption>) -> Self {
		Self {
			title: title.into(),
			options,
			selected: 0,
			kind,
		}
	}

	fn move_selection(&mut self, delta: i32) {
		if self.options.is_empty() {
			self.selected = 0;
			return;
		}

		let max_index = self.options.len() as i32 - 1;
		self.selected = (self.selected as i32 + delta).clamp(0, max_index) as usize;
	}

	fn selected_option(&self) -> Option<&SelectOption> {
		self.options.get(self.selected)
	}
}

#[derive(Debug, Clone)]
struct SelectOption {
	label: String,
	value: Option<String>,
	style: Style,
}

impl SelectOption {
	fn new(label: impl Into<String>, value: Option<String>, style: Style) -> Self {
		Self {
			label: label.into(),
			value,
			style,
		}
	}
}

/// Steps of the new-entry form; each carries the draft built so far.
#[derive(Debug, Clone)]
enum PromptKind {
	Title,
	Description { draft: EntryDraft },
	Date { draft: EntryDraft },
	Owner { draft: EntryDraft },
}

#[derive(Debug, Clone)]
enum SelectKind {
	Owner { draft: EntryDraft },
	Category { draft: EntryDraft },
	LogbookSwitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
	Entries,
	Statistics,
}

impl Tab {
	fn toggle(self) -> Self {
		match self {
			Tab::Entries => Tab::Statistics,
			Tab::Statistics => Tab::Entries,
		}
	}

	fn index(self) -> usize {
		match self {
			Tab::Entries => 0,
			Tab::Statistics => 1,
		}
	}
}

#[derive(Debug, Clone)]
enum InputMode {
	Normal,
	Prompt(PromptState),
	Select(SelectState),
}

#[derive(Debug, Clone)]
struct App {
	tab: Tab,
	entry_index: usize,
	window: Window,
	owners: Vec<String>,
	mode: InputMode,
	status: String,
}

impl App {
	fn new(settings: &Settings) -> Self {
		Self {
			tab: Tab::Entries,
			entry_index: 0,
			window: settings.default_window,
			owners: settings.owners.clone(),
			mode: InputMode::Normal,
			status: "Ready".to_string(),
		}
	}

	fn clamp_selection(&mut self, view: &ViewModel) {
		if view.entry_rows.is_empty() {
			self.entry_index = 0;
		} else {
			self.entry_index = self.entry_index.min(view.entry_rows.len() - 1);
		}
	}

	fn move_entry_selection(&mut self, delta: i32, view: &ViewModel) {
		if view.entry_rows.is_empty() {
			self.entry_index = 0;
			return;
		}

		let max_index = view.entry_rows.len() as i32 - 1;
		self.entry_index = (self.entry_index as i32 + delta).clamp(0, max_index) as usize;
	}

	fn selected_entry_id(&self, view: &ViewModel) -> Option<String> {
		view.entry_rows.get(self.entry_index).map(|row| row.id.clone())
	}
}

#[derive(Debug, Clone)]
struct ViewModel {
	entry_rows: Vec<EntryRow>,
	stats: Statistics,
	window_label: String,
	caption: String,
}

#[derive(Debug, Clone)]
struct EntryRow {
	id: String,
	line: Line<'static>,
}

#[cfg(test)]
mod tests {
	use chrono::{Local, TimeZone};

	use crate::catalog::Category;
	use crate::config::Settings;
	use crate::domain::tests::{MemoryRepository, draft};
	use crate::domain::{EntryDraft, EntryStore};
	use crate::window::Window;

	use super::{
		App, PromptKind, PromptOutcome, PromptState, SelectKind, bar_width, build_category_select,
		build_owner_select, build_view, create_entry, submit_prompt, toggle_entry, truncate,
	};

	fn owners() -> Vec<String> {
		vec!["Alejandro".to_string(), "Natalia".to_string()]
	}

	#[test]
	fn form_prompts_chain_into_owner_picker() {
		let title = PromptState::new("Title", PromptKind::Title).with_input("Weekly meeting");
		let Ok(PromptOutcome::NextPrompt(description)) = submit_prompt(title, &owners()) else {
			panic!("title should lead to description");
		};

		let description = description.with_input("Coordinated the cultural agenda");
		let Ok(PromptOutcome::NextPrompt(date)) = submit_prompt(description, &owners()) else {
			panic!("description should lead to date");
		};
		assert_eq!(date.input.len(), 10);

		let date = date.with_input("2026-04-01");
		let Ok(PromptOutcome::Select(select)) = submit_prompt(date, &owners()) else {
			panic!("date should lead to owner picker");
		};
		assert_eq!(select.options.len(), 3);
		let SelectKind::Owner { draft } = select.kind else {
			panic!("expected owner picker");
		};
		assert_eq!(draft.title, "Weekly meeting");
		assert!(draft.date.is_some());
	}

	#[test]
	fn form_rejects_short_title_and_bad_date() {
		let title = PromptState::new("Title", PromptKind::Title).with_input("A");
		let err = submit_prompt(title, &owners()).expect_err("short title should fail");
		assert!(err.contains("title"));

		let date = PromptState::new(
			"Activity date",
			PromptKind::Date {
				draft: EntryDraft::default(),
			},
		)
		.with_input("yesterday");
		assert!(submit_prompt(date, &owners()).is_err());
	}

	#[test]
	fn other_owner_prompt_leads_to_categories() {
		let owner = PromptState::new(
			"Owner name",
			PromptKind::Owner {
				draft: EntryDraft::default(),
			},
		)
		.with_input("Visiting artist");
		let Ok(PromptOutcome::Select(select)) = submit_prompt(owner, &owners()) else {
			panic!("owner should lead to category picker");
		};
		assert_eq!(select.options.len(), Category::ALL.len());
		let SelectKind::Category { draft } = select.kind else {
			panic!("expected category picker");
		};
		assert_eq!(draft.owner, "Visiting artist");
	}

	#[test]
	fn owner_picker_offers_free_text_option() {
		let select = build_owner_select(&owners(), EntryDraft::default());
		assert_eq!(select.options.last().and_then(|option| option.value.clone()), None);
		let select = build_category_select(EntryDraft::default());
		assert_eq!(select.options[1].value.as_deref(), Some("cultural-groups"));
	}

	#[test]
	fn create_and_toggle_report_status() {
		let mut store = EntryStore::open(MemoryRepository::default()).expect("memory store should open");
		let message = create_entry(&mut store, draft("Press release")).expect("create should work");
		assert_eq!(message, "created entry: Press release");

		let id = store.list()[0].id.clone();
		let message = toggle_entry(&mut store, &id).expect("toggle should work");
		assert_eq!(message, "Press release: completed");
		assert!(toggle_entry(&mut store, "missing").is_err());
	}

	#[test]
	fn view_lists_entries_and_window_stats() {
		let mut store = EntryStore::open(MemoryRepository::default()).expect("memory store should open");
		store.create(draft("First")).expect("create should work");
		store.create(draft("Second")).expect("create should work");

		let mut app = App::new(&Settings::default());
		app.window = Window::Day;
		let now = Local.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
		let view = build_view(&app, store.list(), now);
		assert_eq!(view.entry_rows.len(), 2);
		assert!(view.stats.is_empty());
		assert_eq!(view.window_label, "Today (01/01/2030)");

		app.move_entry_selection(5, &view);
		assert_eq!(app.selected_entry_id(&view), Some(store.list()[1].id.clone()));
	}

	#[test]
	fn bars_scale_to_largest_count() {
		assert_eq!(bar_width(4, 4, 24), 24);
		assert_eq!(bar_width(1, 4, 24), 6);
		assert_eq!(bar_width(1, 100, 24), 1);
		assert_eq!(bar_width(0, 4, 24), 0);
		assert_eq!(truncate("Juan Pablo", 4), "Jua~");
	}
}
