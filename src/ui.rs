use std::error::Error;
use std::io;
use std::time::Duration as StdDuration;

use chrono::{Local, NaiveDateTime};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use log::debug;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::board::{Board, EventRow, build_board};
use crate::catalog::Catalog;
use crate::schedule::{EventPhase, TimeInterval};
use crate::selection::SelectionController;

const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const INACTIVE_PANEL_BORDER_COLOR: Color = Color::DarkGray;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);
const TITLE_COLOR: Color = Color::Rgb(234, 227, 186);
const MUTED_COLOR: Color = Color::Rgb(151, 120, 100);
const LAMP: &str = "● ";

pub fn run_board(catalog: &Catalog, category: &str, refresh: StdDuration) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, catalog, category, refresh);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	catalog: &Catalog,
	category: &str,
	refresh: StdDuration,
) -> Result<(), Box<dyn Error>> {
	let mut app = App::new(category);

	loop {
		// Status is derived from the wall clock on every draw, never cached.
		let now = Local::now().naive_local();
		let board = build_board(catalog, &app.controller, now);
		app.clamp_selection(&board);
		terminal.draw(|frame| draw_board(frame, &app, catalog, &board))?;

		if event::poll(refresh)? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				if handle_key(&mut app, key.code, catalog, &board) {
					break;
				}
			}
		}
	}

	Ok(())
}

fn draw_board(frame: &mut Frame, app: &App, catalog: &Catalog, board: &Board) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(12), Constraint::Length(4)])
		.split(frame.area());

	let body = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
		.split(layout[0]);

	let title_lines = match board {
		Board::List { title_lines, .. } | Board::Detail { title_lines, .. } => title_lines.as_slice(),
		Board::Missing { .. } => &[],
	};
	let left = Layout::default()
		.direction(Direction::Vertical)
		.constraints([
			Constraint::Length(title_lines.len().max(1) as u16 + 2),
			Constraint::Min(4),
		])
		.split(body[0]);

	render_title_panel(frame, left[0], title_lines);
	render_category_panel(frame, left[1], catalog, board.key());
	match board {
		Board::Missing { key } => render_missing_panel(frame, body[1], key),
		Board::List { rows, .. } => render_event_list(frame, body[1], app, rows),
		Board::Detail { row, .. } => render_event_detail(frame, body[1], row),
	}
	render_footer(frame, layout[1], app, board);
}

fn render_title_panel(frame: &mut Frame, area: Rect, title_lines: &[String]) {
	let style = Style::default().fg(TITLE_COLOR).add_modifier(Modifier::BOLD);
	let lines = title_lines
		.iter()
		.map(|line| Line::styled(line.clone(), style))
		.collect::<Vec<_>>();
	let panel = Paragraph::new(lines)
		.alignment(Alignment::Center)
		.block(Block::default().borders(Borders::ALL).title("Equinox"));
	frame.render_widget(panel, area);
}

fn render_category_panel(frame: &mut Frame, area: Rect, catalog: &Catalog, active_key: &str) {
	let active_key = active_key.to_lowercase();
	let items = catalog
		.iter()
		.map(|(key, category)| {
			ListItem::new(Line::from(vec![
				Span::raw(format!("{key:<10}")),
				Span::styled(format!(" {}", category.events.len()), Style::default().fg(MUTED_COLOR)),
			]))
		})
		.collect::<Vec<_>>();

	let mut state = ListState::default();
	state.select(catalog.keys().position(|key| key == active_key));

	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title("Categories")
				.border_style(border_style(false)),
		)
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR).add_modifier(Modifier::BOLD));
	frame.render_stateful_widget(list, area, &mut state);
}

fn render_missing_panel(frame: &mut Frame, area: Rect, key: &str) {
	let panel = Paragraph::new(Line::styled(
		format!("No event data found for \"{key}\"."),
		Style::default().fg(Color::LightRed),
	))
	.block(Block::default().borders(Borders::ALL).title("Events"));
	frame.render_widget(panel, area);
}

fn render_event_list(frame: &mut Frame, area: Rect, app: &App, rows: &[EventRow]) {
	let mut items = rows
		.iter()
		.map(|row| {
			ListItem::new(vec![
				Line::from(vec![
					Span::styled(LAMP, lamp_style(row)),
					Span::styled(
						row.event.name.clone(),
						Style::default().fg(TITLE_COLOR).add_modifier(Modifier::BOLD),
					),
					Span::styled(format!("  [{}]", row.phase.label()), phase_style(row.phase)),
				]),
				Line::styled(
					format!("  Start Time: {} | {}", row.event.start_time, row.event.start_date),
					Style::default().fg(MUTED_COLOR),
				),
				Line::from(format!("  {}", row.event.description)),
				Line::from(""),
			])
		})
		.collect::<Vec<_>>();

	if items.is_empty() {
		items.push(ListItem::new("(no events in this category)"));
	}

	let mut state = ListState::default();
	if !rows.is_empty() {
		state.select(Some(app.list_index.min(rows.len() - 1)));
	}

	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title("Events")
				.border_style(border_style(true)),
		)
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR));
	frame.render_stateful_widget(list, area, &mut state);
}

fn render_event_detail(frame: &mut Frame, area: Rect, row: &EventRow) {
	let event = row.event;
	let heading = Style::default().fg(TITLE_COLOR).add_modifier(Modifier::BOLD);
	let mut lines = vec![
		Line::from(vec![
			Span::styled(LAMP, lamp_style(row)),
			Span::styled(event.name.clone(), heading),
			Span::styled(format!("  [{}]", row.phase.label()), phase_style(row.phase)),
		]),
		Line::styled(
			format!("Start Time: {} | {}", event.start_time, event.start_date),
			Style::default().fg(MUTED_COLOR),
		),
		Line::styled(format_interval(&row.interval), Style::default().fg(MUTED_COLOR)),
		Line::from(format!("Mode: {} | Duration: {}", event.mode, event.duration)),
		Line::from(""),
		Line::from(event.description.clone()),
		Line::from(""),
		Line::styled("Rules", heading),
	];

	if event.rules.is_empty() {
		lines.push(Line::from("(none)"));
	}
	for (index, rule) in event.rules.iter().enumerate() {
		lines.push(Line::from(format!("{:>2}. {rule}", index + 1)));
	}

	lines.push(Line::from(""));
	lines.push(Line::styled("Point of Contact", heading));
	if event.points_of_contact.is_empty() {
		lines.push(Line::from("(none)"));
	}
	for contact in &event.points_of_contact {
		lines.push(Line::from(format!("{} | {}", contact.name, contact.phone)));
	}

	let panel = Paragraph::new(lines)
		.wrap(Wrap { trim: false })
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title("Event")
				.border_style(border_style(true)),
		);
	frame.render_widget(panel, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, board: &Board) {
	let keys = match board {
		Board::Detail { .. } => "Esc/Backspace back to list | Tab/h/l switch category | q quit",
		Board::List { .. } => "j/k or arrows move | Enter open event | Tab/h/l switch category | q quit",
		Board::Missing { .. } => "Tab/h/l switch category | q quit",
	};
	let footer = Paragraph::new(vec![Line::from(keys), Line::from(app.status.clone())])
		.block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn handle_key(app: &mut App, code: KeyCode, catalog: &Catalog, board: &Board) -> bool {
	match code {
		KeyCode::Char('q') => true,
		KeyCode::Esc | KeyCode::Backspace => {
			if let Board::Detail { .. } = board {
				app.back();
			}
			false
		}
		KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
			app.shift_category(catalog, 1);
			false
		}
		KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
			app.shift_category(catalog, -1);
			false
		}
		KeyCode::Up | KeyCode::Char('k') => {
			app.move_list_selection(-1, board);
			false
		}
		KeyCode::Down | KeyCode::Char('j') => {
			app.move_list_selection(1, board);
			false
		}
		KeyCode::Enter => {
			if let Board::List { rows, .. } = board {
				match rows.get(app.list_index) {
					Some(row) => {
						debug!("opening event '{}' in {}", row.event.name, board.key());
						app.controller.select(row.index);
						app.status = format!("Viewing {}", row.event.name);
					}
					None => app.status = "No event to open".to_string(),
				}
			}
			false
		}
		_ => false,
	}
}

#[derive(Debug, Clone)]
struct App {
	controller: SelectionController,
	list_index: usize,
	status: String,
}

impl App {
	fn new(category: &str) -> Self {
		Self {
			controller: SelectionController::new(category.to_lowercase()),
			list_index: 0,
			status: "Ready".to_string(),
		}
	}

	fn clamp_selection(&mut self, board: &Board) {
		let count = board.row_count();
		if count > 0 {
			self.list_index = self.list_index.min(count - 1);
		}
	}

	fn move_list_selection(&mut self, delta: i32, board: &Board) {
		let count = board.row_count();
		if count == 0 {
			return;
		}

		if delta > 0 {
			self.list_index = (self.list_index + delta as usize).min(count - 1);
		} else {
			self.list_index = self.list_index.saturating_sub(delta.unsigned_abs() as usize);
		}
	}

	fn shift_category(&mut self, catalog: &Catalog, offset: isize) {
		let Some(next) = catalog.neighbour_key(self.controller.active_category(), offset) else {
			self.status = "No categories loaded".to_string();
			return;
		};
		if next == self.controller.active_category() {
			return;
		}

		debug!("category changed {} -> {next}", self.controller.active_category());
		self.controller.category_changed(next);
		self.list_index = 0;
		self.status = match catalog.lookup(next) {
			Some(category) => category.title.clone(),
			None => next.to_string(),
		};
	}

	fn back(&mut self) {
		self.controller.deselect();
		self.status = "Back to events".to_string();
	}
}

/// Lit while the event is live, red otherwise.
fn lamp_style(row: &EventRow) -> Style {
	if row.status.is_live() {
		Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD)
	} else {
		Style::default().fg(Color::Red)
	}
}

fn phase_style(phase: EventPhase) -> Style {
	match phase {
		EventPhase::Live => Style::default().fg(Color::LightGreen).add_modifier(Modifier::BOLD),
		EventPhase::Upcoming => Style::default().fg(Color::Cyan),
		EventPhase::Ended => Style::default().fg(Color::DarkGray),
		EventPhase::Unknown => Style::default().fg(Color::Magenta),
	}
}

fn border_style(focused: bool) -> Style {
	if focused {
		Style::default().fg(FOCUSED_PANEL_BORDER_COLOR)
	} else {
		Style::default().fg(INACTIVE_PANEL_BORDER_COLOR)
	}
}

fn format_instant(instant: Option<NaiveDateTime>) -> String {
	instant
		.map(|value| value.format("%a %d %b %Y %H:%M:%S").to_string())
		.unwrap_or_else(|| "invalid".to_string())
}

pub fn format_interval(interval: &TimeInterval) -> String {
	format!(
		"{} -> {}",
		format_instant(interval.start),
		format_instant(interval.end)
	)
}

pub fn print_categories(catalog: &Catalog) {
	if catalog.is_empty() {
		println!("no categories");
		return;
	}

	for (key, category) in catalog.iter() {
		println!("{key} | {} | {} events", category.title, category.events.len());
	}
}

pub fn print_event_list(board: &Board, now: NaiveDateTime) {
	match board {
		Board::Missing { .. } => {}
		Board::List {
			title_lines, rows, ..
		} => {
			println!("{} (as of {})", title_lines.join(" "), now.format("%Y-%m-%d %H:%M:%S"));
			if rows.is_empty() {
				println!("no events");
			}
			for row in rows {
				println!(
					"{:>2}. {} {:<8} | {} | {} {}",
					row.index,
					if row.status.is_live() { "LIVE" } else { "    " },
					row.phase.label(),
					row.event.name,
					row.event.start_time,
					row.event.start_date
				);
			}
		}
		Board::Detail { row, .. } => print_event_detail(row),
	}
}

pub fn print_event_detail(row: &EventRow) {
	let event = row.event;
	println!("{} [{}]", event.name, row.phase.label());
	println!("start: {} | {}", event.start_time, event.start_date);
	println!("window: {}", format_interval(&row.interval));
	println!("mode: {} | duration: {}", event.mode, event.duration);
	println!("\n{}", event.description);

	if !event.rules.is_empty() {
		println!("\nrules:");
		for (index, rule) in event.rules.iter().enumerate() {
			println!("{:>2}. {rule}", index + 1);
		}
	}

	if !event.points_of_contact.is_empty() {
		println!("\ncontacts:");
		for contact in &event.points_of_contact {
			println!("{} | {}", contact.name, contact.phone);
		}
	}
}

#[cfg(test)]
mod tests {
	use chrono::{NaiveDate, NaiveDateTime};
	use crossterm::event::KeyCode;

	use super::{App, format_interval, handle_key};
	use crate::board::{Board, build_board};
	use crate::catalog::tests::sample_catalog;
	use crate::schedule::parse_schedule;
	use crate::selection::SelectionState;

	#[test]
	fn formats_invalid_bounds() {
		let interval = parse_schedule("27 Smarch", "9:00 AM", 2026);
		assert_eq!(format_interval(&interval), "invalid -> invalid");

		let interval = parse_schedule("27-28 March", "9:00 PM", 2026);
		assert_eq!(
			format_interval(&interval),
			"Fri 27 Mar 2026 21:00:00 -> Sat 28 Mar 2026 23:59:59"
		);
	}

	#[test]
	fn switching_category_closes_open_event() {
		let catalog = sample_catalog();
		let mut app = App::new("FOSS");
		app.controller.select(1);
		app.list_index = 1;

		app.shift_category(&catalog, 1);
		assert_eq!(app.controller.active_category(), "ml");
		assert_eq!(app.controller.state(), SelectionState::None);
		assert_eq!(app.list_index, 0);
		assert_eq!(app.status, "Machine Learning Track");
	}

	#[test]
	fn list_cursor_stays_in_bounds() {
		let catalog = sample_catalog();
		let mut app = App::new("foss");
		let board = build_board(&catalog, &app.controller, morning());

		app.move_list_selection(5, &board);
		assert_eq!(app.list_index, 1);
		app.move_list_selection(-3, &board);
		assert_eq!(app.list_index, 0);
	}

	fn morning() -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2026, 3, 27)
			.unwrap()
			.and_hms_opt(9, 0, 0)
			.unwrap()
	}

	#[test]
	fn escape_on_the_list_keeps_the_board_open() {
		let catalog = sample_catalog();
		let mut app = App::new("foss");
		let board = build_board(&catalog, &app.controller, morning());
		assert!(matches!(board, Board::List { .. }));

		assert!(!handle_key(&mut app, KeyCode::Esc, &catalog, &board));
		assert!(!handle_key(&mut app, KeyCode::Backspace, &catalog, &board));
		assert_eq!(app.controller.state(), SelectionState::None);
		assert!(handle_key(&mut app, KeyCode::Char('q'), &catalog, &board));
	}

	#[test]
	fn escape_on_detail_returns_to_the_list() {
		let catalog = sample_catalog();
		let mut app = App::new("foss");
		app.controller.select(1);
		let board = build_board(&catalog, &app.controller, morning());
		assert!(matches!(board, Board::Detail { .. }));

		assert!(!handle_key(&mut app, KeyCode::Esc, &catalog, &board));
		assert_eq!(app.controller.state(), SelectionState::None);
		assert_eq!(app.status, "Back to events");
	}
}
