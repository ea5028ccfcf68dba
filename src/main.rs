mod board;
mod catalog;
mod config;
mod logging;
mod schedule;
mod selection;
mod storage;
mod title;
mod ui;

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::{Datelike, Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use log::{info, warn};

use crate::board::{Board, EventRow, build_board};
use crate::catalog::Catalog;
use crate::config::{Config, load_config};
use crate::logging::{LogSink, init_logging};
use crate::schedule::{evaluate, parse_schedule, phase};
use crate::selection::SelectionController;
use crate::storage::{bundled_catalog, load_catalog};
use crate::ui::{format_interval, print_categories, print_event_detail, print_event_list, run_board};

#[derive(Debug, Parser)]
#[command(name = "equinox-events", about = "Festival event board with live status")]
struct Cli {
	/// Event data file (.json or .toml); overrides the config file.
	#[arg(long)]
	catalog: Option<PathBuf>,
	#[arg(long)]
	config: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Board {
		#[arg(long)]
		category: Option<String>,
	},
	Categories,
	List {
		#[arg(long)]
		category: String,
		/// Evaluate status at this local time instead of now.
		#[arg(long)]
		at: Option<String>,
	},
	Show {
		#[arg(long)]
		category: String,
		/// Event name (case-insensitive) or its index in the list.
		#[arg(long)]
		event: String,
		#[arg(long)]
		at: Option<String>,
	},
	Parse {
		#[arg(long)]
		date: String,
		#[arg(long)]
		time: String,
		#[arg(long)]
		year: Option<i32>,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	let config = load_config(cli.config.as_deref())?;
	let command = cli.command.unwrap_or(Command::Board { category: None });

	let sink_path = config.log_file();
	let sink = match command {
		Command::Board { .. } => LogSink::File(sink_path.as_path()),
		_ => LogSink::Stderr,
	};
	if let Err(err) = init_logging(config.log_level.as_deref(), sink) {
		eprintln!("warning: failed to open log file {}: {err}", sink_path.display());
	}

	let catalog = open_catalog(cli.catalog, &config)?;

	match command {
		Command::Board { category } => {
			let category = category.unwrap_or_else(|| config.default_category.clone());
			if catalog.lookup(&category).is_none() {
				warn!("starting board on unknown category {category}");
			}
			info!("board starting on {category}");
			run_board(
				&catalog,
				&category,
				StdDuration::from_millis(config.refresh_millis()),
			)?;
		}
		Command::Categories => {
			print_categories(&catalog);
		}
		Command::List { category, at } => {
			let now = resolve_now(at.as_deref())?;
			let board = category_board(&catalog, &category, now)?;
			print_event_list(&board, now);
		}
		Command::Show {
			category,
			event,
			at,
		} => {
			let now = resolve_now(at.as_deref())?;
			let row = find_event(&catalog, &category, &event, now)?;
			print_event_detail(&row);
		}
		Command::Parse { date, time, year } => {
			let now = Local::now().naive_local();
			let interval = parse_schedule(&date, &time, year.unwrap_or(now.year()));
			println!("{}", format_interval(&interval));
			if interval.is_valid() {
				println!(
					"now: {:?} / {}",
					evaluate(&interval, now),
					phase(&interval, now).label()
				);
			}
		}
	}

	Ok(())
}

fn open_catalog(cli_path: Option<PathBuf>, config: &Config) -> Result<Catalog, Box<dyn Error>> {
	let catalog = match cli_path.or_else(|| config.catalog.clone()) {
		Some(path) => load_catalog(&path)?,
		None => bundled_catalog()?,
	};
	Ok(catalog)
}

fn resolve_now(at: Option<&str>) -> Result<NaiveDateTime, Box<dyn Error>> {
	match at {
		Some(raw) => parse_local_datetime(raw),
		None => Ok(Local::now().naive_local()),
	}
}

fn parse_local_datetime(input: &str) -> Result<NaiveDateTime, Box<dyn Error>> {
	let input = input.trim();
	NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
		.or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
		.map_err(|err| format!("invalid --at '{input}', expected YYYY-MM-DDTHH:MM[:SS]: {err}").into())
}

fn category_board<'a>(
	catalog: &'a Catalog,
	category_key: &str,
	now: NaiveDateTime,
) -> Result<Board<'a>, Box<dyn Error>> {
	let controller = SelectionController::new(category_key);
	match build_board(catalog, &controller, now) {
		Board::Missing { key } => Err(format!("no event data found for \"{key}\"").into()),
		board => Ok(board),
	}
}

fn find_event<'a>(
	catalog: &'a Catalog,
	category_key: &str,
	query: &str,
	now: NaiveDateTime,
) -> Result<EventRow<'a>, Box<dyn Error>> {
	let category = catalog
		.lookup(category_key)
		.ok_or_else(|| format!("no event data found for \"{category_key}\""))?;

	let index = match query.parse::<usize>() {
		Ok(index) if index < category.events.len() => Some(index),
		_ => category
			.events
			.iter()
			.position(|event| event.name.eq_ignore_ascii_case(query.trim())),
	};
	let index = index.ok_or_else(|| format!("event not found in {category_key}: {query}"))?;

	let mut controller = SelectionController::new(category_key);
	controller.select(index);
	match build_board(catalog, &controller, now) {
		Board::Detail { row, .. } => Ok(row),
		_ => Err(format!("event not found in {category_key}: {query}").into()),
	}
}
