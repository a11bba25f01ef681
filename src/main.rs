mod catalog;
mod config;
mod domain;
mod logbooks;
mod logging;
mod stats;
mod storage;
mod ui;
mod window;

use std::error::Error;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use log::warn;

use crate::catalog::Category;
use crate::config::{Settings, load_settings};
use crate::domain::{Entry, EntryDraft, EntryStore, StoreError, local_midnight_utc, parse_entry_date};
use crate::logbooks::{log_file_path, recent_logbooks, remember_logbook, resolve_logbook_path};
use crate::logging::init_logging;
use crate::stats::Statistics;
use crate::storage::FileRepository;
use crate::ui::run_dashboard;
use crate::window::{Window, filter_entries};

#[derive(Debug, Parser)]
#[command(name = "bitacora", about = "Team activity logbook with completion statistics")]
struct Cli {
	#[arg(long)]
	logbook: Option<PathBuf>,
	#[arg(long)]
	config: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Init,
	Dashboard,
	Add {
		#[arg(long)]
		title: String,
		#[arg(long)]
		description: String,
		#[arg(long)]
		owner: String,
		#[arg(long, value_enum)]
		category: Option<Category>,
		/// YYYY-MM-DD or RFC 3339; defaults to today.
		#[arg(long)]
		date: Option<String>,
	},
	Toggle {
		#[arg(long)]
		id: String,
	},
	Show {
		#[arg(long)]
		id: String,
	},
	List {
		#[arg(long, value_enum)]
		window: Option<Window>,
	},
	Stats {
		#[arg(long, value_enum)]
		window: Option<Window>,
	},
	Catalog,
	Logbooks {
		#[arg(long, default_value_t = 20)]
		limit: usize,
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
	let settings = load_settings(cli.config.as_deref())?;
	let command = cli.command.unwrap_or(Command::Dashboard);

	let log_file = matches!(command, Command::Dashboard).then(log_file_path);
	init_logging(settings.log_level.as_deref(), log_file.as_deref())?;

	match &command {
		Command::Logbooks { limit } => return print_recent_logbooks(*limit),
		Command::Catalog => {
			print_catalog(&settings);
			return Ok(());
		}
		_ => {}
	}

	let mut logbook_path = resolve_logbook_path(cli.logbook, settings.logbook.as_deref());
	let mut store = EntryStore::open(FileRepository::new(&logbook_path))?;
	if let Err(err) = remember_logbook(&logbook_path) {
		warn!("failed to store recent logbook: {err}");
	}

	match command {
		Command::Init => {
			store.persist()?;
			let repository = store.repository();
			println!(
				"initialized logbook at {} (created {})",
				repository.path().display(),
				repository.header().created_at.with_timezone(&Local).format("%d/%m/%Y")
			);
		}
		Command::Dashboard => {
			run_dashboard(&mut store, &mut logbook_path, &settings)?;
		}
		Command::Add {
			title,
			description,
			owner,
			category,
			date,
		} => {
			let date = match date {
				Some(raw) => Some(
					parse_entry_date(&raw).ok_or_else(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))?,
				),
				None => Some(local_midnight_utc(Local::now().date_naive())),
			};
			let entry = store.create(EntryDraft {
				date,
				title,
				description,
				owner,
				category,
			})?;
			println!("created entry {}", entry.id);
		}
		Command::Toggle { id } => {
			let entry = store.toggle_complete(&id)?;
			println!("{} is now {}", entry.id, entry.status_label().to_lowercase());
		}
		Command::Show { id } => {
			let entry = store
				.get(&id)
				.ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
			print_entry(entry);
		}
		Command::List { window } => {
			print_entries(store.list(), window.unwrap_or(settings.default_window));
		}
		Command::Stats { window } => {
			print_stats(store.list(), window.unwrap_or(settings.default_window));
		}
		Command::Logbooks { .. } | Command::Catalog => {}
	}

	store.close()?;
	Ok(())
}

fn print_recent_logbooks(limit: usize) -> Result<(), Box<dyn Error>> {
	let rows = recent_logbooks(limit)?;
	if rows.is_empty() {
		println!("no recent logbooks");
		return Ok(());
	}

	for (index, path) in rows.iter().enumerate() {
		println!("{:>2}. {}", index + 1, path.display());
	}

	Ok(())
}

fn print_catalog(settings: &Settings) {
	println!("categories:");
	for category in Category::ALL {
		println!("{:<16} {}", category.key(), category.label());
	}

	println!("\nowners:");
	for owner in &settings.owners {
		println!("{owner}");
	}
}

fn print_entries(entries: &[Entry], window: Window) {
	let now = Local::now();
	let rows = filter_entries(entries, window, &now);
	println!("{}", window.label(now.date_naive()));
	if rows.is_empty() {
		println!("no entries in the logbook");
		return;
	}

	for entry in &rows {
		println!(
			"{} | {} | {} | {} | {} | {}",
			entry.id,
			entry.date_label(),
			if entry.completed { "[x]" } else { "[ ]" },
			entry.title,
			entry.owner,
			entry.category.label()
		);
	}
}

fn print_entry(entry: &Entry) {
	println!("id:          {}", entry.id);
	println!("date:        {}", entry.date_label());
	println!("title:       {}", entry.title);
	println!("owner:       {}", entry.owner);
	println!("category:    {}", entry.category.label());
	println!("status:      {}", entry.status_label());
	println!(
		"created:     {}",
		entry.created_at.with_timezone(&Local).format("%d/%m/%Y %H:%M")
	);
	println!("\n{}", entry.description);
}

fn print_stats(entries: &[Entry], window: Window) {
	let now = Local::now();
	let stats = Statistics::compute(entries, window, &now);

	println!("{}", window.label(now.date_naive()));
	println!("statistics as of {}", now.format("%d/%m/%Y %H:%M"));
	if stats.is_empty() {
		println!("no data to show");
		return;
	}
	println!(
		"{} entries | {} completed | {} pending",
		stats.entry_count, stats.completed, stats.pending
	);

	println!("\nby owner:");
	println!("{:<20} {:>6} {:>10} {:>8} {:>5}", "owner", "total", "completed", "pending", "%");
	for row in &stats.owners {
		println!(
			"{:<20} {:>6} {:>10} {:>8} {:>4}%",
			row.owner,
			row.total,
			row.completed,
			row.pending,
			row.completion_percent()
		);
	}

	println!("\nby category:");
	for row in &stats.categories {
		println!("{:>4} | {}", row.count, row.category.label());
	}
}
