use std::env;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;

const RECENT_LOGBOOKS_FILE: &str = "recent_logbooks.txt";
const DEFAULT_LOGBOOK_FILE: &str = "logbook.bitacora";
const LOG_FILE: &str = "bitacora.log";
const MAX_RECENT_LOGBOOKS: usize = 50;

pub fn resolve_logbook_path(cli_path: Option<PathBuf>, configured: Option<&Path>) -> PathBuf {
	if let Some(path) = cli_path {
		debug!("logbook from command line: {}", path.display());
		return absolutize(path);
	}

	if let Some(path) = env::var_os("BITACORA_LOGBOOK") {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			debug!("logbook from BITACORA_LOGBOOK: {}", path.display());
			return absolutize(path);
		}
	}

	if let Some(path) = configured {
		debug!("logbook from settings: {}", path.display());
		return absolutize(path.to_path_buf());
	}

	if let Ok(mut recent) = recent_logbooks(MAX_RECENT_LOGBOOKS) {
		if let Some(path) = recent.drain(..).next() {
			debug!("reopening most recent logbook: {}", path.display());
			return path;
		}
	}

	state_dir().join(DEFAULT_LOGBOOK_FILE)
}

pub fn remember_logbook(path: &Path) -> Result<(), std::io::Error> {
	let path = absolutize(path.to_path_buf());
	let mut entries = recent_logbooks(MAX_RECENT_LOGBOOKS)?;
	entries.retain(|entry| entry != &path);
	entries.insert(0, path);
	entries.truncate(MAX_RECENT_LOGBOOKS);
	save_recent_logbooks(&entries)
}

pub fn recent_logbooks(limit: usize) -> Result<Vec<PathBuf>, std::io::Error> {
	let path = recent_logbooks_path();
	let raw = match fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
		Err(err) => return Err(err),
	};

	Ok(parse_recent(&raw, limit))
}

pub fn log_file_path() -> PathBuf {
	state_dir().join(LOG_FILE)
}

fn parse_recent(raw: &str, limit: usize) -> Vec<PathBuf> {
	raw.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.take(limit)
		.map(PathBuf::from)
		.collect()
}

fn save_recent_logbooks(entries: &[PathBuf]) -> Result<(), std::io::Error> {
	fs::create_dir_all(state_dir())?;

	let mut file = fs::File::create(recent_logbooks_path())?;
	for path in entries {
		writeln!(file, "{}", path.display())?;
	}

	Ok(())
}

fn recent_logbooks_path() -> PathBuf {
	state_dir().join(RECENT_LOGBOOKS_FILE)
}

pub fn state_dir() -> PathBuf {
	if let Some(path) = env::var_os("BITACORA_STATE_DIR") {
		return PathBuf::from(path);
	}

	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("LOCALAPPDATA") {
			return PathBuf::from(path).join("bitacora");
		}
	}

	if let Some(path) = env::var_os("XDG_STATE_HOME") {
		return PathBuf::from(path).join("bitacora");
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path)
			.join(".local")
			.join("state")
			.join("bitacora");
	}

	PathBuf::from(".bitacora")
}

fn absolutize(path: PathBuf) -> PathBuf {
	let path = if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	};

	if path.exists() {
		fs::canonicalize(&path).unwrap_or(path)
	} else {
		path
	}
}
