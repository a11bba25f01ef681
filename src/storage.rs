use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::domain::Entry;

const ENTRIES_MARKER: &str = "\n=== ENTRIES ===\n";
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    TomlDecode(toml::de::Error),
    TomlEncode(toml::ser::Error),
    JsonDecode(serde_json::Error),
    JsonEncode(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::TomlDecode(err) => write!(f, "failed to parse TOML header: {err}"),
            StorageError::TomlEncode(err) => write!(f, "failed to encode TOML header: {err}"),
            StorageError::JsonDecode(err) => write!(f, "failed to parse JSONL entry: {err}"),
            StorageError::JsonEncode(err) => write!(f, "failed to encode JSONL entry: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Durable home of an entry list. `load` runs once when a store opens and
/// `save` after every mutation; a later `load` must return what was saved.
pub trait EntryRepository {
    fn load(&mut self) -> Result<Vec<Entry>, StorageError>;
    fn save(&mut self, entries: &[Entry]) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogbookHeader {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
}

impl LogbookHeader {
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now(),
        }
    }
}

/// One logbook per file: a TOML header, a marker line, then one JSON entry per line.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
    header: LogbookHeader,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: LogbookHeader::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &LogbookHeader {
        &self.header
    }
}

impl EntryRepository for FileRepository {
    fn load(&mut self) -> Result<Vec<Entry>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no logbook at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(StorageError::Io(err)),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let (header_blob, entries_blob) = if let Some((header, entries)) = raw.split_once(ENTRIES_MARKER) {
            (header, entries)
        } else {
            (raw.as_str(), "")
        };

        self.header = toml::from_str(header_blob).map_err(StorageError::TomlDecode)?;
        let mut entries = Vec::new();
        for line in entries_blob.lines() {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(line).map_err(StorageError::JsonDecode)?);
        }

        Ok(entries)
    }

    fn save(&mut self, entries: &[Entry]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StorageError::Io)?;
            }
        }

        // Written beside the logbook and renamed over it, so a failed write
        // leaves the previous contents in place.
        let staging = staging_path(&self.path);
        if let Err(err) = write_logbook(&staging, &self.header, entries) {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }
        fs::rename(&staging, &self.path).map_err(StorageError::Io)?;

        debug!("saved {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_logbook(path: &Path, header: &LogbookHeader, entries: &[Entry]) -> Result<(), StorageError> {
    let header = toml::to_string_pretty(header).map_err(StorageError::TomlEncode)?;
    let mut file = fs::File::create(path).map_err(StorageError::Io)?;
    file.write_all(header.as_bytes())
        .map_err(StorageError::Io)?;
    file.write_all(ENTRIES_MARKER.as_bytes())
        .map_err(StorageError::Io)?;

    for entry in entries {
        let line = serde_json::to_string(entry).map_err(StorageError::JsonEncode)?;
        file.write_all(line.as_bytes()).map_err(StorageError::Io)?;
        file.write_all(b"\n").map_err(StorageError::Io)?;
    }

    file.sync_all().map_err(StorageError::Io)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use std::fs;
    use std::path::PathBuf;

    use crate::domain::EntryStore;
    use crate::domain::tests::draft;

    use super::{EntryRepository, FileRepository, StorageError, staging_path};

    #[test]
    fn round_trips_toml_and_jsonl() {
        let path = temp_file("bitacora_storage_roundtrip.bitacora");
        let mut store = EntryStore::open(FileRepository::new(&path)).expect("open should succeed");
        let first = store.create(draft("Wrote report")).expect("create should work");
        let second = store.create(draft("Booked hall")).expect("create should work");
        store.toggle_complete(&second.id).expect("toggle should work");
        let created_at = store.repository().header().created_at;
        store.close().expect("close should succeed");

        let reopened = EntryStore::open(FileRepository::new(&path)).expect("reopen should succeed");
        assert_eq!(reopened.list().len(), 2);
        assert_eq!(reopened.list()[0], first);
        assert!(reopened.list()[1].completed);
        assert_eq!(reopened.list()[1].date, second.date);
        assert_eq!(reopened.repository().header().created_at, created_at);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_loads_empty() {
        let path = temp_file("bitacora_storage_missing.bitacora");
        let _ = fs::remove_file(&path);
        let mut repository = FileRepository::new(&path);
        assert!(repository.load().expect("load should succeed").is_empty());
    }

    #[test]
    fn unparseable_dates_load_as_undated() {
        let path = temp_file("bitacora_storage_bad_date.bitacora");
        let raw = concat!(
            "schema_version = 1\n",
            "created_at = \"2026-01-01T00:00:00Z\"\n",
            "\n=== ENTRIES ===\n",
            "{\"id\":\"aaaa1111\",\"date\":\"not a date\",\"title\":\"Bad\",\"description\":\"Bad date\",",
            "\"owner\":\"Marcos\",\"category\":\"event\",\"created_at\":\"2026-01-01T09:00:00Z\",\"completed\":false}\n",
            "{\"id\":\"bbbb2222\",\"title\":\"None\",\"description\":\"No date\",",
            "\"owner\":\"Marcos\",\"category\":\"mail\",\"created_at\":\"2026-01-01T09:00:00Z\"}\n",
            "{\"id\":\"cccc3333\",\"date\":\"2026-01-02T12:00:00Z\",\"title\":\"Ok\",\"description\":\"Good date\",",
            "\"owner\":\"Kerelin\",\"category\":\"meeting\",\"created_at\":\"2026-01-01T09:00:00Z\",\"completed\":true}\n",
        );
        fs::write(&path, raw).expect("fixture should be written");

        let entries = FileRepository::new(&path).load().expect("load should succeed");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].date, None);
        assert_eq!(entries[1].date, None);
        assert!(!entries[1].completed);
        assert_eq!(
            entries[2].date,
            Some(Utc.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).unwrap())
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_entry_line_is_an_error() {
        let path = temp_file("bitacora_storage_corrupt.bitacora");
        fs::write(
            &path,
            "schema_version = 1\ncreated_at = \"2026-01-01T00:00:00Z\"\n\n=== ENTRIES ===\n{not json}\n",
        )
        .expect("fixture should be written");

        let err = FileRepository::new(&path).load().expect_err("corrupt line should fail");
        assert!(matches!(err, StorageError::JsonDecode(_)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn numeric_date_loads_as_undated() {
        let path = temp_file("bitacora_storage_numeric_date.bitacora");
        let raw = concat!(
            "schema_version = 1\n",
            "created_at = \"2026-01-01T00:00:00Z\"\n",
            "\n=== ENTRIES ===\n",
            "{\"id\":\"dddd4444\",\"date\":1767225600000,\"title\":\"Epoch\",\"description\":\"Millisecond date\",",
            "\"owner\":\"Marcos\",\"category\":\"report\",\"created_at\":\"2026-01-01T09:00:00Z\"}\n",
            "{\"id\":\"eeee5555\",\"date\":\"2026-01-02T12:00:00Z\",\"title\":\"Ok\",\"description\":\"Good date\",",
            "\"owner\":\"Kerelin\",\"category\":\"mail\",\"created_at\":\"2026-01-01T09:00:00Z\"}\n",
        );
        fs::write(&path, raw).expect("fixture should be written");

        let entries = FileRepository::new(&path).load().expect("numeric date should not fail the load");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "dddd4444");
        assert_eq!(entries[0].date, None);
        assert!(entries[1].date.is_some());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn save_replaces_the_file_without_leaving_staging_behind() {
        let path = temp_file("bitacora_storage_replace.bitacora");
        let _ = fs::remove_file(&path);
        let mut store = EntryStore::open(FileRepository::new(&path)).expect("open should succeed");
        store.create(draft("Wrote report")).expect("create should work");
        store.create(draft("Booked hall")).expect("create should work");
        store.close().expect("close should succeed");

        let mut store = EntryStore::open(FileRepository::new(&path)).expect("reopen should succeed");
        store.create(draft("Sent minutes")).expect("create should work");
        store.close().expect("close should succeed");

        assert!(!staging_path(&path).exists());
        let entries = FileRepository::new(&path).load().expect("load should succeed");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].title, "Sent minutes");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn failed_save_keeps_previous_contents() {
        let path = temp_file("bitacora_storage_failed_save.bitacora");
        let mut repository = FileRepository::new(&path);
        let mut store = EntryStore::open(repository.clone()).expect("open should succeed");
        store.create(draft("Wrote report")).expect("create should work");
        store.close().expect("close should succeed");
        let before = fs::read_to_string(&path).expect("logbook should exist");

        // A directory in the staging slot makes the write fail before the rename.
        let staging = staging_path(&path);
        fs::create_dir_all(&staging).expect("staging dir should be created");
        let err = repository.save(&[]).expect_err("save should fail");
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(fs::read_to_string(&path).expect("logbook should remain"), before);

        let _ = fs::remove_dir_all(staging);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn staging_sits_next_to_the_logbook() {
        let path = PathBuf::from("/tmp/logbooks/team.bitacora");
        assert_eq!(staging_path(&path), PathBuf::from("/tmp/logbooks/team.bitacora.tmp"));
    }

    fn temp_file(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("{}_{}", name, std::process::id()));
        path
    }
}
