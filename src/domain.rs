use std::fmt::{Display, Formatter};

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{error, info, warn};
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::Category;
use crate::storage::{EntryRepository, StorageError};

const ID_LEN: usize = 8;
pub const MIN_TITLE_CHARS: usize = 2;
pub const MIN_DESCRIPTION_CHARS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub date: Option<DateTime<Utc>>,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

impl Entry {
    pub fn status_label(&self) -> &'static str {
        if self.completed { "Completed" } else { "Pending" }
    }

    pub fn date_label(&self) -> String {
        self.date
            .map(|date| date.with_timezone(&Local).format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "--/--/----".to_string())
    }
}

/// Everything the caller supplies for a new entry. The store assigns `id`,
/// `created_at` and `completed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub date: Option<DateTime<Utc>>,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Date,
    Title,
    Description,
    Owner,
    Category,
}

impl Display for DraftField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DraftField::Date => "date",
            DraftField::Title => "title",
            DraftField::Description => "description",
            DraftField::Owner => "owner",
            DraftField::Category => "category",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    InvalidDraft { field: DraftField, reason: String },
    NotFound { id: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::InvalidDraft { field, reason } => write!(f, "invalid {field}: {reason}"),
            StoreError::NotFound { id } => write!(f, "entry not found: {id}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub fn check_title(input: &str) -> Result<String, StoreError> {
    check_min_chars(input, DraftField::Title, MIN_TITLE_CHARS)
}

pub fn check_description(input: &str) -> Result<String, StoreError> {
    check_min_chars(input, DraftField::Description, MIN_DESCRIPTION_CHARS)
}

pub fn check_owner(input: &str) -> Result<String, StoreError> {
    check_min_chars(input, DraftField::Owner, 1)
}

fn check_min_chars(input: &str, field: DraftField, min: usize) -> Result<String, StoreError> {
    let value = input.trim();
    if value.chars().count() < min {
        let reason = if min == 1 {
            "must not be empty".to_string()
        } else {
            format!("must be at least {min} characters")
        };
        return Err(StoreError::InvalidDraft { field, reason });
    }
    Ok(value.to_string())
}

fn missing(field: DraftField) -> StoreError {
    StoreError::InvalidDraft {
        field,
        reason: "is required".to_string(),
    }
}

/// Owns the canonical entry list and writes it through the repository after
/// every mutation. Only `create_at` and `toggle_complete` change the list.
pub struct EntryStore<R: EntryRepository> {
    repository: R,
    entries: Vec<Entry>,
    unsaved: bool,
}

impl<R: EntryRepository> EntryStore<R> {
    pub fn open(mut repository: R) -> Result<Self, StorageError> {
        let mut entries = repository.load()?;
        let reassigned = reassign_duplicate_ids(&mut entries);
        info!("opened logbook with {} entries", entries.len());
        Ok(Self {
            repository,
            entries,
            unsaved: reassigned > 0,
        })
    }

    pub fn list(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn create(&mut self, draft: EntryDraft) -> Result<Entry, StoreError> {
        self.create_at(draft, Utc::now())
    }

    pub fn create_at(
        &mut self,
        draft: EntryDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Entry, StoreError> {
        let date = draft.date.ok_or_else(|| missing(DraftField::Date))?;
        let title = check_title(&draft.title)?;
        let description = check_description(&draft.description)?;
        let owner = check_owner(&draft.owner)?;
        let category = draft.category.ok_or_else(|| missing(DraftField::Category))?;

        let entry = Entry {
            id: generate_unique_id(&self.entries),
            date: Some(date),
            title,
            description,
            owner,
            category,
            created_at,
            completed: false,
        };
        self.entries.push(entry.clone());
        info!("created entry {} ({})", entry.id, entry.category.key());

        self.save_after_mutation();
        Ok(entry)
    }

    pub fn toggle_complete(&mut self, id: &str) -> Result<Entry, StoreError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        entry.completed = !entry.completed;
        let toggled = entry.clone();
        info!("entry {} is now {}", toggled.id, toggled.status_label());

        self.save_after_mutation();
        Ok(toggled)
    }

    pub fn persist(&mut self) -> Result<(), StorageError> {
        self.repository.save(&self.entries)?;
        self.unsaved = false;
        Ok(())
    }

    /// Final save on shutdown, only needed when a save after a mutation failed
    /// or duplicate ids were reassigned on open.
    pub fn close(mut self) -> Result<(), StorageError> {
        if self.unsaved {
            self.persist()?;
        }
        Ok(())
    }

    fn save_after_mutation(&mut self) {
        if let Err(err) = self.persist() {
            error!("failed to save logbook: {err}");
            self.unsaved = true;
        }
    }
}

/// Gives every entry after the first holder of an id a fresh one, so the
/// list stays addressable by id. Returns how many entries were changed.
fn reassign_duplicate_ids(entries: &mut [Entry]) -> usize {
    let mut reassigned = 0;
    for index in 1..entries.len() {
        let id = &entries[index].id;
        if entries[..index].iter().any(|other| &other.id == id) {
            let fresh = generate_unique_id(entries);
            warn!("duplicate entry id {} in logbook; reassigned to {fresh}", entries[index].id);
            entries[index].id = fresh;
            reassigned += 1;
        }
    }
    reassigned
}

fn generate_unique_id(entries: &[Entry]) -> String {
    loop {
        let id = generate_id();
        if !entries.iter().any(|entry| entry.id == id) {
            return id;
        }
    }
}

pub fn generate_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

/// Accepts RFC 3339 instants or plain `YYYY-MM-DD` days (local midnight).
pub fn parse_entry_date(input: &str) -> Option<DateTime<Utc>> {
    let value = input.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(local_midnight_utc)
}

pub fn local_midnight_utc(day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    if let Some(timestamp) = local_naive_to_utc(midnight) {
        return timestamp;
    }

    // Midnight can fall inside a DST gap; take the first local minute that exists.
    let mut cursor = midnight + Duration::minutes(1);
    for _ in 0..120 {
        if let Some(timestamp) = local_naive_to_utc(cursor) {
            return timestamp;
        }
        cursor += Duration::minutes(1);
    }

    midnight.and_utc()
}

fn local_naive_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(local_datetime) => Some(local_datetime.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, second) => Some(first.min(second).with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::String(value)) => parse_entry_date(value),
        Some(_) => None,
    };
    if parsed.is_none() {
        if let Some(value) = raw {
            warn!("entry date {value} is not a valid date; keeping the entry undated");
        }
    }
    Ok(parsed)
}
