use std::collections::HashMap;

use chrono::{DateTime, TimeZone};

use crate::catalog::Category;
use crate::domain::Entry;
use crate::window::{Window, filter_entries};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
    pub owner: String,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl OwnerSummary {
    pub fn completion_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Per-owner totals, largest first. Owners with equal totals keep the order in
/// which they first appear in `entries`.
pub fn summarize_by_owner(entries: &[Entry]) -> Vec<OwnerSummary> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<OwnerSummary> = Vec::new();

    for entry in entries {
        let index = *positions.entry(entry.owner.as_str()).or_insert_with(|| {
            rows.push(OwnerSummary {
                owner: entry.owner.clone(),
                total: 0,
                completed: 0,
                pending: 0,
            });
            rows.len() - 1
        });

        let row = &mut rows[index];
        row.total += 1;
        if entry.completed {
            row.completed += 1;
        } else {
            row.pending += 1;
        }
    }

    rows.sort_by(|left, right| right.total.cmp(&left.total));
    rows
}

/// Entry count per category present in `entries`, largest first, ties in
/// first-seen order. Categories without entries are left out.
pub fn distribute_by_category(entries: &[Entry]) -> Vec<CategoryCount> {
    let mut rows: Vec<CategoryCount> = Vec::new();

    for entry in entries {
        match rows.iter_mut().find(|row| row.category == entry.category) {
            Some(row) => row.count += 1,
            None => rows.push(CategoryCount {
                category: entry.category,
                count: 1,
            }),
        }
    }

    rows.sort_by(|left, right| right.count.cmp(&left.count));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub entry_count: usize,
    pub completed: usize,
    pub pending: usize,
    pub owners: Vec<OwnerSummary>,
    pub categories: Vec<CategoryCount>,
}

impl Statistics {
    pub fn compute<Tz: TimeZone>(entries: &[Entry], window: Window, reference: &DateTime<Tz>) -> Self {
        let filtered = filter_entries(entries, window, reference);
        let completed = filtered.iter().filter(|entry| entry.completed).count();

        Self {
            entry_count: filtered.len(),
            completed,
            pending: filtered.len() - completed,
            owners: summarize_by_owner(&filtered),
            categories: distribute_by_category(&filtered),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }
}
