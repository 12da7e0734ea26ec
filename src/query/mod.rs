//! Read-time queries over the whole entry corpus.
//!
//! There is no index. Every query scans the entries directory, decodes every
//! file, and filters in memory, so results always reflect what is on disk.
//! Files that cannot be read are skipped; they never fail a query.
//!
//! Results are ordered newest first by identifier unless noted otherwise.

mod pagination;

pub use pagination::{paginate, Page};

use crate::constants::{MEMORY_MAX_YEARS_AGO, MONTHS_PER_YEAR};
use crate::entry::filename::{month_prefix, EntryId};
use crate::entry::quick_tags::tag_key;
use crate::entry::Entry;
use crate::errors::AppResult;
use crate::images::ImageStore;
use crate::store::EntryStore;
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// An entry from a past year matching the reference calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    pub years_ago: u32,
    pub entry: Entry,
}

/// How many entries carry a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    /// Spelling of the tag in the newest entry that uses it.
    pub tag: String,
    pub count: usize,
}

/// Neighbours of an entry in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacent {
    pub older: Option<EntryId>,
    pub newer: Option<EntryId>,
}

/// Corpus-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalStats {
    pub total_entries: usize,
    /// Distinct entry tags, ignoring case.
    pub total_tags: usize,
    pub entries_with_images: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

/// Query engine borrowing an [`EntryStore`].
#[derive(Debug)]
pub struct QueryEngine<'a, S: ImageStore> {
    store: &'a EntryStore<S>,
}

impl<'a, S: ImageStore> QueryEngine<'a, S> {
    pub fn new(store: &'a EntryStore<S>) -> Self {
        QueryEngine { store }
    }

    /// Every readable entry, newest first.
    pub fn list_all(&self) -> AppResult<Vec<Entry>> {
        let mut entries = self.store.scan()?.entries;
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        debug!("Listed {} entries", entries.len());
        Ok(entries)
    }

    /// Entries whose title or raw content contains `keyword`, ignoring case.
    ///
    /// The raw content includes the metadata lines, so searching for a mood or
    /// a location works. An empty keyword matches everything.
    pub fn search(&self, keyword: &str) -> AppResult<Vec<Entry>> {
        info!("Searching for: {}", keyword);
        let needle = keyword.to_lowercase();

        let results: Vec<Entry> = self
            .list_all()?
            .into_iter()
            .filter(|e| {
                e.title.to_lowercase().contains(&needle) || e.body.to_lowercase().contains(&needle)
            })
            .collect();

        info!("Returning {} search results", results.len());
        Ok(results)
    }

    /// Entries tagged `tag`, compared case-insensitively and without `#`.
    pub fn filter_by_tag(&self, tag: &str) -> AppResult<Vec<Entry>> {
        let wanted = tag_key(tag);
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|e| e.tags().iter().any(|t| tag_key(t) == wanted))
            .collect())
    }

    /// Entries whose identifier starts with `YYYY-MM`.
    pub fn filter_by_month(&self, year: i32, month: u32) -> AppResult<Vec<Entry>> {
        let prefix = month_prefix(year, month)?;
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|e| e.id.as_str().starts_with(&prefix))
            .collect())
    }

    /// Entries written on `date`.
    pub fn filter_by_date(&self, date: NaiveDate) -> AppResult<Vec<Entry>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|e| e.date == date)
            .collect())
    }

    /// Entries written on this calendar day 1 to 10 years before `reference`.
    ///
    /// Results are grouped by `years_ago`, ascending. "N years ago" subtracts
    /// 12·N calendar months, so February 29 maps to February 28 in a
    /// non-leap year.
    pub fn memories(&self, reference: NaiveDate) -> AppResult<Vec<Memory>> {
        let entries = self.list_all()?;
        let mut memories = Vec::new();

        for years_ago in 1..=MEMORY_MAX_YEARS_AGO {
            let months = Months::new(years_ago * MONTHS_PER_YEAR);
            let Some(target) = reference.checked_sub_months(months) else {
                continue;
            };
            memories.extend(
                entries
                    .iter()
                    .filter(|e| e.date == target)
                    .map(|e| Memory {
                        years_ago,
                        entry: e.clone(),
                    }),
            );
        }

        debug!("Found {} memories for {}", memories.len(), reference);
        Ok(memories)
    }

    /// Tag usage counts, most used first; ties by tag name, ignoring case.
    pub fn tag_cloud(&self) -> AppResult<Vec<TagCount>> {
        let mut counts: HashMap<String, TagCount> = HashMap::new();

        for entry in self.list_all()? {
            for tag in entry.tags() {
                counts
                    .entry(tag_key(tag))
                    .or_insert_with(|| TagCount {
                        tag: tag.clone(),
                        count: 0,
                    })
                    .count += 1;
            }
        }

        let mut cloud: Vec<(String, TagCount)> = counts.into_iter().collect();
        cloud.sort_by(|(ka, a), (kb, b)| b.count.cmp(&a.count).then_with(|| ka.cmp(kb)));
        Ok(cloud.into_iter().map(|(_, tc)| tc).collect())
    }

    /// The entries just before and after `id`, whether or not `id` exists.
    pub fn adjacent(&self, id: &EntryId) -> AppResult<Adjacent> {
        let mut adjacent = Adjacent::default();
        for entry in self.list_all()? {
            if entry.id > *id {
                adjacent.newer = Some(entry.id);
            } else if entry.id < *id {
                adjacent.older = Some(entry.id);
                break;
            }
        }
        Ok(adjacent)
    }

    /// Number of entries per day of the month, for days that have any.
    pub fn calendar(&self, year: i32, month: u32) -> AppResult<BTreeMap<u32, usize>> {
        let mut days = BTreeMap::new();
        for entry in self.filter_by_month(year, month)? {
            *days.entry(entry.date.day()).or_insert(0) += 1;
        }
        Ok(days)
    }

    pub fn stats(&self) -> AppResult<JournalStats> {
        let entries = self.list_all()?;
        let tags = self.tag_cloud()?;

        Ok(JournalStats {
            total_entries: entries.len(),
            total_tags: tags.len(),
            entries_with_images: entries.iter().filter(|e| !e.images.is_empty()).count(),
            first: entries.last().map(|e| e.date),
            last: entries.first().map(|e| e.date),
        })
    }
}
