//! Journal entries and the codecs that give them their on-disk shape.
//!
//! - [`filename`]: identifiers such as `2024-03-01_0930`
//! - [`record`]: the title / image list / body text blob
//! - [`quick_tags`]: the metadata block at the top of the body

pub mod filename;
pub mod quick_tags;
pub mod record;

use crate::constants::MAX_TITLE_CHARS;
use crate::errors::{AppError, AppResult};
use chrono::{NaiveDate, NaiveTime};
use filename::EntryId;
use quick_tags::ParsedContent;
use record::Record;

/// A decoded entry, as returned by the store and the query engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub title: String,
    pub images: Vec<String>,
    /// Raw stored content, metadata lines included.
    pub body: String,
    /// Metadata and remaining text parsed out of `body`.
    pub parsed: ParsedContent,
}

impl Entry {
    /// Builds an entry from its identifier and stored blob.
    pub fn from_blob(id: EntryId, blob: &str) -> AppResult<Self> {
        let (date, time) = id.decode()?;
        let Record { title, images, body } = record::decode(blob);
        let parsed = quick_tags::extract(&body);
        Ok(Entry {
            id,
            date,
            time,
            title,
            images,
            body,
            parsed,
        })
    }

    pub fn tags(&self) -> &[String] {
        &self.parsed.tags
    }

    pub fn content(&self) -> &str {
        &self.parsed.content
    }

    pub fn record(&self) -> Record {
        Record::new(self.title.clone(), self.images.clone(), self.body.clone())
    }
}

/// Normalizes and checks a title before it is written.
///
/// The title must be non-empty after trimming, a single line, and at most
/// 200 characters.
pub fn validate_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidFormat("Title is required".to_string()));
    }
    if title.contains(['\n', '\r']) {
        return Err(AppError::InvalidFormat(
            "Title must be a single line".to_string(),
        ));
    }
    let chars = title.chars().count();
    if chars > MAX_TITLE_CHARS {
        return Err(AppError::InvalidFormat(format!(
            "Title is {chars} characters, the limit is {MAX_TITLE_CHARS}"
        )));
    }
    Ok(title.to_string())
}
