//! Command-line interface for the daybook binary.
//!
//! Parsing is done with clap's derive API. [`execute`] runs one parsed
//! command against a [`Config`] and writes plain-text results to any writer,
//! which keeps the binary's `main` down to setup and error reporting.

use crate::config::Config;
use crate::constants::{APP_DESCRIPTION, APP_NAME};
use crate::entry::filename::{parse_date, parse_month, parse_time, EntryId};
use crate::entry::quick_tags::{self, normalize_tags, ParsedContent, QuickTags};
use crate::entry::record::Record;
use crate::entry::Entry;
use crate::errors::{AppError, AppResult};
use crate::ops::backup;
use crate::query::{paginate, QueryEngine};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A flat-file journal with tags, images and memories
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION)]
#[command(author, version, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List entries, newest first
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show one entry (identifier such as 2024-03-01_0930)
    Show { id: String },
    /// Create or overwrite the entry for a date and time
    Save(SaveArgs),
    /// Move an entry to another date and time
    Move {
        id: String,
        #[arg(short, long)]
        date: String,
        #[arg(short, long)]
        time: String,
    },
    /// Delete an entry and its images
    Delete { id: String },
    /// Search titles and contents, ignoring case
    Search { keyword: String },
    /// List entries carrying a tag
    Tag { tag: String },
    /// List entries for a month (YYYY-MM)
    Month {
        month: String,
        /// Print entry counts per day instead of the entries
        #[arg(long)]
        calendar: bool,
    },
    /// List entries for a day (YYYY-MM-DD)
    Day { date: String },
    /// Entries written on this day in past years
    Memories {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Tag cloud: every tag with its entry count
    Tags {
        /// Print a JSON array instead of plain lines
        #[arg(long)]
        json: bool,
    },
    /// Attach an image file to an entry
    Attach {
        id: String,
        file: PathBuf,
        /// MIME type, guessed from the file extension if omitted
        #[arg(long)]
        mime: Option<String>,
    },
    /// Remove an image from an entry
    Detach { id: String, name: String },
    /// Corpus statistics
    Stats,
    /// Write a tar.gz backup of entries and images
    Backup { output: PathBuf },
    /// Check a backup archive without restoring it
    VerifyBackup {
        archive: PathBuf,
        /// Print the manifest as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore a backup into an empty or missing directory
    Restore { archive: PathBuf, target: PathBuf },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SaveArgs {
    /// Entry date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    pub date: Option<String>,
    /// Entry time (HH:MM), defaults to now
    #[arg(short, long)]
    pub time: Option<String>,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub weather: Option<String>,
    #[arg(long)]
    pub mood: Option<String>,
    #[arg(long)]
    pub plans: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
    #[arg(short, long, default_value = "")]
    pub body: String,
}

impl SaveArgs {
    /// Builds the stored content: metadata lines, a blank line, then the body.
    pub fn content(&self) -> String {
        let parsed = ParsedContent {
            quick_tags: QuickTags {
                location: non_empty(&self.location),
                weather: non_empty(&self.weather),
                mood: non_empty(&self.mood),
                plans: non_empty(&self.plans),
            },
            tags: self.tags.as_deref().map(normalize_tags).unwrap_or_default(),
            content: self.body.clone(),
        };
        quick_tags::format(&parsed)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Runs `command`, writing its output to `out`.
///
/// `now` supplies the defaults for `save` and `memories`.
pub fn execute(
    command: Command,
    config: &Config,
    now: NaiveDateTime,
    out: &mut impl Write,
) -> AppResult<()> {
    debug!("Executing {:?}", command);
    let store = config.entry_store();
    let engine = QueryEngine::new(&store);

    match command {
        Command::List { page } => {
            let page = paginate(engine.list_all()?, page, config.page_size);
            for entry in &page.items {
                write_summary(out, entry)?;
            }
            writeln!(
                out,
                "Page {} of {} ({} entries)",
                page.page,
                page.total_pages.max(1),
                page.total_items
            )?;
        }
        Command::Show { id } => {
            let id = EntryId::parse(&id)?;
            let entry = store.get(&id)?;
            write_entry(out, &entry)?;
            let adjacent = engine.adjacent(&id)?;
            if let Some(older) = adjacent.older {
                writeln!(out, "Older: {}", older)?;
            }
            if let Some(newer) = adjacent.newer {
                writeln!(out, "Newer: {}", newer)?;
            }
        }
        Command::Save(args) => {
            let date = match &args.date {
                Some(raw) => parse_date(raw)?,
                None => now.date(),
            };
            let time = match &args.time {
                Some(raw) => parse_time(raw)?,
                None => now.time(),
            };
            let id = EntryId::encode(date, time);
            store.ensure_dir()?;

            // Overwriting keeps the images already attached.
            let images = store.load(&id)?.map(|e| e.images).unwrap_or_default();
            store.save(&id, &Record::new(args.title.clone(), images, args.content()))?;
            writeln!(out, "Saved {}", id)?;
        }
        Command::Move { id, date, time } => {
            let old_id = EntryId::parse(&id)?;
            let new_id = EntryId::encode(parse_date(&date)?, parse_time(&time)?);
            let entry = store.get(&old_id)?;
            if new_id != old_id && store.load(&new_id)?.is_some() {
                return Err(AppError::InvalidFormat(format!(
                    "An entry already exists at {}",
                    new_id
                )));
            }
            store.update(&old_id, &new_id, &entry.record())?;
            writeln!(out, "Moved {} to {}", old_id, new_id)?;
        }
        Command::Delete { id } => {
            let id = EntryId::parse(&id)?;
            store.delete(&id)?;
            writeln!(out, "Deleted {}", id)?;
        }
        Command::Search { keyword } => write_list(out, &engine.search(&keyword)?)?,
        Command::Tag { tag } => write_list(out, &engine.filter_by_tag(&tag)?)?,
        Command::Month { month, calendar } => {
            let (year, month) = parse_month(&month)?;
            if calendar {
                for (day, count) in engine.calendar(year, month)? {
                    writeln!(out, "{:04}-{:02}-{:02}  {}", year, month, day, count)?;
                }
            } else {
                write_list(out, &engine.filter_by_month(year, month)?)?;
            }
        }
        Command::Day { date } => write_list(out, &engine.filter_by_date(parse_date(&date)?)?)?,
        Command::Memories { date } => {
            let reference = parse_reference_date(date.as_deref(), now.date())?;
            let memories = engine.memories(reference)?;
            if memories.is_empty() {
                writeln!(out, "No memories for {}", reference)?;
            }
            for memory in memories {
                let unit = if memory.years_ago == 1 { "year" } else { "years" };
                write!(out, "{} {} ago: ", memory.years_ago, unit)?;
                write_summary(out, &memory.entry)?;
            }
        }
        Command::Tags { json } => {
            let cloud = engine.tag_cloud()?;
            if json {
                write_json(out, &cloud)?;
            } else {
                for tag in cloud {
                    writeln!(out, "{} ({})", tag.tag, tag.count)?;
                }
            }
        }
        Command::Attach { id, file, mime } => {
            let id = EntryId::parse(&id)?;
            let bytes = fs::read(&file)?;
            let mime = mime.unwrap_or_else(|| guess_mime(&file).to_string());
            let stored = store.attach_image(&id, &bytes, &mime)?;
            writeln!(out, "Attached {} to {}", stored, id)?;
        }
        Command::Detach { id, name } => {
            let id = EntryId::parse(&id)?;
            if store.detach_image(&id, &name)? {
                writeln!(out, "Detached {} from {}", name, id)?;
            } else {
                writeln!(out, "{} has no image {}", id, name)?;
            }
        }
        Command::Stats => {
            let stats = engine.stats()?;
            writeln!(out, "Entries: {}", stats.total_entries)?;
            writeln!(out, "Tags: {}", stats.total_tags)?;
            writeln!(out, "Entries with images: {}", stats.entries_with_images)?;
            if let (Some(first), Some(last)) = (stats.first, stats.last) {
                writeln!(out, "First: {}", first)?;
                writeln!(out, "Last: {}", last)?;
            }
        }
        Command::Backup { output } => {
            let report = backup::create_backup(config, &output)?;
            writeln!(
                out,
                "Backup written: {} entries, {} images, {} bytes",
                report.total_entries, report.total_images, report.archive_size
            )?;
            writeln!(out, "Checksum: {}", report.checksum)?;
        }
        Command::VerifyBackup { archive, json } => {
            let manifest = backup::verify_backup(&archive)?;
            if json {
                return write_json(out, &manifest);
            }
            writeln!(
                out,
                "Backup OK: {} entries, {} images",
                manifest.entries.len(),
                manifest.images.len()
            )?;
        }
        Command::Restore { archive, target } => {
            let manifest = backup::restore_backup(&archive, &target)?;
            writeln!(
                out,
                "Restored {} entries and {} images into {}",
                manifest.entries.len(),
                manifest.images.len(),
                target.display()
            )?;
        }
    }
    Ok(())
}

/// MIME type for an image path, by extension.
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> AppResult<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

fn write_summary(out: &mut impl Write, entry: &Entry) -> AppResult<()> {
    write!(out, "{}  {}", entry.id, entry.title)?;
    if !entry.tags().is_empty() {
        let tags: Vec<String> = entry.tags().iter().map(|t| format!("#{t}")).collect();
        write!(out, "  [{}]", tags.join(" "))?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_list(out: &mut impl Write, entries: &[Entry]) -> AppResult<()> {
    if entries.is_empty() {
        writeln!(out, "No entries found")?;
    }
    for entry in entries {
        write_summary(out, entry)?;
    }
    Ok(())
}

fn write_entry(out: &mut impl Write, entry: &Entry) -> AppResult<()> {
    writeln!(out, "{}", entry.title)?;
    writeln!(out, "{} {}", entry.date, entry.time.format("%H:%M"))?;

    let quick = &entry.parsed.quick_tags;
    for (label, value) in [
        ("Location", &quick.location),
        ("Weather", &quick.weather),
        ("Mood", &quick.mood),
        ("Plans", &quick.plans),
    ] {
        if let Some(value) = value {
            writeln!(out, "{}: {}", label, value)?;
        }
    }
    if !entry.tags().is_empty() {
        writeln!(out, "Tags: {}", entry.tags().join(", "))?;
    }
    if !entry.images.is_empty() {
        writeln!(out, "Images: {}", entry.images.join(", "))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", entry.content())?;
    Ok(())
}

/// The given `YYYY-MM-DD` date, or `today` when none is given.
pub fn parse_reference_date(raw: Option<&str>, today: NaiveDate) -> AppResult<NaiveDate> {
    raw.map(parse_date).unwrap_or(Ok(today))
}
