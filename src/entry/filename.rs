//! Entry identifiers derived from an entry's date and minute.
//!
//! An identifier looks like `2024-03-01_0930` and names the file
//! `2024-03-01_0930.txt`. Every field is fixed-width and zero-padded, so
//! comparing identifiers as strings compares them chronologically.

use crate::constants::{DATE_FORMAT_ISO, ENTRY_FILE_EXTENSION, IDENTIFIER_LEN, TIME_FORMAT_INPUT};
use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Canonical identifier of an entry.
///
/// Ordering is plain string ordering, which is also chronological ordering.
///
/// # Examples
///
/// ```
/// use daybook::entry::filename::EntryId;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
/// let id = EntryId::encode(date, time);
/// assert_eq!(id.as_str(), "2024-03-01_0930");
/// assert_eq!(id.file_name(), "2024-03-01_0930.txt");
/// assert_eq!(id.decode().unwrap(), (date, time));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Builds the identifier for a date and time. Seconds are dropped.
    pub fn encode(date: NaiveDate, time: NaiveTime) -> Self {
        EntryId(format!(
            "{:04}-{:02}-{:02}_{:02}{:02}",
            date.year(),
            date.month(),
            date.day(),
            time.hour(),
            time.minute()
        ))
    }

    /// Parses and validates an identifier string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidFormat` unless the string is exactly
    /// `YYYY-MM-DD_HHMM` and names a real date and time.
    pub fn parse(identifier: &str) -> AppResult<Self> {
        decode(identifier)?;
        Ok(EntryId(identifier.to_string()))
    }

    /// Splits the identifier back into its date and time.
    pub fn decode(&self) -> AppResult<(NaiveDate, NaiveTime)> {
        decode(&self.0)
    }

    /// The date component. Identifiers are validated on construction.
    pub fn date(&self) -> AppResult<NaiveDate> {
        self.decode().map(|(date, _)| date)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the entry, e.g. `2024-03-01_0930.txt`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, ENTRY_FILE_EXTENSION)
    }

    /// Maps a directory entry back to an identifier.
    ///
    /// Returns `None` for files with another extension or a stem that is not a
    /// valid identifier.
    pub fn from_file_name(path: &Path) -> Option<Self> {
        if path.extension()? != ENTRY_FILE_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        EntryId::parse(stem).ok()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntryId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryId::parse(s)
    }
}

/// Decodes an identifier string into its date and time.
///
/// # Errors
///
/// Returns `AppError::InvalidFormat` for wrong length, non-digit fields, wrong
/// separators, or impossible dates and times (`2023-02-30`, `2460`).
pub fn decode(identifier: &str) -> AppResult<(NaiveDate, NaiveTime)> {
    let invalid = || AppError::InvalidFormat(format!("Invalid entry identifier: {identifier:?}"));

    let bytes = identifier.as_bytes();
    if bytes.len() != IDENTIFIER_LEN {
        return Err(invalid());
    }

    // YYYY-MM-DD_HHMM
    for (i, b) in bytes.iter().enumerate() {
        let ok = match i {
            4 | 7 => *b == b'-',
            10 => *b == b'_',
            _ => b.is_ascii_digit(),
        };
        if !ok {
            return Err(invalid());
        }
    }

    let field = |range: std::ops::Range<usize>| -> u32 {
        identifier[range]
            .bytes()
            .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
    };

    let date = NaiveDate::from_ymd_opt(field(0..4) as i32, field(5..7), field(8..10))
        .ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(field(11..13), field(13..15), 0).ok_or_else(invalid)?;

    Ok((date, time))
}

/// Parses a user supplied `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT_ISO)
        .map_err(|e| AppError::InvalidFormat(format!("Invalid date {input:?}: {e}")))
}

/// Parses a user supplied `HH:MM` time.
pub fn parse_time(input: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT_INPUT)
        .map_err(|e| AppError::InvalidFormat(format!("Invalid time {input:?}: {e}")))
}

/// Identifier prefix shared by every entry of a month, e.g. `2024-03`.
pub fn month_prefix(year: i32, month: u32) -> AppResult<String> {
    if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
        return Err(AppError::InvalidFormat(format!(
            "Invalid month: {year}-{month}"
        )));
    }
    Ok(format!("{year:04}-{month:02}"))
}

/// Parses a `YYYY-MM` month argument into its parts.
pub fn parse_month(input: &str) -> AppResult<(i32, u32)> {
    let invalid = || AppError::InvalidFormat(format!("Invalid month {input:?}, expected YYYY-MM"));
    let (year, month) = input.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    month_prefix(year, month)?;
    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_encode_zero_pads_every_field() {
        assert_eq!(EntryId::encode(ymd(2024, 3, 1), hm(9, 5)).as_str(), "2024-03-01_0905");
        assert_eq!(EntryId::encode(ymd(987, 1, 1), hm(0, 0)).as_str(), "0987-01-01_0000");
    }

    #[test]
    fn test_encode_drops_seconds() {
        let time = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        let id = EntryId::encode(ymd(2024, 12, 31), time);
        assert_eq!(id.as_str(), "2024-12-31_2359");
        assert_eq!(id.decode().unwrap().1, hm(23, 59));
    }

    #[test]
    fn test_decode_rejects_malformed_identifiers() {
        for bad in [
            "",
            "2024-03-01",
            "2024-03-01_930",
            "2024-03-01-0930",
            "2024/03/01_0930",
            "2024-03-01_09:30",
            "2024-3-01_09300",
            "abcd-ef-gh_ijkl",
            "2023-02-30_0930",
            "2024-13-01_0930",
            "2024-03-01_2400",
            "2024-03-01_0960",
            "2024-03-01_0930.txt",
        ] {
            match decode(bad) {
                Err(AppError::InvalidFormat(msg)) => assert!(msg.contains("identifier")),
                other => panic!("Expected InvalidFormat for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_leap_day_identifier_is_valid() {
        assert_eq!(decode("2024-02-29_1200").unwrap().0, ymd(2024, 2, 29));
        assert!(decode("2023-02-29_1200").is_err());
    }

    #[test]
    fn test_string_order_matches_chronological_order() {
        let moments = [
            (ymd(999, 12, 31), hm(23, 59)),
            (ymd(2023, 12, 31), hm(23, 59)),
            (ymd(2024, 1, 1), hm(0, 0)),
            (ymd(2024, 1, 1), hm(0, 1)),
            (ymd(2024, 1, 1), hm(9, 59)),
            (ymd(2024, 1, 1), hm(10, 0)),
            (ymd(2024, 1, 9), hm(8, 0)),
            (ymd(2024, 1, 10), hm(8, 0)),
            (ymd(2024, 9, 30), hm(8, 0)),
            (ymd(2024, 10, 1), hm(8, 0)),
        ];
        for pair in moments.windows(2) {
            let a = EntryId::encode(pair[0].0, pair[0].1);
            let b = EntryId::encode(pair[1].0, pair[1].1);
            assert!(a < b, "{a} should sort before {b}");
            assert!(a.as_str() < b.as_str());
        }
    }

    #[test]
    fn test_from_file_name() {
        let id = EntryId::from_file_name(&PathBuf::from("/tmp/j/2024-03-01_0930.txt")).unwrap();
        assert_eq!(id.as_str(), "2024-03-01_0930");

        assert!(EntryId::from_file_name(&PathBuf::from("2024-03-01_0930.md")).is_none());
        assert!(EntryId::from_file_name(&PathBuf::from("notes.txt")).is_none());
        assert!(EntryId::from_file_name(&PathBuf::from("2024-03-01_0930")).is_none());
    }

    #[test]
    fn test_parse_user_input() {
        assert_eq!(parse_date("2024-03-01").unwrap(), ymd(2024, 3, 1));
        assert_eq!(parse_time("09:30").unwrap(), hm(9, 30));
        assert!(matches!(parse_date("03/01/2024"), Err(AppError::InvalidFormat(_))));
        assert!(matches!(parse_time("9.30"), Err(AppError::InvalidFormat(_))));
        assert!(matches!(parse_time("25:00"), Err(AppError::InvalidFormat(_))));
    }

    #[test]
    fn test_month_prefix_and_parse_month() {
        assert_eq!(month_prefix(2024, 3).unwrap(), "2024-03");
        assert!(month_prefix(2024, 0).is_err());
        assert!(month_prefix(2024, 13).is_err());

        assert_eq!(parse_month("2024-03").unwrap(), (2024, 3));
        assert!(parse_month("2024-3").is_err());
        assert!(parse_month("2024").is_err());
        assert!(parse_month("2024-13").is_err());
    }

    #[test]
    fn test_from_str() {
        let id: EntryId = "2024-03-02_0800".parse().unwrap();
        assert_eq!(id.to_string(), "2024-03-02_0800");
        assert!("nope".parse::<EntryId>().is_err());
    }
}
