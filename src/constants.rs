//! Constants used throughout the application.
//!
//! This module contains all constants used in the Daybook application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "daybook";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A flat-file journal with tags, images and memories";

// Logging
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the entries directory.
pub const ENV_VAR_DAYBOOK_DIR: &str = "DAYBOOK_DIR";
/// Environment variable for the image store directory.
pub const ENV_VAR_DAYBOOK_IMAGES_DIR: &str = "DAYBOOK_IMAGES_DIR";
/// Environment variable for the listing page size.
pub const ENV_VAR_DAYBOOK_PAGE_SIZE: &str = "DAYBOOK_PAGE_SIZE";
/// Environment variable for the maximum accepted upload size in bytes.
pub const ENV_VAR_DAYBOOK_MAX_IMAGE_BYTES: &str = "DAYBOOK_MAX_IMAGE_BYTES";
/// Environment variable selecting `text` or `json` log output.
pub const ENV_VAR_DAYBOOK_LOG_FORMAT: &str = "DAYBOOK_LOG_FORMAT";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Standard environment variables naming the logged-in user, in lookup order.
pub const ENV_VARS_USER: [&str; 2] = ["USER", "LOGNAME"];
/// Default entries directory, relative to the user's home directory.
pub const DEFAULT_ENTRIES_SUBDIR: &str = "Documents/daybook/entries";
/// Name of the image directory created next to the entries directory.
pub const DEFAULT_IMAGES_DIRNAME: &str = "images";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// File System Parameters
/// File extension for entry files, without the dot.
pub const ENTRY_FILE_EXTENSION: &str = "txt";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for newly created files (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Entry Identity
/// Date format used in identifiers and user input (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Time format accepted from user input (HH:MM).
pub const TIME_FORMAT_INPUT: &str = "%H:%M";
/// Length of an identifier such as `2024-03-01_0930`.
pub const IDENTIFIER_LEN: usize = 15;

// Entry Content
/// Maximum number of characters in an entry title.
pub const MAX_TITLE_CHARS: usize = 200;

// Queries
/// Default number of entries per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Furthest year offset searched by the memories query.
pub const MEMORY_MAX_YEARS_AGO: u32 = 10;
/// Number of months in a year.
pub const MONTHS_PER_YEAR: u32 = 12;

// Images
/// Default upper bound on an uploaded image, in bytes (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

// Backup
/// Archive directory holding entry files.
pub const BACKUP_ENTRIES_DIR: &str = "entries";
/// Archive directory holding image files.
pub const BACKUP_IMAGES_DIR: &str = "images";
