//! Configuration management for the daybook application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `DAYBOOK_DIR`: Entries directory (defaults to ~/Documents/daybook/entries)
//! - `DAYBOOK_IMAGES_DIR`: Image directory (defaults to an `images` directory next to the entries directory)
//! - `DAYBOOK_PAGE_SIZE`: Entries per listing page (defaults to 20)
//! - `DAYBOOK_MAX_IMAGE_BYTES`: Largest accepted upload (defaults to 10 MiB)
//! - `HOME`: Used for expanding the default entries directory path

use crate::constants::{
    DEFAULT_ENTRIES_SUBDIR, DEFAULT_IMAGES_DIRNAME, DEFAULT_MAX_IMAGE_BYTES, DEFAULT_PAGE_SIZE,
    ENV_VAR_DAYBOOK_DIR, ENV_VAR_DAYBOOK_IMAGES_DIR, ENV_VAR_DAYBOOK_MAX_IMAGE_BYTES,
    ENV_VAR_DAYBOOK_PAGE_SIZE, ENV_VAR_HOME, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use crate::images::DirImageStore;
use crate::store::EntryStore;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Configuration for the daybook application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use daybook::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     entries_dir: PathBuf::from("/journal/entries"),
///     images_dir: PathBuf::from("/journal/images"),
///     ..Config::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct Config {
    /// Directory holding one `.txt` file per entry.
    pub entries_dir: PathBuf,

    /// Directory the image store writes uploads to.
    pub images_dir: PathBuf,

    /// Entries per page when listing.
    pub page_size: usize,

    /// Largest accepted image upload, in bytes.
    pub max_image_bytes: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("entries_dir", &REDACTED_PLACEHOLDER)
            .field("images_dir", &REDACTED_PLACEHOLDER)
            .field("page_size", &self.page_size)
            .field("max_image_bytes", &self.max_image_bytes)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            entries_dir: PathBuf::from(""),
            images_dir: PathBuf::from(""),
            page_size: DEFAULT_PAGE_SIZE,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// Paths are expanded with `shellexpand`, so `~` and `$VAR` work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a path cannot be expanded or a numeric
    /// variable does not parse.
    pub fn load() -> AppResult<Self> {
        let entries_raw = env::var(ENV_VAR_DAYBOOK_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_ENTRIES_SUBDIR)
        });
        let entries_dir = expand_path(&entries_raw)?;

        let images_dir = match env::var(ENV_VAR_DAYBOOK_IMAGES_DIR) {
            Ok(raw) => expand_path(&raw)?,
            Err(_) => default_images_dir(&entries_dir),
        };

        let page_size = parse_env(ENV_VAR_DAYBOOK_PAGE_SIZE, DEFAULT_PAGE_SIZE)?;
        let max_image_bytes = parse_env(ENV_VAR_DAYBOOK_MAX_IMAGE_BYTES, DEFAULT_MAX_IMAGE_BYTES)?;

        Ok(Config {
            entries_dir,
            images_dir,
            page_size,
            max_image_bytes,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if either directory is empty or relative, or
    /// if the page size is zero.
    pub fn validate(&self) -> AppResult<()> {
        for (name, dir) in [("Entries", &self.entries_dir), ("Images", &self.images_dir)] {
            if dir.as_os_str().is_empty() {
                return Err(AppError::Config(format!("{name} directory path is empty")));
            }
            if !dir.is_absolute() {
                return Err(AppError::Config(format!(
                    "{name} directory must be an absolute path"
                )));
            }
        }

        if self.page_size == 0 {
            return Err(AppError::Config(
                "Page size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the entry store described by this configuration.
    pub fn entry_store(&self) -> EntryStore<DirImageStore> {
        EntryStore::new(
            self.entries_dir.clone(),
            DirImageStore::new(self.images_dir.clone(), self.max_image_bytes),
        )
    }
}

fn expand_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

fn default_images_dir(entries_dir: &Path) -> PathBuf {
    entries_dir
        .parent()
        .unwrap_or(entries_dir)
        .join(DEFAULT_IMAGES_DIRNAME)
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{name} must be a number, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}
