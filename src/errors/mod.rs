//! Error handling utilities for the daybook application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Two conditions never surface as an `Err`: a malformed stored record decodes
//! to partial fields, and an image reference whose file is already gone is
//! logged and ignored.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents errors that can occur when attempting to lock entry files.
///
/// # Examples
///
/// Creating a file busy error:
///
/// ```
/// use daybook::errors::LockError;
/// use std::path::PathBuf;
///
/// let error = LockError::FileBusy {
///     path: PathBuf::from("/path/to/2024-03-01_0930.txt"),
/// };
///
/// assert!(format!("{}", error).contains("being written"));
/// ```
///
/// Creating an acquisition failed error:
///
/// ```
/// use daybook::errors::LockError;
/// use std::path::PathBuf;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::PermissionDenied, "permission denied");
/// let error = LockError::AcquisitionFailed {
///     path: PathBuf::from("/path/to/2024-03-01_0930.txt"),
///     source: io_error,
/// };
///
/// assert!(format!("{}", error).contains("Failed to acquire lock"));
/// assert!(format!("{}", error).contains("permission denied"));
/// ```
#[derive(Debug, Error)]
pub enum LockError {
    /// Another writer currently holds the lock on this entry file.
    #[error("Entry file is currently being written by another process: {path}. Please retry the save.")]
    FileBusy {
        /// The path to the file that is locked
        path: PathBuf,
    },

    /// Error when acquiring the lock fails for a technical reason.
    #[error("Failed to acquire lock for entry file {path}: {source}. Please check file permissions and ensure the directory is accessible.")]
    AcquisitionFailed {
        /// The path to the file that couldn't be locked
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Failures reported by an image store when accepting an upload.
///
/// # Examples
///
/// ```
/// use daybook::errors::ImageError;
///
/// let error = ImageError::TooLarge { size: 20, limit: 10 };
/// assert!(format!("{}", error).contains("20"));
/// ```
#[derive(Debug, Error)]
pub enum ImageError {
    /// The declared MIME type is not an accepted image type.
    #[error("Unsupported image type: {0}")]
    Unsupported(String),

    /// The upload exceeds the configured byte limit.
    #[error("Image is too large: {size} bytes (limit {limit} bytes)")]
    TooLarge {
        /// Size of the rejected upload
        size: u64,
        /// Configured limit
        limit: u64,
    },

    /// The bytes do not look like the declared image type.
    #[error("Image could not be decoded: {0}")]
    DecodeError(String),

    /// The image store could not write the file.
    #[error("Image store I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Represents all possible errors that can occur in the daybook application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating an invalid format error:
/// ```
/// use daybook::errors::AppError;
///
/// let error = AppError::InvalidFormat("bad identifier".to_string());
/// assert_eq!(format!("{}", error), "Invalid format: bad identifier");
/// ```
///
/// Converting from an IO error:
/// ```
/// use daybook::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// assert!(app_error.is_storage_unavailable());
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad identifier, date, time or title input. Nothing was written.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// No entry file exists for the given identifier.
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to file locking.
    #[error("File locking error: {0}")]
    Lock(#[from] LockError),

    /// Errors raised by the image store collaborator.
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// The request context is not authenticated.
    #[error("Not authenticated")]
    Unauthorized,

    /// Errors creating, verifying or restoring a backup archive.
    #[error("Backup error: {0}")]
    Backup(String),
}

impl AppError {
    /// Returns true for failures of the underlying storage: I/O or locking.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, AppError::Io(_) | AppError::Lock(_))
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use daybook::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::NotFound("2024-03-01_0930".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
