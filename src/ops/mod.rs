//! High-level operations that act on a whole journal.
//!
//! These sit above the entry store and work on the configured directories
//! directly: archiving, verifying and restoring backups.

pub mod backup;

pub use backup::{create_backup, restore_backup, verify_backup, BackupManifest, BackupReport};
