//! Backup and restore operations for journal data.
//!
//! This module archives the entries directory and the image store into a
//! single `tar.gz`, verifies archives without extracting them, and restores
//! an archive into a fresh directory.
//!
//! Archive layout:
//!
//! ```text
//! entries/2024-03-01_0930.txt
//! images/3f2c...e1.jpg
//! ```

use crate::config::Config;
use crate::constants::{BACKUP_ENTRIES_DIR, BACKUP_IMAGES_DIR};
use crate::entry::filename::EntryId;
use crate::errors::{AppError, AppResult};
use crate::images::base_name;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Report of a completed backup operation.
#[derive(Debug, Clone)]
pub struct BackupReport {
    /// Number of entry files included in the backup
    pub total_entries: usize,
    /// Number of image files included in the backup
    pub total_images: usize,
    /// Size of the backup archive in bytes
    pub archive_size: u64,
    /// BLAKE3 checksum of the backup archive
    pub checksum: String,
    /// Duration taken to create the backup
    pub duration: Duration,
}

/// Manifest describing the contents of a backup archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackupManifest {
    /// Identifiers of the entry files in the backup, sorted
    pub entries: Vec<EntryId>,
    /// Names of the image files in the backup, sorted
    pub images: Vec<String>,
}

/// Where a validated archive member belongs.
enum Member {
    Entry(EntryId),
    Image(String),
}

/// Creates a compressed backup of the entries directory and the image store.
///
/// # Flow
///
/// 1. Collect entry files (`*.txt` with a valid identifier) from the entries directory
/// 2. Collect every regular file from the images directory, if it exists
/// 3. Build a tar.gz archive under `entries/` and `images/`
/// 4. Write the archive to `output_path` and compute its BLAKE3 checksum
///
/// # Errors
///
/// Returns an error if:
/// - The entries directory doesn't exist
/// - A file cannot be read or the archive cannot be written
pub fn create_backup(config: &Config, output_path: &Path) -> AppResult<BackupReport> {
    let start_time = Instant::now();
    info!("Creating backup to {:?}", output_path);

    if !config.entries_dir.is_dir() {
        return Err(AppError::Backup(format!(
            "Entries directory not found: {:?}",
            config.entries_dir
        )));
    }

    debug!("Collecting entry and image files");
    let entry_paths = collect_files(&config.entries_dir, |path| {
        EntryId::from_file_name(path).is_some()
    })?;
    let image_paths = collect_files(&config.images_dir, |path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(base_name)
            .is_some()
    })?;
    debug!(
        "Found {} entries and {} images",
        entry_paths.len(),
        image_paths.len()
    );

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut tar = tar::Builder::new(encoder);

    for (dir, paths) in [
        (BACKUP_ENTRIES_DIR, &entry_paths),
        (BACKUP_IMAGES_DIR, &image_paths),
    ] {
        for path in paths {
            let Some(name) = path.file_name() else {
                continue;
            };
            let member = Path::new(dir).join(name);
            debug!("Adding to archive: {:?}", member);
            tar.append_path_with_name(path, &member).map_err(|e| {
                AppError::Backup(format!("Failed to add {} to archive: {}", member.display(), e))
            })?;
        }
    }

    let encoder = tar
        .into_inner()
        .map_err(|e| AppError::Backup(format!("Failed to finalize tar archive: {}", e)))?;
    let archive_bytes = encoder
        .finish()
        .map_err(|e| AppError::Backup(format!("Failed to finish gzip compression: {}", e)))?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output_path, &archive_bytes)?;

    let checksum = blake3::hash(&archive_bytes).to_hex().to_string();
    debug!("Backup checksum: {}", checksum);

    let duration = start_time.elapsed();
    info!(
        "Backup completed: {} entries, {} images, {} bytes, {} ms",
        entry_paths.len(),
        image_paths.len(),
        archive_bytes.len(),
        duration.as_millis()
    );

    Ok(BackupReport {
        total_entries: entry_paths.len(),
        total_images: image_paths.len(),
        archive_size: archive_bytes.len() as u64,
        checksum,
        duration,
    })
}

/// Reads a backup archive end to end and lists what it contains.
///
/// Every member must be a regular file directly under `entries/` (named by a
/// valid identifier) or `images/`. Anything else, including absolute paths and
/// `..` components, fails verification.
///
/// # Errors
///
/// Returns `AppError::Backup` if the archive is unreadable, corrupted, or
/// contains a member outside the expected layout.
pub fn verify_backup(backup_path: &Path) -> AppResult<BackupManifest> {
    info!("Verifying backup {:?}", backup_path);
    let mut manifest = BackupManifest::default();

    let mut archive = open_archive(backup_path)?;
    for member in archive.entries().map_err(corrupted)? {
        let mut member = member.map_err(corrupted)?;
        match classify(&member)? {
            Member::Entry(id) => manifest.entries.push(id),
            Member::Image(name) => manifest.images.push(name),
        }
        // Drain the body so truncated archives fail here.
        io::copy(&mut member, &mut io::sink()).map_err(corrupted)?;
    }

    manifest.entries.sort();
    manifest.images.sort();
    info!(
        "Backup verified: {} entries, {} images",
        manifest.entries.len(),
        manifest.images.len()
    );
    Ok(manifest)
}

/// Restores a backup archive into `target`.
///
/// `target` must be missing or an empty directory. The archive is verified
/// first, then extracted into a staging directory next to `target` and moved
/// into place, so a failed restore leaves `target` untouched. The restored
/// tree has `entries/` and `images/` subdirectories.
///
/// # Errors
///
/// Returns `AppError::Backup` if the archive fails verification or `target`
/// is not empty, and `AppError::Io` if extraction or the final move fails.
pub fn restore_backup(backup_path: &Path, target: &Path) -> AppResult<BackupManifest> {
    info!("Restoring backup {:?} into {:?}", backup_path, target);

    let manifest = verify_backup(backup_path)?;

    let target_exists = match fs::read_dir(target) {
        Ok(mut listing) => {
            if listing.next().is_some() {
                return Err(AppError::Backup(format!(
                    "Restore target is not empty: {:?}",
                    target
                )));
            }
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".daybook-restore")
        .tempdir_in(&parent)?;
    for dir in [BACKUP_ENTRIES_DIR, BACKUP_IMAGES_DIR] {
        fs::create_dir_all(staging.path().join(dir))?;
    }

    let mut archive = open_archive(backup_path)?;
    for member in archive.entries().map_err(corrupted)? {
        let mut member = member.map_err(corrupted)?;
        classify(&member)?;
        let unpacked = member.unpack_in(staging.path())?;
        if !unpacked {
            warn!("Skipped archive member outside staging directory");
        }
    }

    if target_exists {
        fs::remove_dir(target)?;
    }
    fs::rename(staging.path(), target)?;

    info!(
        "Restore completed: {} entries, {} images",
        manifest.entries.len(),
        manifest.images.len()
    );
    Ok(manifest)
}

fn open_archive(backup_path: &Path) -> AppResult<tar::Archive<GzDecoder<File>>> {
    let file = File::open(backup_path).map_err(|e| {
        AppError::Backup(format!("Cannot open backup {:?}: {}", backup_path, e))
    })?;
    Ok(tar::Archive::new(GzDecoder::new(file)))
}

fn corrupted(e: io::Error) -> AppError {
    AppError::Backup(format!("Archive is corrupted: {}", e))
}

fn classify<R: Read>(member: &tar::Entry<'_, R>) -> AppResult<Member> {
    let path = member.path().map_err(corrupted)?.into_owned();
    let invalid = || AppError::Backup(format!("Unexpected archive member: {}", path.display()));

    if !member.header().entry_type().is_file() {
        return Err(invalid());
    }

    let parts: Vec<&str> = path
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)?;

    match parts.as_slice() {
        [dir, name] if *dir == BACKUP_ENTRIES_DIR => EntryId::from_file_name(Path::new(name))
            .map(Member::Entry)
            .ok_or_else(invalid),
        [dir, name] if *dir == BACKUP_IMAGES_DIR => base_name(name)
            .filter(|base| base.as_str() == *name)
            .map(Member::Image)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Regular files in `dir` accepted by `keep`, sorted. A missing directory is empty.
fn collect_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> AppResult<Vec<PathBuf>> {
    let listing = match fs::read_dir(dir) {
        Ok(listing) => listing,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut paths = Vec::new();
    for item in listing {
        let path = item?.path();
        if path.is_file() && keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
