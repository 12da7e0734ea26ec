//! Entry persistence over a directory of flat files.
//!
//! Each entry lives in `<entries_dir>/<YYYY-MM-DD>_<HHMM>.txt`. The store is
//! stateless: every call goes to the filesystem, and nothing is cached
//! between calls.
//!
//! Writes take an exclusive advisory lock on the target file only (see
//! [`lock`]). Moving an entry to a new identifier writes the new file before
//! removing the old one; a crash in between leaves both files behind, and
//! nothing repairs that automatically.

pub mod lock;

#[cfg(unix)]
use crate::constants::DEFAULT_DIR_PERMISSIONS;
use crate::entry::filename::EntryId;
use crate::entry::record::Record;
use crate::entry::{validate_title, Entry};
use crate::errors::{AppError, AppResult};
use crate::images::{base_name, ImageRefs, ImageStore};
use lock::WriteLock;
use std::fs;
#[cfg(unix)]
use std::fs::Permissions;
use std::io::ErrorKind;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// CRUD over the entries directory.
#[derive(Debug, Clone)]
pub struct EntryStore<S: ImageStore> {
    dir: PathBuf,
    images: S,
}

/// Outcome of a corpus scan: decoded entries plus the files that were skipped.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub entries: Vec<Entry>,
    pub skipped: Vec<PathBuf>,
}

impl<S: ImageStore> EntryStore<S> {
    pub fn new(dir: impl Into<PathBuf>, images: S) -> Self {
        EntryStore {
            dir: dir.into(),
            images,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn images(&self) -> &S {
        &self.images
    }

    pub fn path_for(&self, id: &EntryId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    /// Ensures the entries directory exists, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `AppError::Config` if the directory path is not absolute
    /// - `AppError::Io` if the directory creation fails
    pub fn ensure_dir(&self) -> AppResult<()> {
        if !self.dir.is_absolute() {
            return Err(AppError::Config(format!(
                "Entries directory path must be absolute: {}",
                self.dir.display()
            )));
        }

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                AppError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create entries directory: {}", e),
                ))
            })?;

            #[cfg(unix)]
            {
                let permissions = Permissions::from_mode(DEFAULT_DIR_PERMISSIONS);
                fs::set_permissions(&self.dir, permissions)?;
                debug!("Set 0o700 permissions on entries directory");
            }
        }
        Ok(())
    }

    /// Writes `record` under `id`, replacing any entry already there.
    ///
    /// The title is validated first; an invalid title writes nothing. The
    /// image list is reduced to unique base names.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidFormat` for an invalid title
    /// - `AppError::Lock` if another writer holds the file
    /// - `AppError::Io` if the write fails
    pub fn save(&self, id: &EntryId, record: &Record) -> AppResult<()> {
        let title = validate_title(&record.title)?;
        let images = ImageRefs::new(record.images.clone()).into_vec();
        let blob = Record::new(title, images, record.body.clone()).encode();

        let path = self.path_for(id);
        let mut lock = WriteLock::acquire(&path)?;
        lock.replace_contents(blob.as_bytes())?;
        drop(lock);

        info!("Saved entry {}", id);
        Ok(())
    }

    /// Saves `record` under `new_id` and then removes `old_id`.
    ///
    /// When the identifiers are equal this is a plain [`save`](Self::save).
    /// The two steps are not atomic.
    pub fn update(&self, old_id: &EntryId, new_id: &EntryId, record: &Record) -> AppResult<()> {
        self.save(new_id, record)?;
        if old_id == new_id {
            return Ok(());
        }

        let old_path = self.path_for(old_id);
        match fs::remove_file(&old_path) {
            Ok(()) => {
                info!("Moved entry {} to {}", old_id, new_id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Old entry {} was already gone", old_id);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Entry {} written but old file {} could not be removed: {}",
                    new_id, old_id, e
                );
                Err(e.into())
            }
        }
    }

    /// Reads an entry. A missing file is `Ok(None)`.
    pub fn load(&self, id: &EntryId) -> AppResult<Option<Entry>> {
        let path = self.path_for(id);
        match fs::read_to_string(&path) {
            Ok(blob) => Entry::from_blob(id.clone(), &blob).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads an entry, treating a missing file as `AppError::NotFound`.
    pub fn get(&self, id: &EntryId) -> AppResult<Entry> {
        self.load(id)?.ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    /// Removes an entry file and, best-effort, every image it references.
    ///
    /// Image removal failures and references to images that no longer exist
    /// are logged, never returned.
    ///
    /// # Errors
    ///
    /// - `AppError::NotFound` if there is no file for `id`
    /// - `AppError::Io` if the entry file cannot be removed
    pub fn delete(&self, id: &EntryId) -> AppResult<()> {
        let entry = self.get(id)?;

        fs::remove_file(self.path_for(id)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(id.to_string()),
            _ => AppError::Io(e),
        })?;
        info!("Deleted entry {}", id);

        for name in &entry.images {
            let Some(base) = base_name(name) else {
                warn!("Entry {} referenced unusable image name {:?}", id, name);
                continue;
            };
            if !self.images.delete_stored(&base) {
                warn!("Orphan image reference {:?} in deleted entry {}", base, id);
            }
        }
        Ok(())
    }

    /// Stores an upload through the image store and appends it to the entry.
    ///
    /// Returns the stored file name. If saving the entry fails the uploaded
    /// file is removed again.
    pub fn attach_image(
        &self,
        id: &EntryId,
        bytes: &[u8],
        declared_mime: &str,
    ) -> AppResult<String> {
        let entry = self.get(id)?;
        let stored = self.images.process_upload(bytes, declared_mime)?;

        let mut refs = ImageRefs::new(entry.images.clone());
        refs.push(&stored);
        let record = Record::new(entry.title, refs.into_vec(), entry.body);

        if let Err(e) = self.save(id, &record) {
            self.images.delete_stored(&stored);
            return Err(e);
        }
        Ok(stored)
    }

    /// Drops an image reference from the entry and deletes the stored file.
    ///
    /// Returns false if the entry did not reference the image.
    pub fn detach_image(&self, id: &EntryId, name: &str) -> AppResult<bool> {
        let entry = self.get(id)?;
        let mut refs = ImageRefs::new(entry.images.clone());
        if !refs.remove(name) {
            return Ok(false);
        }

        let record = Record::new(entry.title, refs.into_vec(), entry.body);
        self.save(id, &record)?;

        if let Some(base) = base_name(name) {
            if !self.images.delete_stored(&base) {
                warn!("Orphan image reference {:?} detached from {}", base, id);
            }
        }
        Ok(true)
    }

    /// Reads every entry file in the directory.
    ///
    /// Files whose name is not an identifier are ignored. Files that cannot be
    /// read are skipped and reported in [`ScanResult::skipped`]; one bad file
    /// never fails the scan. A missing directory is an empty corpus.
    pub fn scan(&self) -> AppResult<ScanResult> {
        let mut result = ScanResult::default();

        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Entries directory not found, empty corpus");
                return Ok(result);
            }
            Err(e) => return Err(e.into()),
        };

        for dir_entry in read_dir {
            let path = match dir_entry {
                Ok(dir_entry) => dir_entry.path(),
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            let Some(id) = EntryId::from_file_name(&path) else {
                debug!("Ignoring file with non-identifier name: {:?}", path);
                continue;
            };
            if !path.is_file() {
                continue;
            }

            let decoded = fs::read_to_string(&path)
                .map_err(AppError::from)
                .and_then(|blob| Entry::from_blob(id, &blob));
            match decoded {
                Ok(entry) => result.entries.push(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry {:?}: {}", path, e);
                    result.skipped.push(path);
                }
            }
        }

        debug!(
            "Scanned {} entries ({} skipped)",
            result.entries.len(),
            result.skipped.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::DirImageStore;
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> EntryStore<DirImageStore> {
        EntryStore::new(dir.join("entries"), DirImageStore::new(dir.join("images"), 1024))
    }

    fn id(s: &str) -> EntryId {
        EntryId::parse(s).unwrap()
    }

    #[test]
    fn test_save_writes_canonical_file() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        store.ensure_dir().unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let entry_id = EntryId::encode(date, time);
        let record = Record::new(
            "Morning",
            vec![],
            "Tags: work, ideas\n\nWent for a walk.",
        );
        store.save(&entry_id, &record).unwrap();

        let path = store.dir().join("2024-03-01_0930.txt");
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Morning\n[]\nTags: work, ideas\n\nWent for a walk."
        );

        let entry = store.load(&entry_id).unwrap().unwrap();
        assert_eq!(entry.content(), "Went for a walk.");
        assert_eq!(entry.tags(), ["work", "ideas"]);
    }

    #[test]
    fn test_save_same_minute_overwrites() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        store.ensure_dir().unwrap();

        let entry_id = id("2024-03-01_0930");
        store.save(&entry_id, &Record::new("First", vec![], "a much longer first body")).unwrap();
        store.save(&entry_id, &Record::new("Second", vec![], "b")).unwrap();

        let entry = store.get(&entry_id).unwrap();
        assert_eq!(entry.title, "Second");
        assert_eq!(entry.body, "b");
    }

    #[test]
    fn test_invalid_title_writes_nothing() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        store.ensure_dir().unwrap();

        let entry_id = id("2024-03-01_0930");
        let result = store.save(&entry_id, &Record::new("  ", vec![], "body"));
        assert!(matches!(result, Err(AppError::InvalidFormat(_))));
        assert!(!store.path_for(&entry_id).exists());
    }

    #[test]
    fn test_save_fails_fast_while_locked() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        store.ensure_dir().unwrap();

        let entry_id = id("2024-03-01_0930");
        let _held = WriteLock::acquire(&store.path_for(&entry_id)).unwrap();

        let err = store
            .save(&entry_id, &Record::new("T", vec![], "b"))
            .unwrap_err();
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn test_load_missing_is_none_and_get_is_not_found() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        store.ensure_dir().unwrap();

        let entry_id = id("2024-03-01_0930");
        assert!(store.load(&entry_id).unwrap().is_none());
        assert!(matches!(store.get(&entry_id), Err(AppError::NotFound(_))));
        assert!(matches!(store.delete(&entry_id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_update_moves_entry() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        store.ensure_dir().unwrap();

        let old_id = id("2024-03-01_0930");
        let new_id = id("2024-03-02_1000");
        store.save(&old_id, &Record::new("T", vec![], "b")).unwrap();
        store.update(&old_id, &new_id, &Record::new("T2", vec![], "b2")).unwrap();

        assert!(!store.path_for(&old_id).exists());
        assert_eq!(store.get(&new_id).unwrap().title, "T2");

        // Same identifier is an in-place save.
        store.update(&new_id, &new_id, &Record::new("T3", vec![], "b3")).unwrap();
        assert_eq!(store.get(&new_id).unwrap().title, "T3");
    }

    #[test]
    fn test_attach_and_detach_image() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        store.ensure_dir().unwrap();

        let entry_id = id("2024-03-01_0930");
        store.save(&entry_id, &Record::new("T", vec![], "b")).unwrap();

        let name = store
            .attach_image(&entry_id, b"GIF89a....", "image/gif")
            .unwrap();
        assert_eq!(store.get(&entry_id).unwrap().images, vec![name.clone()]);
        assert!(store.images().dir().join(&name).exists());

        assert!(store.detach_image(&entry_id, &name).unwrap());
        assert!(store.get(&entry_id).unwrap().images.is_empty());
        assert!(!store.images().dir().join(&name).exists());
        assert!(!store.detach_image(&entry_id, &name).unwrap());
    }

    #[test]
    fn test_scan_skips_foreign_files() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        store.ensure_dir().unwrap();

        store.save(&id("2024-03-01_0930"), &Record::new("T", vec![], "b")).unwrap();
        fs::write(store.dir().join("notes.txt"), "x").unwrap();
        fs::write(store.dir().join("2024-03-01_0931.md"), "x").unwrap();
        fs::write(store.dir().join("2023-02-30_0930.txt"), "x").unwrap();
        fs::create_dir(store.dir().join("2024-03-05_0930.txt")).unwrap();

        let scan = store.scan().unwrap();
        assert_eq!(scan.entries.len(), 1);
        assert!(scan.skipped.is_empty());
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        assert!(store.scan().unwrap().entries.is_empty());
    }

    #[test]
    fn test_ensure_dir_rejects_relative_path() {
        let store = EntryStore::new("relative/entries", DirImageStore::new("/tmp/i", 1));
        match store.ensure_dir() {
            Err(AppError::Config(msg)) => assert!(msg.contains("must be absolute")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_dir_permissions() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        store.ensure_dir().unwrap();

        let mode = fs::metadata(store.dir()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
