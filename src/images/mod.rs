//! Image references held by entries, and the seam to the image store.
//!
//! An entry only ever stores image *file names*. Turning uploaded bytes into a
//! stored file, and removing it again, is the job of an [`ImageStore`]. The
//! bundled [`DirImageStore`] keeps files in a single directory.
//!
//! Every name is reduced to its last path component before it is stored,
//! looked up, or deleted.

mod dir;

pub use dir::DirImageStore;

use crate::errors::ImageError;
use std::path::Path;

/// External collaborator that owns image bytes.
pub trait ImageStore {
    /// Stores an upload and returns the file name to reference from the entry.
    ///
    /// # Errors
    ///
    /// `ImageError::Unsupported`, `ImageError::TooLarge` or
    /// `ImageError::DecodeError` when the upload is rejected.
    fn process_upload(&self, bytes: &[u8], declared_mime: &str) -> Result<String, ImageError>;

    /// Removes a stored file. Returns true only if a file was removed; an
    /// already-absent file is not an error.
    fn delete_stored(&self, stored_name: &str) -> bool;
}

/// Reduces a reference to its base name.
///
/// Returns `None` when nothing usable is left (empty, `.` or `..`).
///
/// # Examples
///
/// ```
/// use daybook::images::base_name;
///
/// assert_eq!(base_name("a.jpg").as_deref(), Some("a.jpg"));
/// assert_eq!(base_name("../../etc/passwd").as_deref(), Some("passwd"));
/// assert_eq!(base_name("..\\up\\b.png").as_deref(), Some("b.png"));
/// assert_eq!(base_name(".."), None);
/// ```
pub fn base_name(name: &str) -> Option<String> {
    // Backslashes are separators too, whatever the host platform.
    let last = name.rsplit(['/', '\\']).next()?.trim();
    let base = Path::new(last).file_name()?.to_str()?;
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}

/// The ordered list of image names an entry claims.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRefs(Vec<String>);

impl ImageRefs {
    /// Builds the list from stored names, cleaning and de-duplicating them.
    pub fn new(names: Vec<String>) -> Self {
        let mut refs = ImageRefs::default();
        for name in names {
            refs.push(&name);
        }
        refs
    }

    /// Appends a reference. Returns false if it was unusable or already present.
    pub fn push(&mut self, name: &str) -> bool {
        match base_name(name) {
            Some(base) if !self.0.contains(&base) => {
                self.0.push(base);
                true
            }
            _ => false,
        }
    }

    /// Drops a reference. Returns false if the entry did not claim it.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(base) = base_name(name) else {
            return false;
        };
        let before = self.0.len();
        self.0.retain(|n| n != &base);
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}
