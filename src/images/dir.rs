//! Image store backed by a single directory.
//!
//! Uploads are written byte-for-byte under a random name; no resizing or
//! re-encoding happens here.

use super::{base_name, ImageStore};
use crate::errors::ImageError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Accepted MIME types, their canonical extension, and magic bytes.
const ACCEPTED: &[(&str, &str, &[&[u8]])] = &[
    ("image/jpeg", "jpg", &[b"\xFF\xD8\xFF"]),
    ("image/png", "png", &[b"\x89PNG\r\n\x1a\n"]),
    ("image/gif", "gif", &[b"GIF87a", b"GIF89a"]),
    ("image/webp", "webp", &[b"RIFF"]),
];

#[derive(Debug, Clone)]
pub struct DirImageStore {
    dir: PathBuf,
    max_bytes: u64,
}

impl DirImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        DirImageStore {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a stored image, or `None` for an unusable name.
    pub fn path_for(&self, stored_name: &str) -> Option<PathBuf> {
        base_name(stored_name).map(|base| self.dir.join(base))
    }

    fn check(&self, bytes: &[u8], declared_mime: &str) -> Result<&'static str, ImageError> {
        let mime = declared_mime.trim().to_ascii_lowercase();
        let mime = if mime == "image/jpg" { "image/jpeg".to_string() } else { mime };

        let (_, ext, magics) = ACCEPTED
            .iter()
            .find(|(accepted, _, _)| *accepted == mime)
            .ok_or_else(|| ImageError::Unsupported(declared_mime.to_string()))?;

        let size = bytes.len() as u64;
        if size > self.max_bytes {
            return Err(ImageError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        if !magics.iter().any(|magic| bytes.starts_with(magic)) {
            return Err(ImageError::DecodeError(format!(
                "content does not look like {mime}"
            )));
        }
        if *ext == "webp" && bytes.get(8..12) != Some(b"WEBP".as_slice()) {
            return Err(ImageError::DecodeError(
                "RIFF container is not WEBP".to_string(),
            ));
        }

        Ok(*ext)
    }
}

impl ImageStore for DirImageStore {
    fn process_upload(&self, bytes: &[u8], declared_mime: &str) -> Result<String, ImageError> {
        let ext = self.check(bytes, declared_mime)?;

        fs::create_dir_all(&self.dir)?;
        let name = format!("{}.{}", Uuid::new_v4(), ext);
        fs::write(self.dir.join(&name), bytes)?;

        info!("Stored image {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    fn delete_stored(&self, stored_name: &str) -> bool {
        let Some(path) = self.path_for(stored_name) else {
            warn!("Refusing to delete unusable image name {:?}", stored_name);
            return false;
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted image {:?}", path);
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Image already absent: {:?}", path);
                false
            }
            Err(e) => {
                warn!("Failed to delete image {:?}: {}", path, e);
                false
            }
        }
    }
}
