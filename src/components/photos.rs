use crate::error::AppResult;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

/// Profile photos cached on disk so pages can link to them
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path for a photo name, `None` unless it is a plain file name
    fn path_for(&self, name: &str) -> Option<PathBuf> {
        let is_plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        is_plain.then(|| self.dir.join(name))
    }

    /// Write a photo, creating the directory if needed.
    /// Returns false when the name is refused and nothing was written.
    pub async fn save(&self, name: &str, bytes: &[u8]) -> AppResult<bool> {
        let Some(path) = self.path_for(name) else {
            warn!("Refusing to store photo under '{}'", name);
            return Ok(false);
        };

        fs::create_dir_all(&self.dir).await?;
        fs::write(&path, bytes).await?;
        debug!("Stored profile photo at {}", path.display());
        Ok(true)
    }

    /// Delete a photo if it exists, returns whether a file was removed
    pub async fn remove(&self, name: &str) -> AppResult<bool> {
        let Some(path) = self.path_for(name) else {
            return Ok(false);
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed profile photo {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().join("tmp"));

        assert!(store.save("user.jpg", b"jpeg").await.unwrap());
        assert!(dir.path().join("tmp/user.jpg").exists());

        assert!(store.remove("user.jpg").await.unwrap());
        assert!(!dir.path().join("tmp/user.jpg").exists());
        assert!(!store.remove("user.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("keep.txt");
        std::fs::write(&outside, b"keep").unwrap();

        let store = PhotoStore::new(dir.path().join("tmp"));
        assert!(!store.save("../keep.txt", b"evil").await.unwrap());
        assert_eq!(std::fs::read(&outside).unwrap(), b"keep");
        assert!(!store.remove("../keep.txt").await.unwrap());
        assert!(!store.remove("..").await.unwrap());
        assert!(outside.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_remove_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path());

        // A directory under the photo name cannot be removed as a file
        std::fs::create_dir(dir.path().join("user.jpg")).unwrap();
        assert!(store.remove("user.jpg").await.is_err());
    }
}
