use std::io::ErrorKind;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::account::errors::StorageError;
use crate::account::models::AccountId;
use crate::account::ports::MediaStore;

/// Media objects on local disk, one directory per owning account.
///
/// Keys are `/`-separated paths relative to the root, starting with the
/// owner's id: `<account_id>/photos/avatar.png`.
pub struct FilesystemMediaStore {
    root: PathBuf,
}

impl FilesystemMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key under the root, refusing anything that could escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let contained = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !contained {
            return Err(StorageError::InvalidPath(key.to_string()));
        }

        Ok(self.root.join(relative))
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn list_owned_objects(&self, id: &AccountId) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.join(id.to_string())];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let path = entry.path();

                if file_type.is_dir() {
                    pending.push(path);
                } else if let Some(key) = self.key_for(&path) {
                    keys.push(key);
                } else {
                    tracing::warn!(path = %path.display(), "Skipping media object with non UTF-8 name");
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<(), StorageError> {
        for key in keys {
            let path = self.resolve(key)?;

            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(key = %key, "Media object deleted"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
