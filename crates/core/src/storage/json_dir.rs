//! JSON file-per-holder destination store.
//!
//! Groups live at `<data_dir>/groups/<name>.json`, users at
//! `<data_dir>/users/<uuid>.json`. Writes go to a sibling temp file first and
//! are renamed into place, so a crash mid-save leaves the previous record
//! intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use super::Storage;
use crate::errors::StorageError;
use crate::model::{Group, User};

/// File-backed JSON store rooted at a data directory.
pub struct JsonDirStorage {
    data_dir: PathBuf,
}

impl JsonDirStorage {
    /// Open (or create) a store rooted at `data_dir`.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        info!(path = %data_dir.display(), "opening holder store");

        tokio::fs::create_dir_all(data_dir.join("groups")).await?;
        tokio::fs::create_dir_all(data_dir.join("users")).await?;

        Ok(Self { data_dir })
    }

    fn group_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("groups").join(format!("{name}.json"))
    }

    fn user_path(&self, id: Uuid) -> PathBuf {
        self.data_dir.join("users").join(format!("{id}.json"))
    }

    async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), StorageError> {
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for JsonDirStorage {
    async fn create_or_load_group(&self, name: &str) -> Result<Group, StorageError> {
        let path = self.group_path(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(group = name, "loaded existing group record");
                serde_json::from_slice(&bytes).map_err(|e| StorageError::DeserializeError {
                    path: path.display().to_string(),
                    detail: e.to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(group = name, "no existing record, creating group");
                Ok(Group::new(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn load_or_create_user(&self, id: Uuid, username: &str) -> Result<User, StorageError> {
        let path = self.user_path(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(user = %id, "loaded existing user record");
                serde_json::from_slice(&bytes).map_err(|e| StorageError::DeserializeError {
                    path: path.display().to_string(),
                    detail: e.to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(user = %id, "no existing record, creating user");
                Ok(User::new(id, username))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save_group(&self, group: &Group) -> Result<(), StorageError> {
        let bytes =
            serde_json::to_vec_pretty(group).map_err(|e| StorageError::SerializeError {
                key: group.name.clone(),
                detail: e.to_string(),
            })?;
        Self::write_atomic(&self.group_path(&group.name), bytes).await?;
        debug!(group = %group.name, nodes = group.nodes.len(), "group saved");
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(user).map_err(|e| StorageError::SerializeError {
            key: user.id.to_string(),
            detail: e.to_string(),
        })?;
        Self::write_atomic(&self.user_path(user.id), bytes).await?;
        debug!(user = %user.id, nodes = user.nodes.len(), "user saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PermissionNode;

    #[tokio::test]
    async fn test_create_then_reload_group() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonDirStorage::open(dir.path()).await.unwrap();

        let mut group = storage.create_or_load_group("admin").await.unwrap();
        assert!(group.nodes.is_empty());

        group
            .nodes
            .insert(PermissionNode::permission("core.fly", true).unwrap());
        storage.save_group(&group).await.unwrap();

        let reloaded = storage.create_or_load_group("admin").await.unwrap();
        assert_eq!(reloaded, group);
    }

    #[tokio::test]
    async fn test_create_is_lazy_until_save() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonDirStorage::open(dir.path()).await.unwrap();

        let _ = storage.create_or_load_group("ghost").await.unwrap();
        assert!(!dir.path().join("groups/ghost.json").exists());
    }

    #[tokio::test]
    async fn test_save_and_reload_user() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonDirStorage::open(dir.path()).await.unwrap();
        let id = Uuid::parse_str("069a79f4-44e9-4726-a5be-fca90e38aaf5").unwrap();

        let mut user = storage.load_or_create_user(id, "Notch").await.unwrap();
        user.nodes
            .insert(PermissionNode::inheritance("Admin").unwrap());
        storage.save_user(&user).await.unwrap();

        let reloaded = storage.load_or_create_user(id, "Notch").await.unwrap();
        assert_eq!(reloaded.nodes.len(), 1);
        assert_eq!(
            reloaded.nodes.inherited_groups().collect::<Vec<_>>(),
            vec!["admin"]
        );
    }

    #[tokio::test]
    async fn test_corrupt_record_is_a_deserialize_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonDirStorage::open(dir.path()).await.unwrap();

        std::fs::write(dir.path().join("groups/bad.json"), "{not json").unwrap();
        let result = storage.create_or_load_group("bad").await;
        assert!(matches!(
            result,
            Err(StorageError::DeserializeError { .. })
        ));
    }
}
