//! In-memory destination store.
//!
//! Backs tests and dry runs: a migration pointed at a `MemoryStorage` leaves
//! the real destination untouched while still exercising the full engine.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::Storage;
use crate::errors::StorageError;
use crate::model::{Group, User};

/// HashMap-backed store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    groups: Mutex<HashMap<String, Group>>,
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored group, if present.
    pub fn group(&self, name: &str) -> Option<Group> {
        self.groups.lock().ok()?.get(name).cloned()
    }

    /// Snapshot of the stored user, if present.
    pub fn user(&self, id: Uuid) -> Option<User> {
        self.users.lock().ok()?.get(&id).cloned()
    }

    pub fn group_count(&self) -> usize {
        self.groups.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }

    fn poisoned() -> StorageError {
        StorageError::BackendError("store lock poisoned".into())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_or_load_group(&self, name: &str) -> Result<Group, StorageError> {
        let groups = self.groups.lock().map_err(|_| Self::poisoned())?;
        Ok(groups
            .get(name)
            .cloned()
            .unwrap_or_else(|| Group::new(name)))
    }

    async fn load_or_create_user(&self, id: Uuid, username: &str) -> Result<User, StorageError> {
        let users = self.users.lock().map_err(|_| Self::poisoned())?;
        Ok(users
            .get(&id)
            .cloned()
            .unwrap_or_else(|| User::new(id, username)))
    }

    async fn save_group(&self, group: &Group) -> Result<(), StorageError> {
        let mut groups = self.groups.lock().map_err(|_| Self::poisoned())?;
        groups.insert(group.name.clone(), group.clone());
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let mut users = self.users.lock().map_err(|_| Self::poisoned())?;
        users.insert(user.id, user.clone());
        Ok(())
    }
}
