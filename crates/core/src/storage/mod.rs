//! Destination holder store abstraction.
//!
//! The engine only ever talks to the [`Storage`] and [`Housekeeper`] traits;
//! backends are injected. Two backends ship with the crate: a JSON
//! file-per-holder store and an in-memory store for tests and dry runs.

pub mod json_dir;
pub mod memory;

pub use json_dir::JsonDirStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StorageError;
use crate::model::{Group, User};

/// Asynchronous destination holder store.
///
/// Create-or-load operations are idempotent: calling twice with the same
/// identifier must yield the same holder, never a duplicate.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load the group with the given canonical name, or create an empty one.
    async fn create_or_load_group(&self, name: &str) -> Result<Group, StorageError>;

    /// Load the user with the given id, or create an empty one carrying the
    /// raw legacy key.
    async fn load_or_create_user(&self, id: Uuid, username: &str) -> Result<User, StorageError>;

    /// Persist a group. The engine awaits this before moving to the next
    /// group.
    async fn save_group(&self, group: &Group) -> Result<(), StorageError>;

    /// Persist a user. The engine may issue this without waiting.
    async fn save_user(&self, user: &User) -> Result<(), StorageError>;
}

/// Post-migration housekeeping hook for the destination store.
pub trait Housekeeper: Send + Sync {
    /// Invalidate any cached state for the given user id. Called once per
    /// migrated user, before the save is issued.
    fn invalidate_cache(&self, id: Uuid);
}

/// Housekeeper for stores with nothing to invalidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHousekeeping;

impl Housekeeper for NoHousekeeping {
    fn invalidate_cache(&self, _id: Uuid) {}
}
