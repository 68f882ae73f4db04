//! Batch migration driver.
//!
//! The [`MigrationEngine`] orchestrates one full run:
//!
//! 1. Verify the legacy source is reachable and snapshot it.
//! 2. Migrate every group, in source order, persisting each before the next.
//! 3. Migrate every user: resolve its identity, translate, run housekeeping,
//!    and issue the save without waiting on it.
//!
//! One bad holder never aborts the batch; every per-item failure is captured
//! in the returned [`MigrationReport`]. Only an unreachable or unreadable
//! source fails the run as a whole, and it does so before any mutation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ProgressConfig;
use crate::errors::{CoreError, HolderError, SourceError};
use crate::identity::IdentityResolver;
use crate::migrate::migrate_holder;
use crate::normalize::normalize;
use crate::progress::ProgressSink;
use crate::source::{ConfigValue, SourceProvider, SourceTree};
use crate::storage::{Housekeeper, Storage};

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Which kind of holder a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderKind {
    Group,
    User,
}

impl std::fmt::Display for HolderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::User => write!(f, "user"),
        }
    }
}

/// A per-holder failure captured during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationFailure {
    /// Group or user.
    pub kind: HolderKind,
    /// The raw source key of the failed holder.
    pub key: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Outcome of one migration run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Groups fully migrated and persisted.
    pub groups_migrated: u64,
    /// Users fully migrated with their save issued.
    pub users_migrated: u64,
    /// Per-holder failures, in encounter order.
    pub failures: Vec<MigrationFailure>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl MigrationReport {
    fn begin() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    fn record_failure(
        &mut self,
        kind: HolderKind,
        key: &str,
        reason: impl std::fmt::Display,
    ) {
        self.failures.push(MigrationFailure {
            kind,
            key: key.to_string(),
            reason: reason.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The batch migration driver.
pub struct MigrationEngine {
    source: Arc<dyn SourceProvider>,
    identity: Arc<dyn IdentityResolver>,
    storage: Arc<dyn Storage>,
    housekeeper: Arc<dyn Housekeeper>,
    progress: Arc<dyn ProgressSink>,
    notify: ProgressConfig,
}

impl MigrationEngine {
    /// Create a new engine with all collaborators injected.
    pub fn new(
        source: Arc<dyn SourceProvider>,
        identity: Arc<dyn IdentityResolver>,
        storage: Arc<dyn Storage>,
        housekeeper: Arc<dyn Housekeeper>,
        progress: Arc<dyn ProgressSink>,
        notify: ProgressConfig,
    ) -> Self {
        info!("initializing migration engine");
        Self {
            source,
            identity,
            storage,
            housekeeper,
            progress,
            notify,
        }
    }

    /// Execute one full migration run.
    ///
    /// Groups are migrated strictly before users, so a user's inheritance
    /// edges can reference groups created in the same run. Takes `&mut self`:
    /// a second run cannot start on the same engine while one is in flight.
    pub async fn run(&mut self) -> Result<MigrationReport, CoreError> {
        self.progress.on_message("starting migration");

        if !self.source.is_available() {
            warn!("legacy source unavailable, aborting before any mutation");
            self.progress.on_message("legacy source is not available");
            return Err(SourceError::Unavailable.into());
        }
        let tree = self.source.load().map_err(CoreError::Source)?;
        info!(
            groups = tree.groups.len(),
            users = tree.users.len(),
            "legacy source loaded"
        );

        let mut report = MigrationReport::begin();
        self.migrate_groups(&tree, &mut report).await;
        self.migrate_users(&tree, &mut report).await;
        report.completed_at = Some(Utc::now());

        self.progress.on_message(&format!(
            "migration complete: {} groups, {} users, {} failures",
            report.groups_migrated,
            report.users_migrated,
            report.failures.len()
        ));
        self.progress.on_message(
            "decommission the legacy source now, so it no longer competes with the \
             destination store as a permission authority",
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Phase 1: groups
    // -----------------------------------------------------------------------

    async fn migrate_groups(&self, tree: &SourceTree, report: &mut MigrationReport) {
        self.progress.on_message("starting group migration");
        let interval = self.notify.group_notify_interval.max(1);

        for (key, value) in tree.groups.iter() {
            match self.migrate_one_group(key, value).await {
                Ok(()) => {
                    report.groups_migrated += 1;
                    if report.groups_migrated % interval == 0 {
                        self.progress.on_progress(report.groups_migrated);
                    }
                }
                Err(e) => {
                    warn!(group = key, error = %e, "group migration failed, continuing");
                    self.progress
                        .on_message(&format!("failed to migrate group '{key}': {e}"));
                    report.record_failure(HolderKind::Group, key, e);
                }
            }
        }

        info!(count = report.groups_migrated, "group migration finished");
        self.progress
            .on_message(&format!("migrated {} groups", report.groups_migrated));
    }

    async fn migrate_one_group(&self, key: &str, value: &ConfigValue) -> Result<(), HolderError> {
        let name = normalize(key);
        let mut group = self.storage.create_or_load_group(&name).await?;

        if let Some(data) = value.as_section() {
            migrate_holder(&mut group.nodes, data)?;
        }

        // Awaited: the next group must not start until this one is on disk.
        self.storage.save_group(&group).await?;
        debug!(group = %group.name, nodes = group.nodes.len(), "group migrated");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Phase 2: users
    // -----------------------------------------------------------------------

    async fn migrate_users(&self, tree: &SourceTree, report: &mut MigrationReport) {
        self.progress.on_message("starting user migration");
        let interval = self.notify.user_notify_interval.max(1);
        let mut pending_saves: Vec<JoinHandle<()>> = Vec::new();

        for (key, value) in tree.users.iter() {
            let Some(id) = self.identity.resolve_user_id(key) else {
                debug!(user = key, "could not resolve a unique id, skipping");
                self.progress
                    .on_message(&format!("skipping user '{key}': unresolvable identity"));
                report.record_failure(HolderKind::User, key, "unresolvable identity");
                continue;
            };

            match self.migrate_one_user(id, key, value).await {
                Ok(save) => {
                    pending_saves.push(save);
                    report.users_migrated += 1;
                    if report.users_migrated % interval == 0 {
                        self.progress.on_progress(report.users_migrated);
                    }
                }
                Err(e) => {
                    warn!(user = key, error = %e, "user migration failed, continuing");
                    self.progress
                        .on_message(&format!("failed to migrate user '{key}': {e}"));
                    report.record_failure(HolderKind::User, key, e);
                }
            }
        }

        // Saves were issued without waiting; drain them so the returned
        // report implies the store has seen every user.
        for save in pending_saves {
            let _ = save.await;
        }

        info!(count = report.users_migrated, "user migration finished");
        self.progress
            .on_message(&format!("migrated {} users", report.users_migrated));
    }

    async fn migrate_one_user(
        &self,
        id: Uuid,
        key: &str,
        value: &ConfigValue,
    ) -> Result<JoinHandle<()>, HolderError> {
        let mut user = self.storage.load_or_create_user(id, key).await?;

        if let Some(data) = value.as_section() {
            migrate_holder(&mut user.nodes, data)?;
        }

        self.housekeeper.invalidate_cache(id);

        // Fire-and-forget: a deferred user save cannot corrupt other
        // holders' records, so the loop moves on immediately.
        let storage = Arc::clone(&self.storage);
        let save = tokio::spawn(async move {
            if let Err(e) = storage.save_user(&user).await {
                warn!(user = %user.id, error = %e, "deferred user save failed");
            }
        });
        debug!(user = %id, "user migrated, save issued");
        Ok(save)
    }
}
