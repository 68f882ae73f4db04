//! Identity resolution for legacy user keys.
//!
//! Legacy configurations key users either by a unique id directly or by a
//! plain username. The resolution order is:
//! 1. Parse the raw key as a UUID (modern exports)
//! 2. Explicit TOML mapping file (username -> UUID)

pub mod mapper;
pub mod mapping_file;

pub use mapper::MappingResolver;

use uuid::Uuid;

/// Resolves a raw legacy user key to a stable unique identifier.
///
/// A lookup miss is `None`, never an error; the engine skips unresolvable
/// users and records them in the run report.
pub trait IdentityResolver: Send + Sync {
    fn resolve_user_id(&self, raw_key: &str) -> Option<Uuid>;
}
