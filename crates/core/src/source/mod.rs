//! Legacy configuration source: tree model, provider contract, and the YAML
//! file adapter.

pub mod tree;
pub mod yaml;

pub use tree::{ConfigSection, ConfigValue, SourceTree};
pub use yaml::YamlSource;

use crate::errors::SourceError;

/// Provider of the legacy configuration snapshot.
///
/// Implementations are injected into the engine; the core never queries any
/// global host state to find its source.
pub trait SourceProvider: Send + Sync {
    /// Whether the legacy source can currently be read. The engine checks
    /// this before any mutation.
    fn is_available(&self) -> bool;

    /// Load a read-only snapshot of the legacy tree.
    fn load(&self) -> Result<SourceTree, SourceError>;
}
