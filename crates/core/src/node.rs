//! Typed permission nodes and the per-holder node set.
//!
//! A [`PermissionNode`] is the normalized destination record: a permission
//! key, a boolean value, and an optional world qualifier narrowing where the
//! node applies. Inheritance ("holder derives from group G") is expressed as
//! a node whose key carries the `group.` prefix, so the same set semantics
//! cover both kinds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::NodeError;
use crate::normalize::normalize;

/// Key prefix marking a node as an inheritance edge.
pub const INHERITANCE_PREFIX: &str = "group.";

// ---------------------------------------------------------------------------
// Permission node
// ---------------------------------------------------------------------------

/// Persistence class of a node in the destination store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Durable node, written by migration.
    Normal,
    /// Runtime-only node, never persisted by migration.
    Transient,
}

fn default_data_type() -> DataType {
    DataType::Normal
}

/// A normalized permission record owned by a destination holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionNode {
    /// The permission key, e.g. `core.fly` or `group.admin`.
    pub key: String,

    /// The raw boolean read from the source. No inversion or negation
    /// handling is applied during migration.
    pub value: bool,

    /// World qualifier. `None` means the node applies everywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<String>,

    /// Persistence class. Migration always writes `normal` nodes.
    #[serde(default = "default_data_type")]
    pub data_type: DataType,
}

impl PermissionNode {
    /// Build a context-free permission node.
    ///
    /// The only syntax rule enforced here is the destination store's own:
    /// the key must not be empty or blank.
    pub fn permission(key: impl Into<String>, value: bool) -> Result<Self, NodeError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(NodeError::InvalidKey(key));
        }
        Ok(Self {
            key,
            value,
            world: None,
            data_type: DataType::Normal,
        })
    }

    /// Attach a world qualifier to this node.
    pub fn in_world(mut self, world: impl Into<String>) -> Self {
        self.world = Some(world.into());
        self
    }

    /// Build an inheritance edge toward the given group.
    ///
    /// The group name is canonicalized first, so references differing only in
    /// raw casing or separators produce the same edge. A reference that
    /// canonicalizes to nothing is rejected.
    pub fn inheritance(raw_group: &str) -> Result<Self, NodeError> {
        let canonical = normalize(raw_group);
        if canonical.is_empty() {
            return Err(NodeError::InvalidGroupReference(raw_group.to_string()));
        }
        Ok(Self {
            key: format!("{INHERITANCE_PREFIX}{canonical}"),
            value: true,
            world: None,
            data_type: DataType::Normal,
        })
    }

    /// Whether this node is an inheritance edge.
    pub fn is_inheritance(&self) -> bool {
        self.key.starts_with(INHERITANCE_PREFIX)
    }

    /// The canonical group name this node inherits from, if it is an
    /// inheritance edge.
    pub fn inherited_group(&self) -> Option<&str> {
        self.key
            .strip_prefix(INHERITANCE_PREFIX)
            .filter(|g| !g.is_empty())
    }
}

impl fmt::Display for PermissionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)?;
        if let Some(ref world) = self.world {
            write!(f, " (world={world})")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Node set
// ---------------------------------------------------------------------------

/// Identity of a node within a holder's set: key plus world qualifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct NodeIdentity {
    key: String,
    world: Option<String>,
}

impl NodeIdentity {
    fn of(node: &PermissionNode) -> Self {
        Self {
            key: node.key.clone(),
            world: node.world.clone(),
        }
    }
}

/// The set of nodes owned by one destination holder.
///
/// Insertion upserts on (key, world): a node replaces any existing node with
/// the same key and the same world qualifier, so re-running a migration
/// yields the same set rather than duplicates. Nodes with the same key under
/// different worlds coexist. Iteration order is deterministic (sorted by
/// key, then world).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PermissionNode>", into = "Vec<PermissionNode>")]
pub struct NodeSet {
    nodes: BTreeMap<NodeIdentity, PermissionNode>,
}

impl NodeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing any node with the same key and world.
    /// Returns the replaced node, if any.
    pub fn insert(&mut self, node: PermissionNode) -> Option<PermissionNode> {
        self.nodes.insert(NodeIdentity::of(&node), node)
    }

    /// Look up a node by key and world qualifier.
    pub fn get(&self, key: &str, world: Option<&str>) -> Option<&PermissionNode> {
        let identity = NodeIdentity {
            key: key.to_string(),
            world: world.map(str::to_string),
        };
        self.nodes.get(&identity)
    }

    /// Iterate over all nodes in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PermissionNode> {
        self.nodes.values()
    }

    /// Canonical names of all groups this set inherits from.
    pub fn inherited_groups(&self) -> impl Iterator<Item = &str> {
        self.nodes.values().filter_map(PermissionNode::inherited_group)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl From<Vec<PermissionNode>> for NodeSet {
    fn from(nodes: Vec<PermissionNode>) -> Self {
        let mut set = Self::default();
        for node in nodes {
            set.insert(node);
        }
        set
    }
}

impl From<NodeSet> for Vec<PermissionNode> {
    fn from(set: NodeSet) -> Self {
        set.nodes.into_values().collect()
    }
}
