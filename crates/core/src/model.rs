//! Destination holder models.
//!
//! A holder is the entity permission nodes attach to: a [`Group`] identified
//! by its canonical name, or a [`User`] identified by an externally-resolved
//! unique id. Holders are created-or-loaded by the store, mutated in place
//! during migration, then handed back for persistence.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::node::NodeSet;

/// A destination group, identified by canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Canonical name, the group's identity key in the store.
    pub name: String,

    /// The group's permission nodes and inheritance edges.
    #[serde(default)]
    pub nodes: NodeSet,
}

impl Group {
    /// Create an empty group with the given canonical name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: NodeSet::new(),
        }
    }
}

/// A destination user, identified by a stable unique id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable unique identifier, resolved from the legacy key.
    pub id: Uuid,

    /// The raw legacy key the id was resolved from. Kept for reporting;
    /// not an identity.
    pub username: String,

    /// The user's permission nodes and inheritance edges.
    #[serde(default)]
    pub nodes: NodeSet,
}

impl User {
    /// Create an empty user.
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            nodes: NodeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PermissionNode;

    #[test]
    fn test_new_group_is_empty() {
        let group = Group::new("admin");
        assert_eq!(group.name, "admin");
        assert!(group.nodes.is_empty());
    }

    #[test]
    fn test_group_nodes_mutate_in_place() {
        let mut group = Group::new("admin");
        group
            .nodes
            .insert(PermissionNode::permission("core.fly", true).unwrap());
        assert_eq!(group.nodes.len(), 1);
    }

    #[test]
    fn test_user_keeps_raw_key() {
        let id = Uuid::parse_str("069a79f4-44e9-4726-a5be-fca90e38aaf5").unwrap();
        let user = User::new(id, "Notch");
        assert_eq!(user.id, id);
        assert_eq!(user.username, "Notch");
        assert!(user.nodes.is_empty());
    }
}
