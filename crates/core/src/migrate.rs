//! Per-holder translation of a legacy subtree into permission nodes.
//!
//! One holder's legacy subtree can carry up to four kinds of data, applied
//! in this order:
//! 1. `permissions` — flat permission flags
//! 2. `worlds` — per-world permission flags
//! 3. `groups` — parent group references
//! 4. `inheritance` — parent group references under the alternate key
//!
//! The two parent keys are not aliases: a holder may declare references
//! under either or both, and both are honored. Duplicates collapse through
//! the node set's upsert semantics.

use crate::errors::NodeError;
use crate::node::{NodeSet, PermissionNode};
use crate::source::ConfigSection;

/// Translate one holder's legacy subtree, inserting nodes into `nodes`.
///
/// Every step is optional based on subtree presence. The first malformed
/// entry aborts this holder with its node error; the batch driver records it
/// and moves on to the next holder.
pub fn migrate_holder(nodes: &mut NodeSet, data: &ConfigSection) -> Result<(), NodeError> {
    // Flat permissions. Non-boolean values read as false, matching the
    // legacy store's accessor.
    if let Some(perms) = data.section("permissions") {
        for (key, value) in perms.iter() {
            let value = value.as_bool().unwrap_or(false);
            nodes.insert(PermissionNode::permission(key, value)?);
        }
    }

    // Per-world permissions. Anything under `worlds` that is not itself a
    // section is skipped.
    if let Some(worlds) = data.section("worlds") {
        for (world, value) in worlds.iter() {
            let Some(perms) = value.as_section() else {
                continue;
            };
            for (key, value) in perms.iter() {
                let value = value.as_bool().unwrap_or(false);
                nodes.insert(PermissionNode::permission(key, value)?.in_world(world));
            }
        }
    }

    // Parent references, declared under either or both keys.
    for parent_key in ["groups", "inheritance"] {
        if let Some(parents) = data.string_list(parent_key) {
            for group in parents {
                nodes.insert(PermissionNode::inheritance(group)?);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ConfigValue;

    fn section(entries: Vec<(&str, ConfigValue)>) -> ConfigSection {
        let mut s = ConfigSection::new();
        for (key, value) in entries {
            s.insert(key, value);
        }
        s
    }

    fn bools(pairs: &[(&str, bool)]) -> ConfigValue {
        ConfigValue::Section(section(
            pairs
                .iter()
                .map(|(k, v)| (*k, ConfigValue::Bool(*v)))
                .collect(),
        ))
    }

    fn names(list: &[&str]) -> ConfigValue {
        ConfigValue::List(list.iter().map(|s| ConfigValue::Str((*s).into())).collect())
    }

    #[test]
    fn test_empty_subtree_is_a_no_op() {
        let mut nodes = NodeSet::new();
        migrate_holder(&mut nodes, &ConfigSection::new()).unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_flat_permissions() {
        let data = section(vec![(
            "permissions",
            bools(&[("core.fly", true), ("core.chat", false)]),
        )]);

        let mut nodes = NodeSet::new();
        migrate_holder(&mut nodes, &data).unwrap();

        assert_eq!(nodes.len(), 2);
        assert!(nodes.get("core.fly", None).unwrap().value);
        assert!(!nodes.get("core.chat", None).unwrap().value);
    }

    #[test]
    fn test_non_boolean_permission_reads_false() {
        let data = section(vec![(
            "permissions",
            ConfigValue::Section(section(vec![(
                "core.weight",
                ConfigValue::Str("10".into()),
            )])),
        )]);

        let mut nodes = NodeSet::new();
        migrate_holder(&mut nodes, &data).unwrap();
        assert!(!nodes.get("core.weight", None).unwrap().value);
    }

    #[test]
    fn test_world_permissions_carry_context() {
        let data = section(vec![(
            "worlds",
            ConfigValue::Section(section(vec![
                ("nether", bools(&[("core.pvp", true)])),
                ("flatline", ConfigValue::Str("not a section".into())),
            ])),
        )]);

        let mut nodes = NodeSet::new();
        migrate_holder(&mut nodes, &data).unwrap();

        assert_eq!(nodes.len(), 1);
        let node = nodes.get("core.pvp", Some("nether")).unwrap();
        assert!(node.value);
        assert_eq!(node.world.as_deref(), Some("nether"));
    }

    #[test]
    fn test_world_node_coexists_with_flat_node() {
        let data = section(vec![
            ("permissions", bools(&[("core.pvp", false)])),
            (
                "worlds",
                ConfigValue::Section(section(vec![("nether", bools(&[("core.pvp", true)]))])),
            ),
        ]);

        let mut nodes = NodeSet::new();
        migrate_holder(&mut nodes, &data).unwrap();

        assert_eq!(nodes.len(), 2);
        assert!(!nodes.get("core.pvp", None).unwrap().value);
        assert!(nodes.get("core.pvp", Some("nether")).unwrap().value);
    }

    #[test]
    fn test_both_parent_keys_are_honored() {
        let data = section(vec![
            ("groups", names(&["builder"])),
            ("inheritance", names(&["Default"])),
        ]);

        let mut nodes = NodeSet::new();
        migrate_holder(&mut nodes, &data).unwrap();

        let mut groups: Vec<&str> = nodes.inherited_groups().collect();
        groups.sort_unstable();
        assert_eq!(groups, vec!["builder", "default"]);
    }

    #[test]
    fn test_duplicate_parents_across_keys_collapse() {
        let data = section(vec![
            ("groups", names(&["Default"])),
            ("inheritance", names(&["default", "DEFAULT"])),
        ]);

        let mut nodes = NodeSet::new();
        migrate_holder(&mut nodes, &data).unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes.inherited_groups().collect::<Vec<_>>(), vec!["default"]);
    }

    #[test]
    fn test_remigration_is_idempotent() {
        let data = section(vec![
            ("permissions", bools(&[("core.fly", true)])),
            ("groups", names(&["default"])),
        ]);

        let mut nodes = NodeSet::new();
        migrate_holder(&mut nodes, &data).unwrap();
        let first = nodes.clone();
        migrate_holder(&mut nodes, &data).unwrap();

        assert_eq!(nodes, first);
    }

    #[test]
    fn test_malformed_permission_key_aborts_holder() {
        let data = section(vec![(
            "permissions",
            ConfigValue::Section(section(vec![
                ("core.fly", ConfigValue::Bool(true)),
                ("   ", ConfigValue::Bool(true)),
            ])),
        )]);

        let mut nodes = NodeSet::new();
        let result = migrate_holder(&mut nodes, &data);
        assert!(matches!(result, Err(NodeError::InvalidKey(_))));
    }

    #[test]
    fn test_blank_group_reference_aborts_holder() {
        let data = section(vec![("groups", names(&["  "]))]);

        let mut nodes = NodeSet::new();
        let result = migrate_holder(&mut nodes, &data);
        assert!(matches!(result, Err(NodeError::InvalidGroupReference(_))));
    }
}
