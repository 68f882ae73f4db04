//! In-memory model of the legacy configuration tree.
//!
//! The legacy format is a hierarchical key/value document with two top-level
//! sections, `groups` and `users`. Any section or subsection may be absent;
//! absence means "no data of that kind", never an error. Key order is
//! preserved from the document, since enumeration order drives progress
//! reporting.

/// A value in the legacy tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// A boolean flag.
    Bool(bool),
    /// Any other scalar, carried in string form.
    Str(String),
    /// An ordered sequence.
    List(Vec<ConfigValue>),
    /// A nested key/value section.
    Section(ConfigSection),
}

impl ConfigValue {
    /// The boolean value, if this is a boolean.
    ///
    /// The legacy store's accessor read non-booleans as `false`; callers that
    /// want that behavior use `as_bool().unwrap_or(false)`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The scalar string, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The nested section, if this is one.
    pub fn as_section(&self) -> Option<&ConfigSection> {
        match self {
            Self::Section(section) => Some(section),
            _ => None,
        }
    }

    /// The list entries, if this is a list.
    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::List(entries) => Some(entries),
            _ => None,
        }
    }
}

/// An ordered key/value section of the legacy tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSection {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigSection {
    /// Create an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, replacing an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// The nested section under `key`, if the key holds one.
    pub fn section(&self, key: &str) -> Option<&ConfigSection> {
        self.get(key).and_then(ConfigValue::as_section)
    }

    /// The string entries of the list under `key`.
    ///
    /// Returns `None` unless the key holds a list; non-string entries inside
    /// the list are skipped.
    pub fn string_list(&self, key: &str) -> Option<Vec<&str>> {
        let entries = self.get(key)?.as_list()?;
        Some(entries.iter().filter_map(ConfigValue::as_str).collect())
    }

    /// Iterate over keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over key/value pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A read-only snapshot of the full legacy tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTree {
    /// The `groups` section; empty if absent from the document.
    pub groups: ConfigSection,
    /// The `users` section; empty if absent from the document.
    pub users: ConfigSection,
}

impl SourceTree {
    /// Split a parsed root section into the two holder sections.
    ///
    /// A missing section yields an empty one; a `groups`/`users` key holding
    /// anything other than a section is treated as absent.
    pub fn from_root(root: ConfigSection) -> Self {
        Self {
            groups: root.section("groups").cloned().unwrap_or_default(),
            users: root.section("users").cloned().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(pairs: &[(&str, bool)]) -> ConfigValue {
        let mut section = ConfigSection::new();
        for (key, value) in pairs {
            section.insert(*key, ConfigValue::Bool(*value));
        }
        ConfigValue::Section(section)
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut section = ConfigSection::new();
        section.insert("zeta", ConfigValue::Bool(true));
        section.insert("alpha", ConfigValue::Bool(false));
        section.insert("mid", ConfigValue::Bool(true));

        let keys: Vec<&str> = section.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut section = ConfigSection::new();
        section.insert("a", ConfigValue::Bool(true));
        section.insert("b", ConfigValue::Bool(true));
        section.insert("a", ConfigValue::Bool(false));

        assert_eq!(section.len(), 2);
        assert_eq!(section.get("a").unwrap().as_bool(), Some(false));
        let keys: Vec<&str> = section.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_string_list_requires_a_list() {
        let mut section = ConfigSection::new();
        section.insert(
            "groups",
            ConfigValue::List(vec![
                ConfigValue::Str("admin".into()),
                ConfigValue::Bool(true),
                ConfigValue::Str("default".into()),
            ]),
        );
        section.insert("inheritance", ConfigValue::Str("not-a-list".into()));

        assert_eq!(
            section.string_list("groups"),
            Some(vec!["admin", "default"])
        );
        assert_eq!(section.string_list("inheritance"), None);
        assert_eq!(section.string_list("missing"), None);
    }

    #[test]
    fn test_section_accessor() {
        let mut root = ConfigSection::new();
        root.insert("permissions", perms(&[("core.fly", true)]));
        root.insert("flat", ConfigValue::Bool(true));

        assert!(root.section("permissions").is_some());
        assert!(root.section("flat").is_none());
        assert!(root.section("missing").is_none());
    }

    #[test]
    fn test_tree_from_root_with_missing_sections() {
        let tree = SourceTree::from_root(ConfigSection::new());
        assert!(tree.groups.is_empty());
        assert!(tree.users.is_empty());
    }

    #[test]
    fn test_tree_from_root_splits_sections() {
        let mut groups = ConfigSection::new();
        groups.insert("admin", perms(&[("core.fly", true)]));

        let mut root = ConfigSection::new();
        root.insert("groups", ConfigValue::Section(groups));

        let tree = SourceTree::from_root(root);
        assert_eq!(tree.groups.len(), 1);
        assert!(tree.users.is_empty());
    }
}
