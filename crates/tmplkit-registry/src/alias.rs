//! Alias table: canonical name → alternate names.

/// Aliases declared by one registry for one canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// Directly registered function the aliases resolve to.
    pub canonical: String,
    /// Alternate names, in declaration order, without duplicates.
    pub aliases: Vec<String>,
    /// Registry that declared the aliases.
    pub registry: String,
}

/// Canonical name → ordered alias set.
///
/// Aliases are only recorded here; they are validated and expanded into
/// the function table when the handler builds.
#[derive(Debug, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    current: String,
}

impl AliasTable {
    /// Create a new empty alias table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute subsequent aliases to `uid`.
    pub fn set_registry(&mut self, uid: &str) {
        self.current.clear();
        self.current.push_str(uid);
    }

    /// Declare aliases for `canonical`.
    ///
    /// Repeated declarations from the same registry extend the existing set.
    pub fn add<I, S>(&mut self, canonical: &str, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let idx = match self
            .entries
            .iter()
            .position(|e| e.canonical == canonical && e.registry == self.current)
        {
            Some(idx) => idx,
            None => {
                self.entries.push(AliasEntry {
                    canonical: canonical.to_string(),
                    aliases: Vec::new(),
                    registry: self.current.clone(),
                });
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[idx];
        for alias in aliases {
            let alias = alias.into();
            if !entry.aliases.contains(&alias) {
                entry.aliases.push(alias);
            }
        }
    }

    /// Forget every alias declared by `uid`.
    pub fn remove_registry(&mut self, uid: &str) {
        self.entries.retain(|e| e.registry != uid);
    }

    /// Aliases declared for `canonical` across all registries.
    pub fn aliases_of<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.canonical == canonical)
            .flat_map(|e| e.aliases.iter().map(String::as_str))
    }

    /// Iterate over entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.iter()
    }

    /// Total number of aliases.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.aliases.len()).sum()
    }

    /// Check if no aliases are declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_an_ordered_set() {
        let mut aliases = AliasTable::new();
        aliases.set_registry("legacy");
        aliases.add("upper", ["toupper", "UPPER"]);
        aliases.add("upper", ["toupper"]);

        let names: Vec<_> = aliases.aliases_of("upper").collect();
        assert_eq!(names, vec!["toupper", "UPPER"]);
        assert_eq!(aliases.len(), 2);
    }

    #[test]
    fn entries_remember_registry() {
        let mut aliases = AliasTable::new();
        aliases.set_registry("a");
        aliases.add("upper", ["toupper"]);
        aliases.set_registry("b");
        aliases.add("upper", ["up"]);

        let regs: Vec<_> = aliases.iter().map(|e| e.registry.as_str()).collect();
        assert_eq!(regs, vec!["a", "b"]);
        assert_eq!(aliases.aliases_of("upper").count(), 2);
    }

    #[test]
    fn remove_registry_drops_its_entries() {
        let mut aliases = AliasTable::new();
        aliases.set_registry("a");
        aliases.add("upper", ["toupper"]);
        aliases.set_registry("b");
        aliases.add("lower", ["tolower"]);

        aliases.remove_registry("a");
        assert_eq!(aliases.aliases_of("upper").count(), 0);
        assert_eq!(aliases.aliases_of("lower").collect::<Vec<_>>(), vec!["tolower"]);
    }

    #[test]
    fn empty_table() {
        let aliases = AliasTable::new();
        assert!(aliases.is_empty());
        assert_eq!(aliases.aliases_of("upper").count(), 0);
    }
}
