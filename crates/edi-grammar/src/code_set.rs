//! Named sets of valid codes for `ID` fields, and the registry a grammar
//! carries them in.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSet {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub codes: HashSet<String>,
}

impl CodeSet {
    pub fn new(id: impl Into<String>, codes: impl IntoIterator<Item = String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            codes: codes.into_iter().collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.codes.contains(value)
    }
}

/// Lookup table of [`CodeSet`]s a grammar references by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeSetRegistry {
    sets: HashMap<String, CodeSet>,
}

impl CodeSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, set: CodeSet) {
        self.sets.insert(set.id.clone(), set);
    }

    pub fn get(&self, id: &str) -> Option<&CodeSet> {
        self.sets.get(id)
    }

    pub fn contains_code(&self, set_id: &str, value: &str) -> Option<bool> {
        self.get(set_id).map(|set| set.contains(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_set_membership() {
        let set = CodeSet::new("835_CLP02", ["1".into(), "2".into(), "19".into()]);
        assert!(set.contains("1"));
        assert!(!set.contains("99"));
    }

    #[test]
    fn registry_lookup_missing_set_returns_none() {
        let registry = CodeSetRegistry::new();
        assert_eq!(registry.contains_code("nonexistent", "X"), None);
    }

    #[test]
    fn registry_lookup_present_set_checks_membership() {
        let mut registry = CodeSetRegistry::new();
        registry.insert(CodeSet::new("qualifiers", ["MS".into(), "BY".into()]));
        assert_eq!(registry.contains_code("qualifiers", "MS"), Some(true));
        assert_eq!(registry.contains_code("qualifiers", "ZZ"), Some(false));
    }

    #[test]
    fn serde_roundtrip() {
        let mut registry = CodeSetRegistry::new();
        registry.insert(CodeSet::new("x", ["A".into()]));
        let json = serde_json::to_string(&registry).unwrap();
        let back: CodeSetRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.contains_code("x", "A"), Some(true));
    }
}
