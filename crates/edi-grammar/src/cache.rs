//! Write-once, read-many cache of loaded grammars, keyed by
//! [`GrammarId`]. Grammars are expensive to parse from JSON and never
//! change once a process has loaded them, so lookups after the first
//! load are a plain map read.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::GrammarError;
use crate::fixtures;
use crate::grammar::{Grammar, GrammarId};

#[derive(Debug, Default)]
pub struct GrammarCache {
    grammars: HashMap<GrammarId, Arc<Grammar>>,
}

impl GrammarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cache pre-populated with the grammars bundled with this
    /// crate (X12 835, X12 837P, EDIFACT ORDERS).
    pub fn with_bundled_grammars() -> Result<Self, GrammarError> {
        let mut cache = Self::new();
        for grammar in fixtures::bundled_grammars()? {
            cache.insert(grammar)?;
        }
        Ok(cache)
    }

    /// Registers `grammar`, rejecting a second registration under the
    /// same [`GrammarId`] rather than silently overwriting the first —
    /// the cache is write-once per §5.
    pub fn insert(&mut self, grammar: Grammar) -> Result<(), GrammarError> {
        if self.grammars.contains_key(&grammar.id) {
            return Err(GrammarError::AlreadyRegistered {
                edi_type: grammar.id.edi_type.clone(),
                message_type: grammar.id.message_type.clone(),
                version: grammar.id.version.clone(),
            });
        }
        debug!(grammar = %grammar.id, "registering grammar");
        self.grammars.insert(grammar.id.clone(), Arc::new(grammar));
        Ok(())
    }

    pub fn get(&self, id: &GrammarId) -> Option<Arc<Grammar>> {
        self.grammars.get(id).cloned()
    }

    pub fn get_or_err(&self, id: &GrammarId) -> Result<Arc<Grammar>, GrammarError> {
        self.get(id).ok_or_else(|| GrammarError::NotFound {
            edi_type: id.edi_type.clone(),
            message_type: id.message_type.clone(),
            version: id.version.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_cache_contains_all_three_fixture_grammars() {
        let cache = GrammarCache::with_bundled_grammars().unwrap();
        assert_eq!(cache.len(), 3);
        assert!(cache
            .get(&GrammarId::new("X12", "835", "005010X221A1"))
            .is_some());
        assert!(cache
            .get(&GrammarId::new("X12", "837", "005010X222A1"))
            .is_some());
        assert!(cache
            .get(&GrammarId::new("EDIFACT", "ORDERS", "D:96A:UN"))
            .is_some());
    }

    #[test]
    fn missing_grammar_is_an_error_not_a_panic() {
        let cache = GrammarCache::new();
        let err = cache
            .get_or_err(&GrammarId::new("X12", "999", "1"))
            .unwrap_err();
        assert!(matches!(err, GrammarError::NotFound { .. }));
    }

    #[test]
    fn duplicate_registration_is_rejected_not_overwritten() {
        let mut cache = GrammarCache::new();
        let first = fixtures::bundled_grammars().unwrap().into_iter().next().unwrap();
        let id = first.id.clone();
        cache.insert(first).unwrap();

        let duplicate = fixtures::bundled_grammars()
            .unwrap()
            .into_iter()
            .find(|g| g.id == id)
            .unwrap();
        let err = cache.insert(duplicate).unwrap_err();
        assert!(matches!(err, GrammarError::AlreadyRegistered { .. }));
        assert_eq!(cache.len(), 1);
    }
}
