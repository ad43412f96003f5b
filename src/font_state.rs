//! Font State - Session-Scoped Font Registry
//!
//! One store per hosting session. It is a plain owned value: callers pass
//! `&mut FontStateStore` into `load_fonts`, and at most one batch may run
//! against a store at a time.

use std::collections::{HashMap, HashSet};

use crate::engine::RenderEngine;

/// Family name to subset identifiers, iterated in family insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilySubsets {
    families: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl FamilySubsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, family: &str, subset: String) {
        match self.index.get(family) {
            Some(&i) => self.families[i].1.push(subset),
            None => {
                self.index.insert(family.to_string(), self.families.len());
                self.families.push((family.to_string(), vec![subset]));
            }
        }
    }

    pub fn get(&self, family: &str) -> Option<&[String]> {
        self.index
            .get(family)
            .map(|&i| self.families[i].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.families
            .iter()
            .map(|(family, subsets)| (family.as_str(), subsets.as_slice()))
    }

    /// Every subset identifier, family by family
    pub fn all_subsets(&self) -> impl Iterator<Item = &str> {
        self.families
            .iter()
            .flat_map(|(_, subsets)| subsets.iter().map(String::as_str))
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

pub struct FontStateStore {
    loaded_keys: HashSet<String>,
    family_subsets: FamilySubsets,
    subset_counter: u64,
    engine: Box<dyn RenderEngine>,
}

impl FontStateStore {
    pub fn new(engine: Box<dyn RenderEngine>) -> Self {
        Self {
            loaded_keys: HashSet::new(),
            family_subsets: FamilySubsets::new(),
            subset_counter: 0,
            engine,
        }
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.loaded_keys.contains(key)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded_keys.len()
    }

    pub fn family_subsets(&self) -> &FamilySubsets {
        &self.family_subsets
    }

    pub fn subset_counter(&self) -> u64 {
        self.subset_counter
    }

    pub fn engine(&self) -> &dyn RenderEngine {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> &mut dyn RenderEngine {
        self.engine.as_mut()
    }

    /// Take the current counter value and advance it
    pub(crate) fn next_subset_index(&mut self) -> u64 {
        let n = self.subset_counter;
        self.subset_counter += 1;
        n
    }

    pub(crate) fn mark_loaded(&mut self, key: String) {
        self.loaded_keys.insert(key);
    }

    pub(crate) fn push_subset(&mut self, family: &str, subset: String) {
        self.family_subsets.push(family, subset);
    }
}

pub type EngineFactory = Box<dyn Fn() -> Box<dyn RenderEngine> + Send + Sync>;

/// Session id to font store. Stores are created on first use and never torn down.
pub struct FontSessions {
    stores: HashMap<String, FontStateStore>,
    engine_factory: EngineFactory,
}

impl FontSessions {
    pub fn new(engine_factory: EngineFactory) -> Self {
        Self {
            stores: HashMap::new(),
            engine_factory,
        }
    }

    pub fn get_or_create(&mut self, session: &str) -> &mut FontStateStore {
        let factory = &self.engine_factory;
        self.stores.entry(session.to_string()).or_insert_with(|| {
            log::debug!("Creating font store for session {}", session);
            FontStateStore::new(factory())
        })
    }

    pub fn contains(&self, session: &str) -> bool {
        self.stores.contains_key(session)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl Default for FontSessions {
    fn default() -> Self {
        Self::new(Box::new(|| {
            Box::new(crate::engine::FontdbEngine::new()) as Box<dyn RenderEngine>
        }))
    }
}
