//! Scope identifiers.
//!
//! Every component that takes part in a build gets a short id; its scope class
//! is `-q<id>`. Ids come from a `ScopeIdGenerator` so builds stay
//! reproducible: the default `HashedIds` derives them from the component key,
//! `SequentialIds` numbers them in walk order.

use crate::component::ComponentKey;
use rustc_hash::{FxHashMap, FxHashSet};

/// Hex digits kept from the hash.
const HASHED_ID_LEN: usize = 8;

/// Short identifier used to build a component's scope class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(String);

impl ScopeId {
    /// The scope class, e.g. `-q1a2b3c4d`.
    pub fn class_name(&self) -> String {
        format!("-q{}", self.0)
    }
}

/// Source of scope ids.
///
/// `attempt` is bumped when a generated id is already taken by another key.
pub trait ScopeIdGenerator {
    fn generate(&mut self, key: &ComponentKey, attempt: u32) -> ScopeId;
}

/// Ids derived from a blake3 hash of the component key.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashedIds;

impl ScopeIdGenerator for HashedIds {
    fn generate(&mut self, key: &ComponentKey, attempt: u32) -> ScopeId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(key.as_str().as_bytes());
        if attempt > 0 {
            hasher.update(&attempt.to_le_bytes());
        }
        let digest = hex::encode(hasher.finalize().as_bytes());
        ScopeId(digest[..HASHED_ID_LEN].to_owned())
    }
}

/// Ids numbered in generation order (`0`, `1`, ...).
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialIds {
    next: u32,
}

impl ScopeIdGenerator for SequentialIds {
    fn generate(&mut self, _key: &ComponentKey, _attempt: u32) -> ScopeId {
        let id = ScopeId(self.next.to_string());
        self.next += 1;
        id
    }
}

/// Assigns each component key exactly one id, unique across the build.
pub struct ScopeRegistry<'g> {
    generator: &'g mut dyn ScopeIdGenerator,
    assigned: FxHashMap<ComponentKey, ScopeId>,
    taken: FxHashSet<ScopeId>,
}

impl<'g> ScopeRegistry<'g> {
    pub fn new(generator: &'g mut dyn ScopeIdGenerator) -> Self {
        Self {
            generator,
            assigned: FxHashMap::default(),
            taken: FxHashSet::default(),
        }
    }

    /// Id for `key`, generating one on first use.
    pub fn assign(&mut self, key: &ComponentKey) -> ScopeId {
        if let Some(id) = self.assigned.get(key) {
            return id.clone();
        }

        let mut attempt = 0;
        let id = loop {
            let candidate = self.generator.generate(key, attempt);
            if self.taken.insert(candidate.clone()) {
                break candidate;
            }
            attempt += 1;
        };

        self.assigned.insert(key.clone(), id.clone());
        id
    }

    pub fn into_map(self) -> FxHashMap<ComponentKey, ScopeId> {
        self.assigned
    }
}

/// Stable fingerprint of a JSON value, used to tell mounts of one component apart.
pub fn fingerprint(value: &serde_json::Value) -> blake3::Hash {
    blake3::hash(value.to_string().as_bytes())
}
