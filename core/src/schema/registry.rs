//! # Schema Registry
//!
//! Named schemas of one source root, keyed by mangled name. Registration
//! is insert-if-absent so concurrent resolvers agree on a single entry.

use crate::schema::model::Schema;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Ready(Arc<Schema>),
}

/// Outcome of claiming a name before building its schema.
#[derive(Debug, Clone)]
pub enum Claim {
    /// The caller owns the name and must call `complete`.
    Claimed,
    /// Another resolution of the same name is still walking its fields.
    InProgress,
    /// The name is already built.
    Ready(Arc<Schema>),
}

/// Concurrent map from mangled name to object or enum schema.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: DashMap<String, Slot>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `name` with a placeholder unless it is already present.
    pub fn claim(&self, name: &str) -> Claim {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(o) => match o.get() {
                Slot::Pending => Claim::InProgress,
                Slot::Ready(schema) => Claim::Ready(schema.clone()),
            },
            Entry::Vacant(v) => {
                v.insert(Slot::Pending);
                Claim::Claimed
            }
        }
    }

    /// Replaces the placeholder of a claimed name. A name already completed
    /// keeps its first schema, which is returned.
    pub fn complete(&self, name: &str, schema: Schema) -> Arc<Schema> {
        let mut slot = self
            .entries
            .entry(name.to_string())
            .or_insert(Slot::Pending);
        if let Slot::Ready(existing) = &*slot {
            return existing.clone();
        }
        tracing::debug!(name, "registered schema");
        let schema = Arc::new(schema);
        *slot = Slot::Ready(schema.clone());
        schema
    }

    /// Inserts a finished schema unless the name is taken; returns the entry.
    pub fn register(&self, name: &str, schema: Schema) -> Arc<Schema> {
        match self.claim(name) {
            Claim::Ready(existing) => existing,
            Claim::Claimed | Claim::InProgress => self.complete(name, schema),
        }
    }

    /// The finished schema under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        match self.entries.get(name).as_deref() {
            Some(Slot::Ready(schema)) => Some(schema.clone()),
            _ => None,
        }
    }

    /// Whether `name` is claimed or built.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of names claimed or built.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finished entries sorted by name.
    pub fn snapshot(&self) -> IndexMap<String, Schema> {
        let mut out: IndexMap<String, Schema> = self
            .entries
            .iter()
            .filter_map(|e| match e.value() {
                Slot::Ready(schema) => Some((e.key().clone(), (**schema).clone())),
                Slot::Pending => None,
            })
            .collect();
        out.sort_keys();
        out
    }
}
