//! Meta Index - `category -> entity -> sub type -> body` over the whole corpus.
//!
//! The index is a derived view. It is rebuilt wholesale from a record list
//! and never patched afterwards. Keys are composite ([`MetaKey`]) rather
//! than nested maps so that the collision policy lives in one place:
//!
//! - records are inserted in traversal order
//! - a later record with the same key replaces the earlier body
//!   (last-write-wins)
//! - every replacement is kept in [`MetaIndex::collisions`] and logged

mod render;

pub use render::*;

use fragment_model::{Category, EntityId, FragmentRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::diagnostics::{Diagnostics, EventKind, SyncEvent};

const TARGET: &str = "fragment_sync::index";

/// Composite key of one indexed fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MetaKey {
    pub category: Category,
    pub entity_id: EntityId,
    pub sub_type: String,
}

impl MetaKey {
    pub fn new(category: Category, entity_id: impl Into<EntityId>, sub_type: impl Into<String>) -> Self {
        Self {
            category,
            entity_id: entity_id.into(),
            sub_type: sub_type.into(),
        }
    }

    /// Key of a scanned record.
    pub fn of(record: &FragmentRecord) -> Self {
        Self::new(record.category, record.entity_id.clone(), record.sub_type.clone())
    }
}

/// Indexed body plus the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub body: String,
    pub source_file: PathBuf,
}

/// A key that was indexed more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub key: MetaKey,
    /// File whose body was replaced.
    pub replaced: PathBuf,
    /// File whose body won.
    pub winner: PathBuf,
}

/// The three-level fragment index.
#[derive(Debug, Clone, Default)]
pub struct MetaIndex {
    entries: BTreeMap<MetaKey, IndexEntry>,
    collisions: Vec<Collision>,
}

impl MetaIndex {
    /// Build the index from records in traversal order.
    pub fn build(records: &[FragmentRecord], diag: &mut Diagnostics) -> Self {
        let mut index = Self::default();
        for record in records {
            let entry = IndexEntry {
                body: record.body().to_string(),
                source_file: record.source_file.clone(),
            };
            if let Some(replaced) = index.insert(MetaKey::of(record), entry) {
                diag.record(
                    TARGET,
                    SyncEvent::new(
                        EventKind::DuplicateKey,
                        format!(
                            "{} defined again; body from {} replaced",
                            record.sub_type,
                            replaced.source_file.display()
                        ),
                    )
                    .with_entity(record.category, &record.entity_id)
                    .with_location(&record.source_file, Some(record.line)),
                );
            }
        }
        index
    }

    /// Insert or replace one entry, returning the displaced one.
    fn insert(&mut self, key: MetaKey, entry: IndexEntry) -> Option<IndexEntry> {
        let winner = entry.source_file.clone();
        let replaced = self.entries.insert(key.clone(), entry)?;
        self.collisions.push(Collision {
            key,
            replaced: replaced.source_file.clone(),
            winner,
        });
        Some(replaced)
    }

    /// Body of one fragment.
    pub fn get(&self, category: Category, entity_id: &str, sub_type: &str) -> Option<&str> {
        self.entry(category, entity_id, sub_type).map(|e| e.body.as_str())
    }

    /// Full entry of one fragment.
    pub fn entry(&self, category: Category, entity_id: &str, sub_type: &str) -> Option<&IndexEntry> {
        self.entries.get(&MetaKey::new(category, entity_id, sub_type))
    }

    /// Sub types indexed for an entity, in sorted order.
    pub fn sub_types<'a>(&'a self, category: Category, entity_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .keys()
            .filter(move |k| k.category == category && k.entity_id.as_str() == entity_id)
            .map(|k| k.sub_type.as_str())
    }

    /// Distinct entities of a category, in sorted order.
    pub fn entities(&self, category: Category) -> Vec<&EntityId> {
        let mut ids: Vec<&EntityId> = self
            .entries
            .keys()
            .filter(|k| k.category == category)
            .map(|k| &k.entity_id)
            .collect();
        ids.dedup();
        ids
    }

    /// Keys that were indexed more than once during the build.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&MetaKey, &IndexEntry)> {
        self.entries.iter()
    }

    /// Nested `category -> entity -> sub type -> body` view, for export.
    pub fn to_nested(&self) -> BTreeMap<Category, BTreeMap<&str, BTreeMap<&str, &str>>> {
        let mut nested: BTreeMap<Category, BTreeMap<&str, BTreeMap<&str, &str>>> = BTreeMap::new();
        for (key, entry) in &self.entries {
            nested
                .entry(key.category)
                .or_default()
                .entry(key.entity_id.as_str())
                .or_default()
                .insert(key.sub_type.as_str(), entry.body.as_str());
        }
        nested
    }
}
