//! Entity storage
//!
//! The calculation engine never touches storage: it is handed slices.
//! Storage sits behind a narrow `Repository` interface with two backends:
//!
//! - **MemoryRepository**: insertion-ordered, in-process collection
//! - **JsonFileRepository**: whole collection persisted as one JSON array
//!
//! # Example
//!
//! ```rust
//! use costplan_core::{MemoryRepository, Profile, Repository};
//!
//! let mut profiles = MemoryRepository::new();
//! profiles.save(Profile::new("dev").rate(500.0)).unwrap();
//! profiles.save(Profile::new("dev").rate(550.0)).unwrap();
//!
//! let all = profiles.get_all().unwrap();
//! assert_eq!(all.len(), 1);
//! assert_eq!(all[0].daily_rate, 550.0);
//! ```

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::{BacklogItem, Planning, Profile};

// ============================================================================
// Traits
// ============================================================================

/// An entity with a stable identifier
pub trait Entity: Clone {
    fn entity_id(&self) -> String;
}

impl Entity for BacklogItem {
    fn entity_id(&self) -> String {
        self.id.clone()
    }
}

impl Entity for Profile {
    fn entity_id(&self) -> String {
        self.id.clone()
    }
}

impl Entity for Planning {
    fn entity_id(&self) -> String {
        format!("{}:{}", self.scope, self.profile_id)
    }
}

/// Storage interface for one entity kind
pub trait Repository<T: Entity> {
    /// All entities in storage order
    fn get_all(&self) -> Result<Vec<T>, StoreError>;

    /// Look up one entity by ID
    fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.get_all()?.into_iter().find(|e| e.entity_id() == id))
    }

    /// Insert, or replace the entity with the same ID in place
    fn save(&mut self, entity: T) -> Result<(), StoreError>;

    /// Save several entities
    fn save_bulk(&mut self, entities: Vec<T>) -> Result<(), StoreError> {
        for entity in entities {
            self.save(entity)?;
        }
        Ok(())
    }

    /// Delete by ID. Returns whether an entity was removed.
    fn delete(&mut self, id: &str) -> Result<bool, StoreError>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Insertion-ordered in-memory repository
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository<T> {
    entities: Vec<T>,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Create a repository pre-filled with entities (later duplicates win)
    pub fn with_entities(entities: Vec<T>) -> Self {
        let mut repo = Self::new();
        for entity in entities {
            upsert(&mut repo.entities, entity);
        }
        repo
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Borrow the stored entities
    pub fn as_slice(&self) -> &[T] {
        &self.entities
    }
}

impl<T: Entity> Repository<T> for MemoryRepository<T> {
    fn get_all(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.entities.clone())
    }

    fn save(&mut self, entity: T) -> Result<(), StoreError> {
        upsert(&mut self.entities, entity);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(remove(&mut self.entities, id))
    }
}

fn upsert<T: Entity>(entities: &mut Vec<T>, entity: T) {
    let id = entity.entity_id();
    match entities.iter_mut().find(|e| e.entity_id() == id) {
        Some(existing) => *existing = entity,
        None => entities.push(entity),
    }
}

fn remove<T: Entity>(entities: &mut Vec<T>, id: &str) -> bool {
    let before = entities.len();
    entities.retain(|e| e.entity_id() != id);
    entities.len() != before
}

// ============================================================================
// JSON file store
// ============================================================================

/// Repository persisting the whole collection as a JSON array.
///
/// A missing file reads as an empty collection. Every write rewrites the file.
#[derive(Clone, Debug)]
pub struct JsonFileRepository<T> {
    path: PathBuf,
    _marker: std::marker::PhantomData<T>,
}

impl<T> JsonFileRepository<T>
where
    T: Entity + Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<T>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, entities: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entities)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl<T> Repository<T> for JsonFileRepository<T>
where
    T: Entity + Serialize + DeserializeOwned,
{
    fn get_all(&self) -> Result<Vec<T>, StoreError> {
        self.load()
    }

    fn save(&mut self, entity: T) -> Result<(), StoreError> {
        let mut entities = self.load()?;
        upsert(&mut entities, entity);
        self.write(&entities)
    }

    fn save_bulk(&mut self, new_entities: Vec<T>) -> Result<(), StoreError> {
        let mut entities = self.load()?;
        for entity in new_entities {
            upsert(&mut entities, entity);
        }
        self.write(&entities)
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut entities = self.load()?;
        let removed = remove(&mut entities, id);
        if removed {
            self.write(&entities)?;
        }
        Ok(removed)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Storage error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store: {0}")]
    Json(#[from] serde_json::Error),
}
