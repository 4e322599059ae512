//! The creature store — ordered in-memory collection backed by one asset.
//!
//! The store is loaded once and handed to whoever needs it; there is no
//! global instance. Every successful mutation writes the full collection
//! back through its [`AssetStorage`]. Lookups are linear scans, which is
//! fine at editor scale (dozens to hundreds of records).

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{error, info, warn};

use crate::config::AssetConfig;
use crate::creature::Creature;
use crate::error::Result;
use crate::persistence::{open_storage, AssetStorage};
use crate::types::CreatureId;

/// Ordered collection of creatures with save-on-every-change persistence.
pub struct CreatureStore {
    creatures: Vec<Creature>,
    storage: Box<dyn AssetStorage>,
}

impl std::fmt::Debug for CreatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatureStore")
            .field("location", &self.storage.location())
            .field("creatures", &self.creatures.len())
            .finish()
    }
}

impl CreatureStore {
    /// Load the store from `storage`.
    ///
    /// If no asset exists yet, an empty collection is created and saved
    /// immediately so the asset is established on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset cannot be read or decoded, or if the
    /// initial empty asset cannot be written.
    pub fn load(storage: impl AssetStorage + 'static) -> Result<Self> {
        Self::load_boxed(Box::new(storage))
    }

    /// Like [`CreatureStore::load`], for an already boxed backend.
    ///
    /// # Errors
    ///
    /// See [`CreatureStore::load`].
    pub fn load_boxed(storage: Box<dyn AssetStorage>) -> Result<Self> {
        let creatures = if let Some(creatures) = storage.load()? {
            info!(
                location = %storage.location(),
                creatures = creatures.len(),
                "Creature database loaded"
            );
            creatures
        } else {
            storage.save(&[])?;
            info!(location = %storage.location(), "Creature database created");
            Vec::new()
        };
        Ok(Self { creatures, storage })
    }

    /// Open the backend described by `config` and load from it.
    ///
    /// # Errors
    ///
    /// See [`open_storage`] and [`CreatureStore::load`].
    pub fn open(config: &AssetConfig) -> Result<Self> {
        Self::load_boxed(open_storage(config)?)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Append `creature` and persist.
    ///
    /// Returns `Ok(false)` without touching anything if a creature with the
    /// same id already exists.
    ///
    /// # Errors
    ///
    /// Returns the storage error if saving fails; the append is undone.
    pub fn add(&mut self, creature: Creature) -> Result<bool> {
        if self.contains(&creature.id) {
            warn!(id = %creature.id, "Creature with this id already exists");
            return Ok(false);
        }
        self.creatures.push(creature);
        self.persist(|creatures| {
            creatures.pop();
        })?;
        Ok(true)
    }

    /// Remove the first creature with `id` and persist.
    ///
    /// Returns `Ok(false)` without touching anything if `id` is unknown.
    ///
    /// # Errors
    ///
    /// Returns the storage error if saving fails; the removal is undone.
    pub fn remove(&mut self, id: &CreatureId) -> Result<bool> {
        let Some(index) = self.position(id) else {
            warn!(id = %id, "Creature not found");
            return Ok(false);
        };
        let removed = self.creatures.remove(index);
        self.persist(move |creatures| creatures.insert(index, removed))?;
        Ok(true)
    }

    /// Replace the whole record stored under `id` with `new_values`.
    ///
    /// The id is fixed: if `new_values.id` differs from `id` the update is
    /// refused with a warning. Returns `Ok(false)` for that case and for an
    /// unknown `id`.
    ///
    /// # Errors
    ///
    /// Returns the storage error if saving fails; the old record is restored.
    pub fn update(&mut self, id: &CreatureId, new_values: Creature) -> Result<bool> {
        let Some(index) = self.position(id) else {
            warn!(id = %id, "Creature not found");
            return Ok(false);
        };
        if new_values.id != *id {
            warn!(
                id = %id,
                new_id = %new_values.id,
                "Refusing update that would change a creature's id"
            );
            return Ok(false);
        }
        let old = std::mem::replace(&mut self.creatures[index], new_values);
        self.persist(move |creatures| creatures[index] = old)?;
        Ok(true)
    }

    /// Edit a copy of the record under `id` with `edit` and store it.
    ///
    /// Any change `edit` makes to the id is discarded.
    ///
    /// # Errors
    ///
    /// See [`CreatureStore::update`].
    pub fn update_with<F>(&mut self, id: &CreatureId, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut Creature),
    {
        let Some(mut copy) = self.find(id).cloned() else {
            warn!(id = %id, "Creature not found");
            return Ok(false);
        };
        edit(&mut copy);
        copy.id = id.clone();
        self.update(id, copy)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// First creature with `id`, if any.
    #[must_use]
    pub fn find(&self, id: &CreatureId) -> Option<&Creature> {
        self.creatures.iter().find(|c| c.id == *id)
    }

    /// Whether a creature with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &CreatureId) -> bool {
        self.position(id).is_some()
    }

    /// Snapshot of every creature, in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<Creature> {
        self.creatures.clone()
    }

    /// Snapshot of creatures whose name matches `term` (case-insensitive).
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<Creature> {
        self.creatures
            .iter()
            .filter(|c| c.matches_search(term))
            .cloned()
            .collect()
    }

    /// Borrowing iterator in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Creature> {
        self.creatures.iter()
    }

    /// Number of creatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    /// The backend this store saves to.
    #[must_use]
    pub fn storage(&self) -> &dyn AssetStorage {
        self.storage.as_ref()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn position(&self, id: &CreatureId) -> Option<usize> {
        self.creatures.iter().position(|c| c.id == *id)
    }

    /// Save the current collection; on failure apply `undo` and propagate.
    fn persist<F>(&mut self, undo: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Creature>),
    {
        if let Err(e) = self.storage.save(&self.creatures) {
            undo(&mut self.creatures);
            error!(
                location = %self.storage.location(),
                error = %e,
                "Failed to save creature database; change rolled back"
            );
            return Err(e);
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a CreatureStore {
    type Item = &'a Creature;
    type IntoIter = std::slice::Iter<'a, Creature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// SharedStore
// ---------------------------------------------------------------------------

/// A [`CreatureStore`] behind a mutex, for hosts with more than one caller.
///
/// Each call holds the lock across load-modify-save, so concurrent callers
/// are serialized.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<CreatureStore>>,
}

impl SharedStore {
    /// Wrap an already loaded store.
    #[must_use]
    pub fn new(store: CreatureStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, CreatureStore> {
        self.inner.lock()
    }

    /// See [`CreatureStore::add`].
    ///
    /// # Errors
    ///
    /// Returns the storage error if saving fails.
    pub fn add(&self, creature: Creature) -> Result<bool> {
        self.inner.lock().add(creature)
    }

    /// See [`CreatureStore::remove`].
    ///
    /// # Errors
    ///
    /// Returns the storage error if saving fails.
    pub fn remove(&self, id: &CreatureId) -> Result<bool> {
        self.inner.lock().remove(id)
    }

    /// See [`CreatureStore::update`].
    ///
    /// # Errors
    ///
    /// Returns the storage error if saving fails.
    pub fn update(&self, id: &CreatureId, new_values: Creature) -> Result<bool> {
        self.inner.lock().update(id, new_values)
    }

    /// Owned copy of the creature with `id`, if any.
    #[must_use]
    pub fn find(&self, id: &CreatureId) -> Option<Creature> {
        self.inner.lock().find(id).cloned()
    }

    /// See [`CreatureStore::all`].
    #[must_use]
    pub fn all(&self) -> Vec<Creature> {
        self.inner.lock().all()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
