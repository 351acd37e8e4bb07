//! Shared collections and the references that point into them.

use crate::graph::PersistedEntity;
use crate::model::meta::EntityId;
use crate::reference::{ReferenceError, ReferenceResult};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, PoisonError, RwLock, Weak};

type Slots<T> = RwLock<HashMap<EntityId, Arc<T>>>;

/// Homogeneous collection that exclusively owns shared entities of one kind.
///
/// Clones share the same underlying storage.
pub struct AssetCollection<T> {
    slots: Arc<Slots<T>>,
}

impl<T: PersistedEntity> AssetCollection<T> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Stores `entity` under its `meta.uuid`, replacing any previous entry.
    ///
    /// Returns a reference to the stored entity.
    pub fn insert(&self, entity: T) -> AssetRef<T> {
        let uuid = entity.meta().uuid;
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uuid, Arc::new(entity));
        self.reference(uuid)
    }

    /// Removes the entity; outstanding references stop resolving.
    pub fn remove(&self, uuid: EntityId) -> Option<Arc<T>> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&uuid)
    }

    pub fn contains(&self, uuid: EntityId) -> bool {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&uuid)
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a reference to `uuid` without looking it up.
    pub fn reference(&self, uuid: EntityId) -> AssetRef<T> {
        AssetRef {
            uuid,
            slots: Arc::downgrade(&self.slots),
        }
    }
}

impl<T: PersistedEntity> Default for AssetCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AssetCollection<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

/// A `uuid` plus a weak handle to the collection that owns the target.
pub struct AssetRef<T> {
    uuid: EntityId,
    slots: Weak<Slots<T>>,
}

impl<T: PersistedEntity> AssetRef<T> {
    pub fn uuid(&self) -> EntityId {
        self.uuid
    }

    pub fn resolve(&self) -> ReferenceResult<Arc<T>> {
        resolve(self)
    }
}

impl<T> Clone for AssetRef<T> {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            slots: Weak::clone(&self.slots),
        }
    }
}

impl<T> Debug for AssetRef<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetRef").field("uuid", &self.uuid).finish()
    }
}

/// Looks up the target of `reference` in its bound collection.
pub fn resolve<T: PersistedEntity>(reference: &AssetRef<T>) -> ReferenceResult<Arc<T>> {
    let unresolved = || ReferenceError::Unresolved {
        kind: T::KIND,
        uuid: reference.uuid,
    };
    let slots = reference.slots.upgrade().ok_or_else(unresolved)?;
    let found = slots
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&reference.uuid)
        .cloned();
    found.ok_or_else(unresolved)
}
