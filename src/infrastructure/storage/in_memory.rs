//! In-memory storage implementation

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

#[derive(Debug)]
struct Slot<E> {
    seq: u64,
    entity: E,
}

#[derive(Debug)]
struct Inner<E> {
    next_seq: u64,
    slots: HashMap<String, Slot<E>>,
}

/// Thread-safe in-memory storage
///
/// Data is lost when the process terminates. Listing returns entities in
/// insertion order; replacing an entity keeps its original position.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    inner: RwLock<Inner<E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_seq: 0,
                slots: HashMap::new(),
            }),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner<E>>, DomainError> {
        self.inner
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner<E>>, DomainError> {
        self.inner
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        Ok(self
            .read()?
            .slots
            .get(key.as_str())
            .map(|slot| slot.entity.clone()))
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let inner = self.read()?;
        let mut slots: Vec<&Slot<E>> = inner.slots.values().collect();
        slots.sort_by_key(|slot| slot.seq);

        Ok(slots.into_iter().map(|slot| slot.entity.clone()).collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut inner = self.write()?;

        if inner.slots.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                key
            )));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.slots.insert(
            key,
            Slot {
                seq,
                entity: entity.clone(),
            },
        );
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str();
        let mut inner = self.write()?;

        match inner.slots.get_mut(key) {
            Some(slot) => {
                slot.entity = entity.clone();
                Ok(entity)
            }
            None => Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            ))),
        }
    }

    async fn save(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut inner = self.write()?;

        if let Some(slot) = inner.slots.get_mut(&key) {
            slot.entity = entity.clone();
            return Ok(entity);
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.slots.insert(
            key,
            Slot {
                seq,
                entity: entity.clone(),
            },
        );
        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.write()?.slots.remove(key.as_str()).is_some())
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.read()?.slots.contains_key(key.as_str()))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.slots.len())
    }
}
