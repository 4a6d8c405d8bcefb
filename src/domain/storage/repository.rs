//! Storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::{StorageEntity, StorageKey};

/// Predicate used by [`Storage::filter`]
pub type EntityFilter<'a, E> = &'a (dyn Fn(&E) -> bool + Send + Sync);

/// Keyed CRUD storage for one entity type.
///
/// Implementations own their connection handling; callers never hold a
/// connection across requests.
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// All entities, oldest first
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Fails with `Conflict` when the key is taken
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Fails with `NotFound` when the key is absent
    async fn update(&self, entity: E) -> Result<E, DomainError>;

    /// Insert or replace
    async fn save(&self, entity: E) -> Result<E, DomainError> {
        if self.exists(entity.key()).await? {
            self.update(entity).await
        } else {
            self.create(entity).await
        }
    }

    /// Returns true if something was deleted
    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError>;

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn filter(&self, predicate: EntityFilter<'_, E>) -> Result<Vec<E>, DomainError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|e| predicate(e))
            .collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Vec-backed storage that can be switched into a failing mode
    #[derive(Debug)]
    pub struct MockStorage<E>
    where
        E: StorageEntity,
    {
        entities: Mutex<Vec<E>>,
        error: Mutex<Option<String>>,
    }

    impl<E> Default for MockStorage<E>
    where
        E: StorageEntity,
    {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<E> MockStorage<E>
    where
        E: StorageEntity,
    {
        pub fn new() -> Self {
            Self {
                entities: Mutex::new(Vec::new()),
                error: Mutex::new(None),
            }
        }

        pub fn with_entity(self, entity: E) -> Self {
            self.entities.lock().unwrap().push(entity);
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.lock().unwrap() = Some(error.into());
            self
        }

        fn check_error(&self) -> Result<(), DomainError> {
            match self.error.lock().unwrap().clone() {
                Some(error) => Err(DomainError::storage(error)),
                None => Ok(()),
            }
        }

        fn position(&self, key: &E::Key) -> Option<usize> {
            self.entities
                .lock()
                .unwrap()
                .iter()
                .position(|e| e.key() == key)
        }
    }

    #[async_trait]
    impl<E> Storage<E> for MockStorage<E>
    where
        E: StorageEntity + 'static,
    {
        async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
            self.check_error()?;
            Ok(self
                .entities
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.key() == key)
                .cloned())
        }

        async fn list(&self) -> Result<Vec<E>, DomainError> {
            self.check_error()?;
            Ok(self.entities.lock().unwrap().clone())
        }

        async fn create(&self, entity: E) -> Result<E, DomainError> {
            self.check_error()?;
            if self.position(entity.key()).is_some() {
                return Err(DomainError::conflict(format!(
                    "Entity with key '{}' already exists",
                    entity.key().as_str()
                )));
            }
            self.entities.lock().unwrap().push(entity.clone());
            Ok(entity)
        }

        async fn update(&self, entity: E) -> Result<E, DomainError> {
            self.check_error()?;
            let index = self.position(entity.key()).ok_or_else(|| {
                DomainError::not_found(format!(
                    "Entity with key '{}' not found",
                    entity.key().as_str()
                ))
            })?;
            self.entities.lock().unwrap()[index] = entity.clone();
            Ok(entity)
        }

        async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
            self.check_error()?;
            match self.position(key) {
                Some(index) => {
                    self.entities.lock().unwrap().remove(index);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use serde::{Deserialize, Serialize};

        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        struct Quota {
            id: String,
            limit: u32,
        }

        impl StorageEntity for Quota {
            type Key = String;

            fn key(&self) -> &Self::Key {
                &self.id
            }
        }

        fn quota(id: &str, limit: u32) -> Quota {
            Quota {
                id: id.to_string(),
                limit,
            }
        }

        #[tokio::test]
        async fn test_save_inserts_then_replaces() {
            let storage: MockStorage<Quota> = MockStorage::new();

            storage.save(quota("q1", 10)).await.unwrap();
            storage.save(quota("q1", 20)).await.unwrap();

            let all = storage.list().await.unwrap();
            assert_eq!(all, vec![quota("q1", 20)]);
        }

        #[tokio::test]
        async fn test_create_conflict() {
            let storage = MockStorage::new().with_entity(quota("q1", 10));
            assert!(matches!(
                storage.create(quota("q1", 5)).await,
                Err(DomainError::Conflict { .. })
            ));
        }

        #[tokio::test]
        async fn test_update_missing() {
            let storage: MockStorage<Quota> = MockStorage::new();
            assert!(matches!(
                storage.update(quota("q1", 5)).await,
                Err(DomainError::NotFound { .. })
            ));
        }

        #[tokio::test]
        async fn test_filter_keeps_order() {
            let storage = MockStorage::new()
                .with_entity(quota("a", 1))
                .with_entity(quota("b", 50))
                .with_entity(quota("c", 99));

            let large = storage.filter(&|q: &Quota| q.limit > 10).await.unwrap();
            assert_eq!(large, vec![quota("b", 50), quota("c", 99)]);
            assert_eq!(storage.count().await.unwrap(), 3);
        }

        #[tokio::test]
        async fn test_delete() {
            let storage = MockStorage::new().with_entity(quota("a", 1));
            assert!(storage.delete(&"a".to_string()).await.unwrap());
            assert!(!storage.delete(&"a".to_string()).await.unwrap());
            assert!(!storage.exists(&"a".to_string()).await.unwrap());
        }

        #[tokio::test]
        async fn test_failing_mode() {
            let storage: MockStorage<Quota> = MockStorage::new().with_error("disk on fire");
            assert!(matches!(
                storage.list().await,
                Err(DomainError::Storage { .. })
            ));
        }
    }
}
