use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::lfa::Record;
use crate::repo::{RepoError, RepoResult, Repository};

/// Process-memory store.
///
/// Readers get a cheap `Arc` snapshot. Writers never mutate a published
/// vector: they clone it, apply the change and swap the new vector in, so a
/// snapshot handed out earlier stays exactly as it was.
pub struct InMemoryRepository<T> {
    kind: &'static str,
    records: RwLock<Arc<Vec<T>>>,
}

impl<T: Record + Clone> InMemoryRepository<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            records: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Fails on the first duplicate id.
    pub fn with_records(kind: &'static str, records: Vec<T>) -> RepoResult<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id().to_string()) {
                return Err(RepoError::Duplicate {
                    kind,
                    id: record.id().to_string(),
                });
            }
        }
        Ok(Self {
            kind,
            records: RwLock::new(Arc::new(records)),
        })
    }

    fn not_found(&self, id: &str) -> RepoError {
        RepoError::NotFound {
            kind: self.kind,
            id: id.to_string(),
        }
    }
}

impl<T: Record + Clone + PartialEq> InMemoryRepository<T> {
    /// Index of `expected` in `records`, which must still hold it unchanged.
    fn position_of(&self, records: &[T], expected: &T) -> RepoResult<usize> {
        let position = records
            .iter()
            .position(|r| r.id() == expected.id())
            .ok_or_else(|| self.not_found(expected.id()))?;
        if records[position] != *expected {
            return Err(RepoError::Stale {
                kind: self.kind,
                id: expected.id().to_string(),
            });
        }
        Ok(position)
    }
}

#[async_trait]
impl<T> Repository<T> for InMemoryRepository<T>
where
    T: Record + Clone + PartialEq + Send + Sync + 'static,
{
    async fn list(&self) -> RepoResult<Arc<Vec<T>>> {
        Ok(Arc::clone(&*self.records.read().await))
    }

    async fn get(&self, id: &str) -> RepoResult<Option<T>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn insert(&self, record: T) -> RepoResult<T> {
        let mut guard = self.records.write().await;
        if guard.iter().any(|r| r.id() == record.id()) {
            return Err(RepoError::Duplicate {
                kind: self.kind,
                id: record.id().to_string(),
            });
        }
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(record.clone());
        *guard = Arc::new(next);
        debug!("Inserted {} {}", self.kind, record.id());
        Ok(record)
    }

    async fn update(&self, record: T) -> RepoResult<T> {
        let mut guard = self.records.write().await;
        let position = guard
            .iter()
            .position(|r| r.id() == record.id())
            .ok_or_else(|| self.not_found(record.id()))?;
        let mut next = (**guard).clone();
        next[position] = record.clone();
        *guard = Arc::new(next);
        debug!("Updated {} {}", self.kind, record.id());
        Ok(record)
    }

    async fn swap(&self, expected: &T, replacement: T) -> RepoResult<T> {
        debug_assert_eq!(expected.id(), replacement.id());
        let mut guard = self.records.write().await;
        let position = self.position_of(&guard, expected)?;
        let mut next = (**guard).clone();
        next[position] = replacement.clone();
        *guard = Arc::new(next);
        debug!("Swapped {} {}", self.kind, replacement.id());
        Ok(replacement)
    }

    async fn swap_many(&self, changes: Vec<(T, T)>) -> RepoResult<Vec<T>> {
        let mut guard = self.records.write().await;
        let mut next = (**guard).clone();
        let mut written = Vec::with_capacity(changes.len());
        for (expected, replacement) in changes {
            debug_assert_eq!(expected.id(), replacement.id());
            let position = self.position_of(&guard, &expected)?;
            next[position] = replacement.clone();
            written.push(replacement);
        }
        *guard = Arc::new(next);
        debug!("Swapped {} {} records", written.len(), self.kind);
        Ok(written)
    }

    async fn delete(&self, id: &str) -> RepoResult<T> {
        let mut guard = self.records.write().await;
        let position = guard
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| self.not_found(id))?;
        let mut next = (**guard).clone();
        let removed = next.remove(position);
        *guard = Arc::new(next);
        debug!("Deleted {} {}", self.kind, id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lfa::fixtures::{person, Person};

    fn repo() -> InMemoryRepository<Person> {
        InMemoryRepository::with_records(
            "person",
            vec![
                person("1", "Dana", "active", None),
                person("2", "Avi", "inactive", None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_seed_rejected() {
        let result = InMemoryRepository::with_records(
            "person",
            vec![
                person("1", "Dana", "active", None),
                person("1", "Avi", "active", None),
            ],
        );
        assert!(matches!(result, Err(RepoError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_snapshot_unchanged_by_later_writes() {
        let repo = repo();
        let before = repo.list().await.unwrap();
        repo.delete("1").await.unwrap();

        assert_eq!(before.len(), 2);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate_id_conflicts() {
        let repo = repo();
        let err = repo
            .insert(person("2", "Noam", "active", None))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RepoError::Duplicate {
                kind: "person",
                id: "2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let repo = repo();
        repo.update(person("1", "Dana", "inactive", Some(5.0)))
            .await
            .unwrap();
        let store = repo.list().await.unwrap();
        assert_eq!(store[0].status, "inactive");
        assert_eq!(store[0].id, "1");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let err = repo()
            .update(person("9", "Ghost", "active", None))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_swap_rejects_stale_copy() {
        let repo = repo();
        let read_early = repo.get("1").await.unwrap().unwrap();
        repo.update(person("1", "Dana", "inactive", None))
            .await
            .unwrap();

        let err = repo
            .swap(&read_early, person("1", "Dana Levi", "active", None))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RepoError::Stale {
                kind: "person",
                id: "1".to_string()
            }
        );
        let stored = repo.get("1").await.unwrap().unwrap();
        assert_eq!(stored.status, "inactive");
        assert_eq!(stored.name, "Dana");
    }

    #[tokio::test]
    async fn test_second_swap_from_same_read_loses() {
        let repo = repo();
        let current = repo.get("2").await.unwrap().unwrap();
        repo.swap(&current, person("2", "Avi", "active", None))
            .await
            .unwrap();
        let err = repo
            .swap(&current, person("2", "Avi", "archived", None))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Stale { .. }));
        assert_eq!(repo.get("2").await.unwrap().unwrap().status, "active");
    }

    #[tokio::test]
    async fn test_swap_many_is_all_or_nothing() {
        let repo = repo();
        let dana = repo.get("1").await.unwrap().unwrap();
        let ghost = person("9", "Ghost", "active", None);
        let err = repo
            .swap_many(vec![
                (dana.clone(), person("1", "Dana", "archived", None)),
                (ghost, person("9", "Ghost", "archived", None)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
        assert_eq!(repo.get("1").await.unwrap().unwrap().status, "active");

        let avi = repo.get("2").await.unwrap().unwrap();
        repo.update(person("2", "Avi", "archived", None))
            .await
            .unwrap();
        let err = repo
            .swap_many(vec![
                (dana, person("1", "Dana", "archived", None)),
                (avi, person("2", "Avi", "active", None)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Stale { .. }));
        assert_eq!(repo.get("1").await.unwrap().unwrap().status, "active");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        assert!(repo().delete("9").await.is_err());
        assert!(repo().get("9").await.unwrap().is_none());
    }
}
