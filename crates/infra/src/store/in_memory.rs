use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use branches_core::{Branch, BranchDraft, BranchId};

use super::r#trait::{BranchConnection, Connector, StoreError};

/// A stored row. Columns are nullable here so tests can plant rows that fail
/// to decode, the same way a NULL column would in Postgres.
#[derive(Debug, Clone)]
struct Row {
    name: Option<String>,
    location: Option<String>,
}

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i64, Row>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Table {
    fn decode(id: i64, row: &Row) -> Result<Branch, StoreError> {
        match (&row.name, &row.location) {
            (Some(name), Some(location)) => Ok(Branch {
                id: BranchId::new(id),
                name: name.clone(),
                location: location.clone(),
            }),
            _ => Err(StoreError::Decode(format!("branch {id} has NULL columns"))),
        }
    }

    fn push(&mut self, row: Row) -> BranchId {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, row);
        BranchId::new(id)
    }
}

/// In-memory branch store.
///
/// Intended for tests/dev. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryConnector {
    table: Arc<RwLock<Table>>,
    offline: AtomicBool,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline, `acquire` and `ping` fail with [`StoreError::Connection`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored rows, including undecodable ones.
    pub fn len(&self) -> usize {
        match self.table.read() {
            Ok(table) => table.rows.len(),
            Err(poisoned) => poisoned.into_inner().rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a row without validation. `None` columns behave like SQL NULL.
    pub fn insert_raw(&self, name: Option<&str>, location: Option<&str>) -> BranchId {
        let row = Row {
            name: name.map(str::to_owned),
            location: location.map(str::to_owned),
        };
        match self.table.write() {
            Ok(mut table) => table.push(row),
            Err(poisoned) => poisoned.into_inner().push(row),
        }
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("in-memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    async fn acquire(&self) -> Result<Box<dyn BranchConnection>, StoreError> {
        self.check_online()?;
        Ok(Box::new(InMemoryBranchConnection {
            table: Arc::clone(&self.table),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}

/// Handle returned by [`InMemoryConnector::acquire`].
pub struct InMemoryBranchConnection {
    table: Arc<RwLock<Table>>,
}

impl InMemoryBranchConnection {
    fn read<T>(&self, f: impl FnOnce(&Table) -> T) -> Result<T, StoreError> {
        let table = self
            .table
            .read()
            .map_err(|_| StoreError::Query("branch table lock poisoned".to_string()))?;
        Ok(f(&table))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Table) -> T) -> Result<T, StoreError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::Query("branch table lock poisoned".to_string()))?;
        Ok(f(&mut table))
    }
}

#[async_trait]
impl BranchConnection for InMemoryBranchConnection {
    async fn list(&mut self) -> Result<Vec<Result<Branch, StoreError>>, StoreError> {
        self.read(|t| {
            t.rows
                .iter()
                .map(|(id, row)| Table::decode(*id, row))
                .collect()
        })
    }

    async fn find(&mut self, id: BranchId) -> Result<Option<Branch>, StoreError> {
        self.read(|t| t.rows.get(&id.get()).map(|row| Table::decode(id.get(), row)))?
            .transpose()
    }

    async fn exists(&mut self, id: BranchId) -> Result<bool, StoreError> {
        self.read(|t| t.rows.contains_key(&id.get()))
    }

    async fn insert(&mut self, draft: &BranchDraft) -> Result<Option<BranchId>, StoreError> {
        let row = Row {
            name: Some(draft.name.clone()),
            location: Some(draft.location.clone()),
        };
        self.write(|t| Some(t.push(row)))
    }

    async fn update(&mut self, id: BranchId, draft: &BranchDraft) -> Result<u64, StoreError> {
        self.write(|t| match t.rows.get_mut(&id.get()) {
            Some(row) => {
                row.name = Some(draft.name.clone());
                row.location = Some(draft.location.clone());
                1
            }
            None => 0,
        })
    }

    async fn delete(&mut self, id: BranchId) -> Result<u64, StoreError> {
        self.write(|t| u64::from(t.rows.remove(&id.get()).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_assigned_sequentially_from_one() {
        let store = InMemoryConnector::new();
        let mut conn = store.acquire().await.unwrap();

        let first = conn.insert(&BranchDraft::new("HQ", "Main St")).await.unwrap();
        let second = conn.insert(&BranchDraft::new("Annex", "2nd St")).await.unwrap();

        assert_eq!(first, Some(BranchId::new(1)));
        assert_eq!(second, Some(BranchId::new(2)));
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let store = InMemoryConnector::new();
        let mut conn = store.acquire().await.unwrap();

        let id = conn.insert(&BranchDraft::new("HQ", "Main St")).await.unwrap().unwrap();
        assert_eq!(conn.delete(id).await.unwrap(), 1);
        assert_eq!(conn.delete(id).await.unwrap(), 0);

        let next = conn.insert(&BranchDraft::new("HQ", "Main St")).await.unwrap();
        assert_eq!(next, Some(BranchId::new(2)));
    }

    #[tokio::test]
    async fn update_reports_affected_rows() {
        let store = InMemoryConnector::new();
        let mut conn = store.acquire().await.unwrap();
        let id = conn.insert(&BranchDraft::new("HQ", "Main St")).await.unwrap().unwrap();

        let affected = conn.update(id, &BranchDraft::new("HQ", "Elm St")).await.unwrap();
        assert_eq!(affected, 1);
        assert_eq!(conn.find(id).await.unwrap().unwrap().location, "Elm St");

        let missing = conn
            .update(BranchId::new(999), &BranchDraft::new("x", "y"))
            .await
            .unwrap();
        assert_eq!(missing, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn list_decodes_rows_individually() {
        let store = InMemoryConnector::new();
        store.insert_raw(Some("HQ"), Some("Main St"));
        store.insert_raw(None, Some("Nowhere"));
        store.insert_raw(Some("Annex"), Some("2nd St"));

        let mut conn = store.acquire().await.unwrap();
        let rows = conn.list().await.unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        assert!(matches!(rows[1], Err(StoreError::Decode(_))));
        assert_eq!(rows[2].as_ref().unwrap().name, "Annex");
    }

    #[tokio::test]
    async fn offline_store_refuses_connections() {
        let store = InMemoryConnector::new();
        store.set_offline(true);

        assert!(matches!(store.ping().await, Err(StoreError::Connection(_))));
        assert!(matches!(store.acquire().await, Err(StoreError::Connection(_))));

        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }

    #[test]
    fn len_survives_a_poisoned_lock() {
        let store = InMemoryConnector::new();
        store.insert_raw(Some("HQ"), Some("Main St"));
        store.insert_raw(Some("Annex"), Some("2nd St"));

        let table = Arc::clone(&store.table);
        let _ = std::thread::spawn(move || {
            let _guard = table.write().unwrap();
            panic!("poison the branch table");
        })
        .join();

        assert!(store.table.is_poisoned());
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }
}
