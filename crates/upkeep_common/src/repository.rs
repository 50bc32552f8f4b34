//! Repository abstraction over keyed record collections.
//!
//! The scheduler, lifecycle manager and asset catalog depend on the
//! `Repository` trait only, so a durable store can replace
//! `MemoryRepository` without touching policy code.
//!
//! Callers serialize writes (the daemon holds one `RwLock` per collection);
//! implementations do not need internal locking.

/// A record addressable by a unique string id
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// Keyed storage capability set: get, list, upsert, delete
pub trait Repository<T: Record>: Send + Sync {
    /// Fetch a record by id
    fn get(&self, id: &str) -> Option<T>;

    /// All records in insertion order
    fn list(&self) -> Vec<T>;

    /// Insert a new record, or replace the record with the same id in place
    fn upsert(&mut self, record: T);

    /// Remove a record, returning it if it existed
    fn delete(&mut self, id: &str) -> Option<T>;

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn len(&self) -> usize {
        self.list().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime repository backed by a `Vec`.
///
/// Preserves insertion order; replacing a record keeps its position.
#[derive(Debug, Clone)]
pub struct MemoryRepository<T> {
    records: Vec<T>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn get(&self, id: &str) -> Option<T> {
        self.records.iter().find(|r| r.id() == id).cloned()
    }

    fn list(&self) -> Vec<T> {
        self.records.clone()
    }

    fn upsert(&mut self, record: T) {
        match self.position(record.id()) {
            Some(idx) => self.records[idx] = record,
            None => self.records.push(record),
        }
    }

    fn delete(&mut self, id: &str) -> Option<T> {
        self.position(id).map(|idx| self.records.remove(idx))
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        value: u32,
    }

    impl Record for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, value: u32) -> Item {
        Item {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn test_upsert_appends_in_order() {
        let mut repo = MemoryRepository::new();
        repo.upsert(item("a", 1));
        repo.upsert(item("b", 2));
        repo.upsert(item("c", 3));

        let ids: Vec<String> = repo.list().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut repo = MemoryRepository::new();
        repo.upsert(item("a", 1));
        repo.upsert(item("b", 2));
        repo.upsert(item("a", 10));

        let list = repo.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], item("a", 10));
        assert_eq!(list[1], item("b", 2));
    }

    #[test]
    fn test_delete() {
        let mut repo = MemoryRepository::new();
        repo.upsert(item("a", 1));

        assert_eq!(repo.delete("a"), Some(item("a", 1)));
        assert_eq!(repo.delete("a"), None);
        assert!(repo.is_empty());
        assert!(!repo.contains("a"));
    }

    #[test]
    fn test_get_returns_copy() {
        let mut repo = MemoryRepository::new();
        repo.upsert(item("a", 1));

        let mut fetched = repo.get("a").unwrap();
        fetched.value = 99;
        assert_eq!(repo.get("a").unwrap().value, 1);
    }
}
