// RKSOK — Phonebook Store Repository
//
// The capability set the gateway dispatches to, plus the SQLite backend.
// A missing record is a normal outcome (`None` / `false`), never an error,
// so real storage failures stay distinguishable from a clean not-found.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::db::Database;
use super::StoreError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// One storage operation a backend may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Fetch,
    Write,
    Delete,
}

/// Abstraction over phonebook storage operations.
///
/// Implementations are shared by every connection task, so they must be safe
/// to call concurrently. Calls may block; the gateway runs them off the async
/// executor.
pub trait PhonebookStore: Send + Sync {
    /// Look up the payload stored under `name`.
    fn fetch(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Create or replace the payload stored under `name`.
    fn write(&self, name: &str, payload: &str) -> Result<(), StoreError>;

    /// Delete the record. Returns true if it existed.
    fn delete(&self, name: &str) -> Result<bool, StoreError>;

    /// Whether this backend offers the given capability.
    fn supports(&self, _capability: Capability) -> bool {
        true
    }
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

/// SQLite-backed phonebook. Opens a fresh connection per operation so the
/// handle is `Sync` without wrapping a `rusqlite::Connection` in a lock.
pub struct SqlitePhonebookStore {
    db_path: PathBuf,
}

impl SqlitePhonebookStore {
    /// Create the store, running migrations once up front so startup fails
    /// fast on an unusable path.
    pub fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        let _db = Database::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "SQLite phonebook ready");
        Ok(Self { db_path })
    }

    fn open_db(&self) -> Result<Database, StoreError> {
        Database::open(&self.db_path)
    }
}

impl PhonebookStore for SqlitePhonebookStore {
    fn fetch(&self, name: &str) -> Result<Option<String>, StoreError> {
        let db = self.open_db()?;
        let phone = db
            .conn()
            .query_row(
                "SELECT phone FROM phonebook WHERE name = ?1",
                params![name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(phone)
    }

    fn write(&self, name: &str, payload: &str) -> Result<(), StoreError> {
        let db = self.open_db()?;
        let now = Utc::now().to_rfc3339();
        db.conn().execute(
            "INSERT INTO phonebook (name, phone, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET phone = excluded.phone,
                                             updated_at = excluded.updated_at",
            params![name, payload, now],
        )?;

        tracing::debug!(name, "Record written");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let db = self.open_db()?;
        let affected = db
            .conn()
            .execute("DELETE FROM phonebook WHERE name = ?1", params![name])?;
        Ok(affected > 0)
    }
}

// ─── Read-only Adapter ──────────────────────────────────────────────────────

/// Wraps a backend and advertises only `fetch`.
pub struct ReadOnlyStore {
    inner: Arc<dyn PhonebookStore>,
}

impl ReadOnlyStore {
    pub fn new(inner: Arc<dyn PhonebookStore>) -> Self {
        Self { inner }
    }
}

impl PhonebookStore for ReadOnlyStore {
    fn fetch(&self, name: &str) -> Result<Option<String>, StoreError> {
        self.inner.fetch(name)
    }

    fn write(&self, _name: &str, _payload: &str) -> Result<(), StoreError> {
        Err(StoreError::Other("store is read-only".to_string()))
    }

    fn delete(&self, _name: &str) -> Result<bool, StoreError> {
        Err(StoreError::Other("store is read-only".to_string()))
    }

    fn supports(&self, capability: Capability) -> bool {
        capability == Capability::Fetch && self.inner.supports(capability)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_store() -> (tempfile::TempDir, SqlitePhonebookStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqlitePhonebookStore::new(dir.path().join("rksok.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_fetch_missing_returns_none() {
        let (_dir, store) = setup_store();
        assert_eq!(store.fetch("nobody").unwrap(), None);
    }

    #[test]
    fn test_write_then_fetch() {
        let (_dir, store) = setup_store();
        store.write("ivan", "+1-555-0100").unwrap();
        assert_eq!(store.fetch("ivan").unwrap().as_deref(), Some("+1-555-0100"));
    }

    #[test]
    fn test_write_replaces_existing_payload() {
        let (_dir, store) = setup_store();
        store.write("ivan", "+1-555-0100").unwrap();
        store.write("ivan", "+1-555-0199\r\nwork: +1-555-0200").unwrap();
        assert_eq!(
            store.fetch("ivan").unwrap().as_deref(),
            Some("+1-555-0199\r\nwork: +1-555-0200")
        );

        let count: i64 = store
            .open_db()
            .unwrap()
            .conn()
            .query_row("SELECT count(*) FROM phonebook", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1, "Upsert must not duplicate the row");
    }

    #[test]
    fn test_delete_reports_existence() {
        let (_dir, store) = setup_store();
        store.write("ivan", "+1-555-0100").unwrap();

        assert!(store.delete("ivan").unwrap());
        assert!(!store.delete("ivan").unwrap(), "Second delete finds nothing");
        assert_eq!(store.fetch("ivan").unwrap(), None);
    }

    #[test]
    fn test_unicode_names() {
        let (_dir, store) = setup_store();
        store.write("Иван Хмурый", "+7-900-000-00-00").unwrap();
        assert_eq!(
            store.fetch("Иван Хмурый").unwrap().as_deref(),
            Some("+7-900-000-00-00")
        );
    }

    #[test]
    fn test_read_only_adapter() {
        let (_dir, store) = setup_store();
        store.write("ivan", "+1-555-0100").unwrap();

        let read_only = ReadOnlyStore::new(Arc::new(store));
        assert!(read_only.supports(Capability::Fetch));
        assert!(!read_only.supports(Capability::Write));
        assert!(!read_only.supports(Capability::Delete));

        assert_eq!(
            read_only.fetch("ivan").unwrap().as_deref(),
            Some("+1-555-0100")
        );
        assert!(read_only.write("ivan", "x").is_err());
        assert!(read_only.delete("ivan").is_err());
    }
}
