//! SQLite-backed note storage

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use notes_common::{Note, NoteId};

use crate::error::ServerResult;

/// Notes every fresh store starts with
pub const SEED_NOTES: [(NoteId, &str); 10] = [
    (11, "Mr. Nice"),
    (12, "Narco"),
    (13, "Bombasto"),
    (14, "Celeritas"),
    (15, "Magneta"),
    (16, "RubberMan"),
    (17, "Dynama"),
    (18, "Dr IQ"),
    (19, "Magma"),
    (20, "Tornado"),
];

/// Note table behind a shared connection
#[derive(Clone)]
pub struct NoteStore {
    conn: Arc<Mutex<Connection>>,
}

impl NoteStore {
    /// Open or create a store at path
    pub fn open(path: impl AsRef<Path>) -> ServerResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;

        info!("Opened note store at {:?}", path.as_ref());
        Ok(store)
    }

    /// Open an in-memory store
    pub fn open_memory() -> ServerResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store holding the seed notes
    pub fn seeded_memory() -> ServerResult<Self> {
        let store = Self::open_memory()?;
        store.seed_if_empty()?;
        Ok(store)
    }

    fn init_schema(&self) -> ServerResult<()> {
        let conn = self.conn.lock();
        // INTEGER PRIMARY KEY without AUTOINCREMENT hands out max(id) + 1
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Insert the seed notes unless the table already has rows.
    /// Returns whether seeding happened.
    pub fn seed_if_empty(&self) -> ServerResult<bool> {
        let mut conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(false);
        }

        let tx = conn.transaction()?;
        for (id, name) in SEED_NOTES {
            tx.execute("INSERT INTO notes (id, name) VALUES (?1, ?2)", params![id, name])?;
        }
        tx.commit()?;

        info!("Seeded {} notes", SEED_NOTES.len());
        Ok(true)
    }

    /// All notes ordered by id
    pub fn list(&self) -> ServerResult<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, name FROM notes ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok(Note::new(row.get(0)?, row.get::<_, String>(1)?)))?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?);
        }
        Ok(notes)
    }

    pub fn get(&self, id: NoteId) -> ServerResult<Option<Note>> {
        let conn = self.conn.lock();
        let note = conn
            .query_row(
                "SELECT id, name FROM notes WHERE id = ?1",
                params![id],
                |row| Ok(Note::new(row.get(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(note)
    }

    /// Notes whose name contains `fragment`, ignoring ASCII case
    pub fn find_by_name(&self, fragment: &str) -> ServerResult<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name FROM notes WHERE instr(lower(name), lower(?1)) > 0 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![fragment], |row| {
            Ok(Note::new(row.get(0)?, row.get::<_, String>(1)?))
        })?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?);
        }
        Ok(notes)
    }

    /// Insert a note under the next free id
    pub fn insert(&self, name: &str) -> ServerResult<Note> {
        let conn = self.conn.lock();
        conn.execute("INSERT INTO notes (name) VALUES (?1)", params![name])?;
        let note = Note::new(conn.last_insert_rowid(), name);
        debug!("Inserted note {}", note);
        Ok(note)
    }

    /// Store `note` under its id. Returns true when the id was new.
    pub fn upsert(&self, note: &Note) -> ServerResult<bool> {
        let conn = self.conn.lock();
        let updated = conn.execute(
            "UPDATE notes SET name = ?2 WHERE id = ?1",
            params![note.id, note.name],
        )?;
        if updated > 0 {
            debug!("Updated note {}", note);
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO notes (id, name) VALUES (?1, ?2)",
            params![note.id, note.name],
        )?;
        debug!("Created note {} through upsert", note);
        Ok(true)
    }

    /// Delete a note. Returns whether it existed.
    pub fn delete(&self, id: NoteId) -> ServerResult<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute("DELETE FROM notes WHERE id = ?1", params![id])?;

        if rows > 0 {
            debug!("Deleted note {}", id);
        }

        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_once() {
        let store = NoteStore::open_memory().unwrap();
        assert!(store.seed_if_empty().unwrap());
        assert!(!store.seed_if_empty().unwrap());

        let notes = store.list().unwrap();
        assert_eq!(notes.len(), 10);
        assert_eq!(notes[4], Note::new(15, "Magneta"));
    }

    #[test]
    fn test_insert_takes_max_plus_one() {
        let store = NoteStore::seeded_memory().unwrap();
        assert!(store.delete(15).unwrap());

        let note = store.insert("Alice").unwrap();
        assert_eq!(note, Note::new(21, "Alice"));
        assert_eq!(store.get(21).unwrap(), Some(note));
    }

    #[test]
    fn test_insert_into_empty_store() {
        let store = NoteStore::open_memory().unwrap();
        assert_eq!(store.insert("first").unwrap().id, 1);
    }

    #[test]
    fn test_upsert() {
        let store = NoteStore::seeded_memory().unwrap();

        assert!(!store.upsert(&Note::new(15, "MagnetaX")).unwrap());
        assert_eq!(store.get(15).unwrap().unwrap().name, "MagnetaX");

        assert!(store.upsert(&Note::new(40, "Zed")).unwrap());
        assert_eq!(store.list().unwrap().len(), 11);
    }

    #[test]
    fn test_delete_missing() {
        let store = NoteStore::seeded_memory().unwrap();
        assert!(!store.delete(99).unwrap());
        assert_eq!(store.list().unwrap().len(), 10);
    }

    #[test]
    fn test_find_by_name() {
        let store = NoteStore::seeded_memory().unwrap();

        let names = |term: &str| -> Vec<String> {
            store
                .find_by_name(term)
                .unwrap()
                .into_iter()
                .map(|n| n.name)
                .collect()
        };

        assert_eq!(names("Ma"), vec!["Magneta", "RubberMan", "Dynama", "Magma"]);
        assert_eq!(names("mag"), vec!["Magneta", "Magma"]);
        assert_eq!(names("Magn"), vec!["Magneta"]);
        assert!(names("%").is_empty());
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");

        {
            let store = NoteStore::open(&path).unwrap();
            store.insert("kept").unwrap();
        }

        let store = NoteStore::open(&path).unwrap();
        assert!(!store.seed_if_empty().unwrap());
        assert_eq!(store.list().unwrap(), vec![Note::new(1, "kept")]);
    }
}
