//! SQLite-backed catalog of items with normalized categories.

use crate::error::{Error, Result};
use crate::model::{Item, ItemList};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;
use std::path::Path;

/// Type alias for the database connection pool.
pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Schema bootstrap, idempotent.
///
/// Category names carry a UNIQUE constraint; the storage layer, not
/// application code, is what guarantees no two categories share a name.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS items (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    image_name  TEXT NOT NULL
);
";

const ITEM_COLUMNS: &str =
    "items.id, items.name, categories.name, items.image_name";

/// The catalog store.
///
/// Items and categories are append-only: created via ingestion, never
/// updated or deleted. All reads join the category table so callers see
/// category names, never raw category identifiers.
#[derive(Clone)]
pub struct Catalog {
    pool: DbPool,
}

impl Catalog {
    /// Open (and if necessary create) the catalog database at the given path.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let manager = SqliteConnectionManager::file(db_path.as_ref()).with_init(|conn| {
            // Enforce referential integrity and wait out writer contention
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        });

        let pool = r2d2::Pool::builder().max_size(4).build(manager)?;

        let conn = pool.get()?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::store_unavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Return the id of the category with the given name, creating it on
    /// first use.
    ///
    /// Lookup, then insert, then re-lookup on a uniqueness violation: when
    /// two callers race to create the same name, the UNIQUE constraint makes
    /// one insert lose, and the retry recovers the winner's id.
    pub fn resolve_or_create_category(&self, name: &str) -> Result<i64> {
        let conn = self.conn()?;

        loop {
            let existing: Option<i64> = conn
                .query_row("SELECT id FROM categories WHERE name = ?1", [name], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(|e| Error::store_unavailable(e.to_string()))?;

            if let Some(id) = existing {
                return Ok(id);
            }

            match conn.execute("INSERT INTO categories (name) VALUES (?1)", [name]) {
                Ok(_) => {
                    let id = conn.last_insert_rowid();
                    log::info!("created category {:?} (id {})", name, id);
                    return Ok(id);
                }
                Err(e) if is_unique_violation(&e) => {
                    // Concurrent creation won; the next lookup finds its row
                    continue;
                }
                Err(e) => return Err(Error::store_unavailable(e.to_string())),
            }
        }
    }

    /// Insert a new item and return its assigned identifier.
    pub fn add_item(&self, name: &str, category: &str, image_name: &str) -> Result<i64> {
        let category_id = self.resolve_or_create_category(category)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO items (name, category_id, image_name) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, category_id, image_name],
        )
        .map_err(|e| Error::store_unavailable(e.to_string()))?;

        Ok(conn.last_insert_rowid())
    }

    /// Return every item in insertion order, joined with category names.
    pub fn list_all(&self) -> Result<ItemList> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM items
                 JOIN categories ON categories.id = items.category_id
                 ORDER BY items.id",
                ITEM_COLUMNS
            ))
            .map_err(|e| Error::store_unavailable(e.to_string()))?;

        let items = stmt
            .query_map([], item_from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<Item>>>())
            .map_err(|e| Error::store_unavailable(e.to_string()))?;

        Ok(ItemList::from(items))
    }

    /// Look up a single item by its identifier.
    pub fn get_by_id(&self, id: i64) -> Result<Item> {
        if id < 1 {
            return Err(Error::not_found(id));
        }

        let conn = self.conn()?;
        let item = conn
            .query_row(
                &format!(
                    "SELECT {} FROM items
                     JOIN categories ON categories.id = items.category_id
                     WHERE items.id = ?1",
                    ITEM_COLUMNS
                ),
                [id],
                item_from_row,
            )
            .optional()
            .map_err(|e| Error::store_unavailable(e.to_string()))?;

        item.ok_or_else(|| Error::not_found(id))
    }

    /// Return items whose name contains the keyword as a substring.
    ///
    /// An empty keyword matches every item. Output shape and order match
    /// [`Catalog::list_all`].
    pub fn search(&self, keyword: &str) -> Result<ItemList> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM items
                 JOIN categories ON categories.id = items.category_id
                 WHERE items.name LIKE '%' || ?1 || '%'
                 ORDER BY items.id",
                ITEM_COLUMNS
            ))
            .map_err(|e| Error::store_unavailable(e.to_string()))?;

        let items = stmt
            .query_map([keyword], item_from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<Item>>>())
            .map_err(|e| Error::store_unavailable(e.to_string()))?;

        Ok(ItemList::from(items))
    }
}

/// Parse an item from a joined row (id, name, category name, image name).
fn item_from_row(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        image_name: row.get(3)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
