//! SQLite-backed term store

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use super::{validate_name, StoreError, Term, TermId, TermStore};
use crate::core::slug;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// How long a writer waits for another import's lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Term store for one taxonomy inside a SQLite database
pub struct SqliteTermStore {
    conn: Connection,
    taxonomy: String,
}

impl SqliteTermStore {
    /// Open or create the store at `path`
    pub fn open(path: &Path, taxonomy: impl Into<String>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn, taxonomy.into())
    }

    /// Open a throwaway store that lives in memory
    pub fn open_in_memory(taxonomy: impl Into<String>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, taxonomy.into())
    }

    fn with_connection(conn: Connection, taxonomy: String) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self { conn, taxonomy };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Name is unique within a parent, slug within a taxonomy
            CREATE TABLE IF NOT EXISTS terms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                taxonomy TEXT NOT NULL,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                description TEXT,
                parent INTEGER NOT NULL DEFAULT 0,
                created TEXT NOT NULL,
                UNIQUE (taxonomy, parent, name),
                UNIQUE (taxonomy, slug)
            );
            CREATE INDEX IF NOT EXISTS idx_terms_parent ON terms(taxonomy, parent);
            "#,
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Begin an import session
    ///
    /// The session holds the database write lock until it is committed or
    /// dropped, so two imports against the same store run one after the other.
    pub fn session(&mut self) -> Result<TermSession<'_>, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(TermSession {
            tx,
            taxonomy: &self.taxonomy,
        })
    }

    /// All terms of the taxonomy in creation order
    pub fn list_terms(&self) -> Result<Vec<Term>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, slug, description, parent FROM terms
             WHERE taxonomy = ?1 ORDER BY id",
        )?;
        let terms = stmt
            .query_map(params![self.taxonomy], row_to_term)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(terms)
    }

    /// Fetch a single term
    pub fn get_term(&self, id: TermId) -> Result<Option<Term>, StoreError> {
        let term = self
            .conn
            .query_row(
                "SELECT id, name, slug, description, parent FROM terms
                 WHERE taxonomy = ?1 AND id = ?2",
                params![self.taxonomy, id.0],
                row_to_term,
            )
            .optional()?;
        Ok(term)
    }
}

impl TermStore for SqliteTermStore {
    fn term_exists(&mut self, name: &str, parent: TermId) -> Result<Option<TermId>, StoreError> {
        find_term(&self.conn, &self.taxonomy, name, parent)
    }

    fn insert_term(
        &mut self,
        name: &str,
        parent: TermId,
        slug: &str,
    ) -> Result<TermId, StoreError> {
        insert_term(&self.conn, &self.taxonomy, name, parent, slug)
    }

    fn update_description(&mut self, id: TermId, description: &str) -> Result<(), StoreError> {
        update_description(&self.conn, &self.taxonomy, id, description)
    }
}

/// An import in progress; writes become visible on [`TermSession::commit`]
pub struct TermSession<'a> {
    tx: Transaction<'a>,
    taxonomy: &'a str,
}

impl TermSession<'_> {
    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }

    /// Discard every write made in this session
    pub fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback()?;
        Ok(())
    }
}

impl TermStore for TermSession<'_> {
    fn term_exists(&mut self, name: &str, parent: TermId) -> Result<Option<TermId>, StoreError> {
        find_term(&self.tx, self.taxonomy, name, parent)
    }

    fn insert_term(
        &mut self,
        name: &str,
        parent: TermId,
        slug: &str,
    ) -> Result<TermId, StoreError> {
        insert_term(&self.tx, self.taxonomy, name, parent, slug)
    }

    fn update_description(&mut self, id: TermId, description: &str) -> Result<(), StoreError> {
        update_description(&self.tx, self.taxonomy, id, description)
    }
}

fn row_to_term(row: &rusqlite::Row<'_>) -> rusqlite::Result<Term> {
    Ok(Term {
        id: TermId(row.get(0)?),
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        parent: TermId(row.get(4)?),
    })
}

fn find_term(
    conn: &Connection,
    taxonomy: &str,
    name: &str,
    parent: TermId,
) -> Result<Option<TermId>, StoreError> {
    let id = conn
        .query_row(
            "SELECT id FROM terms WHERE taxonomy = ?1 AND parent = ?2 AND name = ?3",
            params![taxonomy, parent.0, name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id.map(TermId))
}

fn insert_term(
    conn: &Connection,
    taxonomy: &str,
    name: &str,
    parent: TermId,
    slug: &str,
) -> Result<TermId, StoreError> {
    validate_name(name)?;

    let parent_slug = if parent.is_root() {
        None
    } else {
        let found: Option<String> = conn
            .query_row(
                "SELECT slug FROM terms WHERE taxonomy = ?1 AND id = ?2",
                params![taxonomy, parent.0],
                |row| row.get(0),
            )
            .optional()?;
        Some(found.ok_or(StoreError::InvalidParent { parent })?)
    };

    let base = if slug.is_empty() {
        slug::slugify(name)
    } else {
        slug.to_string()
    };
    let slug = unique_slug(conn, taxonomy, &base, parent_slug.as_deref())?;

    conn.execute(
        "INSERT INTO terms (taxonomy, name, slug, description, parent, created)
         VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
        params![taxonomy, name, slug, parent.0, Utc::now().to_rfc3339()],
    )?;

    Ok(TermId(conn.last_insert_rowid()))
}

fn update_description(
    conn: &Connection,
    taxonomy: &str,
    id: TermId,
    description: &str,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE terms SET description = ?1 WHERE taxonomy = ?2 AND id = ?3",
        params![description, taxonomy, id.0],
    )?;
    if changed == 0 {
        return Err(StoreError::TermNotFound { id });
    }
    Ok(())
}

/// Pick a slug not yet used in the taxonomy
///
/// Tries the base slug, then the base with the parent's slug appended, then
/// numbered variants of that.
fn unique_slug(
    conn: &Connection,
    taxonomy: &str,
    base: &str,
    parent_slug: Option<&str>,
) -> Result<String, StoreError> {
    if !slug_taken(conn, taxonomy, base)? {
        return Ok(base.to_string());
    }

    let stem = match parent_slug {
        Some(parent_slug) => {
            let candidate = format!("{}-{}", base, parent_slug);
            if !slug_taken(conn, taxonomy, &candidate)? {
                return Ok(candidate);
            }
            candidate
        }
        None => base.to_string(),
    };

    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", stem, n);
        if !slug_taken(conn, taxonomy, &candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

fn slug_taken(conn: &Connection, taxonomy: &str, slug: &str) -> Result<bool, StoreError> {
    let taken = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM terms WHERE taxonomy = ?1 AND slug = ?2)",
        params![taxonomy, slug],
        |row| row.get(0),
    )?;
    Ok(taken)
}
