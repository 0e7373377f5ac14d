//! Taxonomy term store
//!
//! The importer only needs three primitives from a store: look a term up by
//! name within a parent, insert a term under a parent, and overwrite a
//! term's description. Each store instance is scoped to one taxonomy.

mod sqlite;

pub use sqlite::{SqliteTermStore, TermSession};

use serde::Serialize;
use thiserror::Error;

use crate::core::slug;

/// Longest term name a store accepts, in characters
pub const MAX_NAME_CHARS: usize = 200;

/// Numeric term identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TermId(pub i64);

impl TermId {
    /// Parent reference of a top-level term
    pub const ROOT: TermId = TermId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl std::fmt::Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored taxonomy term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parent: TermId,
}

/// Errors raised by a term store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("term store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("parent term {parent} does not exist in this taxonomy")]
    InvalidParent { parent: TermId },

    #[error("term name is empty")]
    EmptyName,

    #[error("term name is {len} characters long (maximum {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("term {id} not found")]
    TermNotFound { id: TermId },
}

/// Storage primitives the hierarchy resolver depends on
pub trait TermStore {
    /// Find the term named `name` directly under `parent`
    fn term_exists(&mut self, name: &str, parent: TermId) -> Result<Option<TermId>, StoreError>;

    /// Insert a new term under `parent` with the given slug
    fn insert_term(&mut self, name: &str, parent: TermId, slug: &str)
        -> Result<TermId, StoreError>;

    /// Replace a term's description
    fn update_description(&mut self, id: TermId, description: &str) -> Result<(), StoreError>;

    /// Derive the slug for a new term
    fn slugify(&self, name: &str) -> String {
        slug::slugify(name)
    }
}

/// Check a name against the store's naming rules
pub(crate) fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::EmptyName);
    }
    let len = name.chars().count();
    if len > MAX_NAME_CHARS {
        return Err(StoreError::NameTooLong {
            len,
            max: MAX_NAME_CHARS,
        });
    }
    Ok(())
}
