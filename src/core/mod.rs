//! Core module - import pipeline, term store and project plumbing

pub mod access;
pub mod config;
pub mod importer;
pub mod project;
pub mod resolver;
pub mod rows;
pub mod slug;
pub mod store;

pub use access::{AccessError, Role, TeamMember, TeamRoster};
pub use config::Config;
pub use importer::{process_csv, ImportError, ImportOptions, ImportResult};
pub use project::{Project, ProjectError};
pub use rows::{CsvRow, Layout, LevelEntry, RowReader, LEVELS};
pub use store::{SqliteTermStore, StoreError, Term, TermId, TermStore};
