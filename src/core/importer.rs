//! CSV import driver

use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::resolver::resolve_row;
use crate::core::rows::{Layout, RowItem, RowReader};
use crate::core::store::{StoreError, TermStore};

/// Options for a single import run
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Discard the first record of the file
    pub has_header: bool,
    pub layout: Layout,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            layout: Layout::Names,
        }
    }
}

/// Summary of an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    /// Non-blank rows read, aborted rows included
    pub rows_processed: usize,
    pub terms_created: usize,
    pub terms_existing: usize,
    /// Rows whose level walk stopped on a store error
    pub rows_aborted: usize,
    /// Records that could not be decoded
    pub rows_malformed: usize,
}

/// Errors that end an import before a summary is produced
#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("CSV file not found: {}", path.display())]
    #[diagnostic(code(taxo::import::file_missing))]
    FileNotFound { path: PathBuf },

    #[error("CSV file could not be opened: {}", path.display())]
    #[diagnostic(code(taxo::import::cannot_open))]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(taxo::import::store))]
    Store(#[from] StoreError),
}

/// Import a CSV file into the term store
pub fn process_csv<S: TermStore + ?Sized>(
    store: &mut S,
    path: &Path,
    options: &ImportOptions,
) -> Result<ImportResult, ImportError> {
    let reader = RowReader::open(path, options.layout, options.has_header)?;
    info!(path = %path.display(), layout = %options.layout, "importing categories");

    import_rows(store, reader).map_err(|source| ImportError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Feed normalized rows through the resolver, summing the counters
///
/// Only a read failure ends the run; failing rows are logged and counted.
pub fn import_rows<S, I>(store: &mut S, rows: I) -> Result<ImportResult, io::Error>
where
    S: TermStore + ?Sized,
    I: IntoIterator<Item = Result<RowItem, io::Error>>,
{
    let mut result = ImportResult::default();

    for item in rows {
        let source = match item? {
            RowItem::Row(source) => source,
            RowItem::Malformed { line, reason } => {
                warn!(line, %reason, "skipping unreadable CSV record");
                result.rows_malformed += 1;
                continue;
            }
        };

        result.rows_processed += 1;
        let outcome = resolve_row(store, &source.row);
        result.terms_created += outcome.tally.created;
        result.terms_existing += outcome.tally.existing;

        match &outcome.failure {
            Some(failure) => {
                result.rows_aborted += 1;
                warn!(
                    line = source.line,
                    level = failure.level + 1,
                    name = %failure.name,
                    error = %failure.error,
                    "row abandoned"
                );
            }
            None => debug!(
                line = source.line,
                created = outcome.tally.created,
                existing = outcome.tally.existing,
                leaf = ?outcome.leaf,
                "row imported"
            ),
        }
    }

    Ok(result)
}
