//! Row-to-hierarchy resolution
//!
//! Each row is a fold over its present levels with the parent id as the
//! accumulator. An absent level leaves the accumulator untouched, so the next
//! present level attaches to the nearest preceding resolved term. A store
//! failure stops the fold for the rest of the row.

use crate::core::rows::{CsvRow, LevelEntry};
use crate::core::store::{StoreError, TermId, TermStore};

/// Result of a find-or-create lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Created(TermId),
    Existing(TermId),
}

impl Resolution {
    pub fn id(self) -> TermId {
        match self {
            Resolution::Created(id) | Resolution::Existing(id) => id,
        }
    }

    pub fn was_created(self) -> bool {
        matches!(self, Resolution::Created(_))
    }
}

/// Find the term `name` under `parent`, inserting it when missing
pub fn find_or_create_term<S: TermStore + ?Sized>(
    store: &mut S,
    name: &str,
    parent: TermId,
) -> Result<Resolution, StoreError> {
    if let Some(id) = store.term_exists(name, parent)? {
        return Ok(Resolution::Existing(id));
    }
    let slug = store.slugify(name);
    let id = store.insert_term(name, parent, &slug)?;
    Ok(Resolution::Created(id))
}

/// Counters contributed by a single row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowTally {
    pub created: usize,
    pub existing: usize,
}

impl RowTally {
    fn record(mut self, resolution: Resolution) -> Self {
        if resolution.was_created() {
            self.created += 1;
        } else {
            self.existing += 1;
        }
        self
    }
}

/// A level whose resolution failed, ending its row
#[derive(Debug)]
pub struct LevelFailure {
    /// Zero-based level index
    pub level: usize,
    pub name: String,
    pub error: StoreError,
}

/// What happened to one row
#[derive(Debug)]
pub struct RowOutcome {
    /// Counts for the levels that resolved before any failure
    pub tally: RowTally,
    /// Deepest term resolved in the row
    pub leaf: Option<TermId>,
    pub failure: Option<LevelFailure>,
}

impl RowOutcome {
    pub fn is_aborted(&self) -> bool {
        self.failure.is_some()
    }
}

/// Levels that take part in resolution, in order
pub fn present_levels(levels: &[LevelEntry]) -> impl Iterator<Item = &LevelEntry> {
    levels.iter().filter(|entry| !entry.is_absent())
}

/// Resolve every level of a row against the store
pub fn resolve_row<S: TermStore + ?Sized>(store: &mut S, row: &CsvRow) -> RowOutcome {
    resolve_levels(store, &row.levels())
}

/// Resolve a level list, starting from the top of the taxonomy
pub fn resolve_levels<S: TermStore + ?Sized>(store: &mut S, levels: &[LevelEntry]) -> RowOutcome {
    let start = (TermId::ROOT, RowTally::default());

    let folded = present_levels(levels).try_fold(start, |(parent, tally), entry| {
        resolve_level(store, entry, parent)
            .map(|resolution| (resolution.id(), tally.record(resolution)))
            .map_err(|(failure, resolution)| match resolution {
                // A description failure still counts the term it resolved
                Some(resolution) => (resolution.id(), tally.record(resolution), failure),
                None => (parent, tally, failure),
            })
    });

    let (leaf, tally, failure) = match folded {
        Ok((leaf, tally)) => (leaf, tally, None),
        Err((leaf, tally, failure)) => (leaf, tally, Some(failure)),
    };

    RowOutcome {
        tally,
        leaf: (!leaf.is_root()).then_some(leaf),
        failure,
    }
}

fn resolve_level<S: TermStore + ?Sized>(
    store: &mut S,
    entry: &LevelEntry,
    parent: TermId,
) -> Result<Resolution, (LevelFailure, Option<Resolution>)> {
    let failure = |error| LevelFailure {
        level: entry.level,
        name: entry.name.clone(),
        error,
    };

    let resolution =
        find_or_create_term(store, &entry.name, parent).map_err(|e| (failure(e), None))?;

    let description = entry.description.as_deref().map(str::trim);
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        store
            .update_description(resolution.id(), description)
            .map_err(|e| (failure(e), Some(resolution)))?;
    }

    Ok(resolution)
}
