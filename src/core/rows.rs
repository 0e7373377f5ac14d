//! CSV row normalization
//!
//! Turns a CSV stream into fixed-width rows: the optional header record is
//! discarded, every record is padded or truncated to the layout's width, and
//! records whose fields are all empty are skipped.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use clap::ValueEnum;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use serde::{Deserialize, Serialize};

use crate::core::importer::ImportError;

/// Number of hierarchy levels a row can describe
pub const LEVELS: usize = 6;

/// Column layout of an import file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `level_1..level_6`
    #[default]
    Names,
    /// `level_1,level_1_desc,...,level_6,level_6_desc`
    Described,
}

impl Layout {
    /// Columns used by each level
    pub const fn fields_per_level(self) -> usize {
        match self {
            Layout::Names => 1,
            Layout::Described => 2,
        }
    }

    /// Total columns of a normalized row
    pub const fn width(self) -> usize {
        LEVELS * self.fields_per_level()
    }

    /// Header names for this layout, in column order
    pub fn headers(self) -> Vec<String> {
        (1..=LEVELS)
            .flat_map(|level| match self {
                Layout::Names => vec![format!("level_{}", level)],
                Layout::Described => {
                    vec![format!("level_{}", level), format!("level_{}_desc", level)]
                }
            })
            .collect()
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Names => write!(f, "names"),
            Layout::Described => write!(f, "described"),
        }
    }
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "names" | "name" => Ok(Layout::Names),
            "described" | "desc" => Ok(Layout::Described),
            _ => Err(format!("Unknown layout: '{}'. Supported: names, described", s)),
        }
    }
}

/// One hierarchy position of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelEntry {
    /// Zero-based level index
    pub level: usize,
    /// Name with surrounding whitespace removed; empty means absent
    pub name: String,
    /// Description column, `None` for the names-only layout
    pub description: Option<String>,
}

impl LevelEntry {
    pub fn is_absent(&self) -> bool {
        self.name.is_empty()
    }
}

/// A record padded or truncated to exactly the layout width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    layout: Layout,
    fields: Vec<String>,
}

impl CsvRow {
    /// Normalize raw fields; `None` when every field is empty
    pub fn normalize<I, S>(fields: I, layout: Layout) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let width = layout.width();
        let mut fields: Vec<String> = fields.into_iter().take(width).map(Into::into).collect();
        fields.resize(width, String::new());

        if fields.iter().all(|f| f.is_empty()) {
            return None;
        }
        Some(Self { layout, fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Split the row into its level entries, absent levels included
    pub fn levels(&self) -> Vec<LevelEntry> {
        let step = self.layout.fields_per_level();
        (0..LEVELS)
            .map(|level| {
                let base = level * step;
                let description = match self.layout {
                    Layout::Names => None,
                    Layout::Described => Some(self.fields[base + 1].clone()),
                };
                LevelEntry {
                    level,
                    name: self.fields[base].trim().to_string(),
                    description,
                }
            })
            .collect()
    }
}

/// A normalized row with the line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub line: u64,
    pub row: CsvRow,
}

/// Outcome of reading one record
#[derive(Debug)]
pub enum RowItem {
    Row(SourceRow),
    /// The record could not be decoded; carries the line and reason
    Malformed { line: u64, reason: String },
}

/// Lazy sequence of normalized rows over a CSV stream
pub struct RowReader<R> {
    records: StringRecordsIntoIter<R>,
    layout: Layout,
    skip_header: bool,
    first: bool,
    failed: bool,
}

impl RowReader<BufReader<File>> {
    /// Open a CSV file for normalization
    pub fn open(path: &Path, layout: Layout, has_header: bool) -> Result<Self, ImportError> {
        if !path.exists() {
            return Err(ImportError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| ImportError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file), layout, has_header))
    }
}

impl<R: Read> RowReader<R> {
    /// Wrap a CSV stream
    ///
    /// Empty lines are dropped by the CSV reader before a record is formed, so
    /// with `has_header` the first non-empty line is the one discarded. A
    /// leading empty line never takes the header's place.
    pub fn from_reader(reader: R, layout: Layout, has_header: bool) -> Self {
        let records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader)
            .into_records();

        Self {
            records,
            layout,
            skip_header: has_header,
            first: true,
            failed: false,
        }
    }

    fn next_record(&mut self) -> Option<Result<StringRecord, csv::Error>> {
        if self.skip_header {
            self.skip_header = false;
            self.first = false;
            // A header that fails to decode is still discarded; a failed read is not
            match self.records.next()? {
                Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => {
                    return Some(Err(err));
                }
                _ => {}
            }
        }
        self.records.next()
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<RowItem, std::io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let record = match self.next_record()? {
                Ok(record) => record,
                Err(err) => {
                    let line = err.position().map(|p| p.line()).unwrap_or(0);
                    if let csv::ErrorKind::Io(_) = err.kind() {
                        self.failed = true;
                        return match err.into_kind() {
                            csv::ErrorKind::Io(io) => Some(Err(io)),
                            _ => None,
                        };
                    }
                    self.first = false;
                    return Some(Ok(RowItem::Malformed {
                        line,
                        reason: err.to_string(),
                    }));
                }
            };

            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let strip_bom = std::mem::replace(&mut self.first, false);
            let fields = record.iter().enumerate().map(|(i, field)| {
                if strip_bom && i == 0 {
                    field.trim_start_matches('\u{feff}')
                } else {
                    field
                }
            });

            if let Some(row) = CsvRow::normalize(fields, self.layout) {
                return Some(Ok(RowItem::Row(SourceRow { line, row })));
            }
        }
    }
}
