//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the marker directory that holds configuration and the store
pub const PROJECT_DIR: &str = ".taxo";

/// Represents a taxonomy project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .taxo/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project at the given path
    ///
    /// With `force`, an existing `.taxo/config.yaml` is rewritten. The term
    /// store is never touched here.
    pub fn init(path: &Path, force: bool) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let taxo_dir = root.join(PROJECT_DIR);
        if taxo_dir.exists() && !force {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(&taxo_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(taxo_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Taxonomy Importer Project Configuration

# Taxonomy that imported terms belong to
taxonomy: product_cat

# Term store location, relative to the project root
# store: .taxo/terms.db

# Column layout of import files (names, described)
# layout: names

# Whether the first CSV row is a header
# has_header: true
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .taxo configuration directory
    pub fn taxo_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Resolve a path from configuration against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a taxonomy project (searched from {searched_from:?}). Run 'taxo init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("taxonomy project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
