//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::rows::Layout;
use crate::core::Project;

/// Taxonomy used when none is configured
pub const DEFAULT_TAXONOMY: &str = "product_cat";

/// Store location used when none is configured, relative to the project root
pub const DEFAULT_STORE: &str = ".taxo/terms.db";

/// Importer configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Taxonomy that imported terms belong to
    pub taxonomy: Option<String>,

    /// Term store path
    pub store: Option<PathBuf>,

    /// Default column layout of import files
    pub layout: Option<Layout>,

    /// Whether import files start with a header row
    pub has_header: Option<bool>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (applied by the accessors)

        // 2. Global user config (~/.config/taxo/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.taxo/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.taxo_dir().join("config.yaml"))
            {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        config.merge(Self::from_env());

        config
    }

    /// Parse a config file, ignoring missing or malformed files
    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    fn from_env() -> Config {
        Config {
            taxonomy: std::env::var("TAXO_TAXONOMY").ok().filter(|s| !s.is_empty()),
            store: std::env::var_os("TAXO_STORE").map(PathBuf::from),
            layout: std::env::var("TAXO_LAYOUT").ok().and_then(|s| s.parse().ok()),
            has_header: None,
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "taxo")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.taxonomy.is_some() {
            self.taxonomy = other.taxonomy;
        }
        if other.store.is_some() {
            self.store = other.store;
        }
        if other.layout.is_some() {
            self.layout = other.layout;
        }
        if other.has_header.is_some() {
            self.has_header = other.has_header;
        }
    }

    pub fn taxonomy(&self) -> &str {
        self.taxonomy.as_deref().unwrap_or(DEFAULT_TAXONOMY)
    }

    /// Store path as configured, not yet resolved against the project root
    pub fn store(&self) -> &Path {
        self.store.as_deref().unwrap_or(Path::new(DEFAULT_STORE))
    }

    pub fn layout(&self) -> Layout {
        self.layout.unwrap_or_default()
    }

    pub fn has_header(&self) -> bool {
        self.has_header.unwrap_or(true)
    }
}
