use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use trellis_editor::{ClassPalette, DropZones, ElementDefaults, MutationEngine, PendingEdits};
use trellis_evaluator::{
    ComponentCache, ComponentCatalog, ComponentFamily, ComponentResolver, Environment, ModuleResolver,
};

pub const DEFAULT_CONFIG_NAME: &str = "trellis.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Trellis configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Pointer bands used to turn drop coordinates into positions
    #[serde(default)]
    pub drop_zones: DropZones,

    /// Quiet period before a property edit is committed
    #[serde(default = "default_edit_debounce_ms")]
    pub edit_debounce_ms: u64,

    /// Class tokens given to newly added elements, per element type
    #[serde(default = "ClassPalette::standard")]
    pub class_palette: ClassPalette,

    /// Extra packages components may be imported from
    #[serde(default)]
    pub allowed_packages: IndexMap<String, ComponentFamily>,

    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,
}

fn default_edit_debounce_ms() -> u64 {
    300
}

fn default_undo_levels() -> usize {
    100
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> Result<Self, ConfigError> {
        Self::load_from(&PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME))
    }

    /// Load an explicit config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.edit_debounce_ms)
    }

    pub fn pending_edits(&self) -> PendingEdits {
        PendingEdits::new(self.quiescence())
    }

    pub fn engine(&self) -> MutationEngine {
        MutationEngine::new(ElementDefaults::standard().with_palette(self.class_palette.clone()))
    }

    /// Standard packages plus the configured ones
    pub fn environment(&self) -> Environment {
        let mut modules = ModuleResolver::standard();
        for (package, family) in &self.allowed_packages {
            modules.allow(package.clone(), *family);
        }
        Environment::new(ComponentCatalog::standard(), modules)
    }

    pub fn resolver(&self) -> ComponentResolver {
        ComponentResolver::with_cache(self.environment(), ComponentCache::global())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            drop_zones: DropZones::default(),
            edit_debounce_ms: default_edit_debounce_ms(),
            class_palette: ClassPalette::standard(),
            allowed_packages: IndexMap::new(),
            undo_levels: default_undo_levels(),
        }
    }
}
