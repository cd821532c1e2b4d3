//! Settings facade interface
//!
//! The engine never owns the persisted configuration; it reads its five
//! layout inputs and the reference timestamp through [`SettingsSource`] and
//! pushes derived paths back through it. Loading, saving, watching, and
//! autosave live entirely behind this trait.
//!
//! [`InMemorySettings`] is the plain tree-backed implementation used by
//! tests and by embedders that manage persistence themselves.

use crate::error::{PathsError, Result};
use crate::layout::LayoutDescriptor;
use chrono::NaiveDateTime;
use cm_tree::ConfigValue;
use parking_lot::RwLock;

/// Field holding the designated base directory
pub const FIELD_BASE_DIR: &str = "base_dir";
/// Field holding the project name
pub const FIELD_PROJECT_NAME: &str = "project_name";
/// Field holding the experiment name
pub const FIELD_EXPERIMENT_NAME: &str = "experiment_name";
/// Field holding the debug flag
pub const FIELD_DEBUG_MODE: &str = "debug_mode";
/// Field holding the reference timestamp, set once at process start
pub const FIELD_FIRST_START_TIME: &str = "first_start_time";

/// Namespace the derived path map is written back under
pub const PATHS_NAMESPACE: &str = "paths";

/// Read/write surface the engine needs from the settings facade
pub trait SettingsSource: Send + Sync {
    /// The designated base-directory node (string or per-family mapping)
    ///
    /// # Errors
    /// [`PathsError::MissingSetting`] when the field is absent.
    fn base_dir(&self) -> Result<ConfigValue>;

    /// Project name segment
    ///
    /// # Errors
    /// [`PathsError::MissingSetting`] when the field is absent.
    fn project_name(&self) -> Result<String>;

    /// Experiment name segment
    ///
    /// # Errors
    /// [`PathsError::MissingSetting`] when the field is absent.
    fn experiment_name(&self) -> Result<String>;

    /// Debug flag; absent reads as production mode
    fn debug_mode(&self) -> bool;

    /// Stable reference timestamp, if one was recorded
    fn reference_timestamp(&self) -> Option<NaiveDateTime>;

    /// Deep copy of the full configuration tree (isolation input)
    fn snapshot(&self) -> ConfigValue;

    /// Replace the full configuration tree (isolation output)
    fn replace(&self, tree: ConfigValue);

    /// Store one derived path under the paths namespace
    fn store_derived(&self, key: &str, value: &str);

    /// Store the whole derived path map
    fn write_back(&self, layout: &LayoutDescriptor) {
        self.store_derived("work_dir", &layout.work_dir);
        self.store_derived("checkpoint_dir", &layout.checkpoint_dir);
        self.store_derived("best_checkpoint_dir", &layout.best_checkpoint_dir);
        self.store_derived("debug_dir", &layout.debug_dir);
        self.store_derived("log_dir", &layout.log_dir);
        self.store_derived("backup_dir", &layout.backup_dir);
    }
}

/// Tree-backed settings with no persistence
#[derive(Debug, Default)]
pub struct InMemorySettings {
    tree: RwLock<ConfigValue>,
}

impl InMemorySettings {
    /// Wrap an existing tree
    #[must_use]
    pub fn new(tree: ConfigValue) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    /// Parse a YAML document into settings
    ///
    /// # Errors
    /// [`cm_tree::TreeError`] on invalid YAML.
    pub fn from_yaml(text: &str) -> std::result::Result<Self, cm_tree::TreeError> {
        Ok(Self::new(ConfigValue::from_yaml_str(text)?))
    }

    /// Read a dotted path, cloning the node
    #[must_use]
    pub fn get(&self, path: &str) -> Option<ConfigValue> {
        self.tree.read().get_path(path).cloned()
    }

    /// Write a dotted path, creating intermediate mappings
    ///
    /// # Errors
    /// [`cm_tree::TreeError`] when an intermediate node is not a mapping.
    pub fn set(
        &self,
        path: &str,
        value: ConfigValue,
    ) -> std::result::Result<(), cm_tree::TreeError> {
        self.tree.write().set_path(path, value)
    }

    fn required_string(&self, field: &str) -> Result<String> {
        self.get(field)
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| PathsError::missing_setting(field))
    }
}

impl SettingsSource for InMemorySettings {
    fn base_dir(&self) -> Result<ConfigValue> {
        self.get(FIELD_BASE_DIR)
            .ok_or_else(|| PathsError::missing_setting(FIELD_BASE_DIR))
    }

    fn project_name(&self) -> Result<String> {
        self.required_string(FIELD_PROJECT_NAME)
    }

    fn experiment_name(&self) -> Result<String> {
        self.required_string(FIELD_EXPERIMENT_NAME)
    }

    fn debug_mode(&self) -> bool {
        self.get(FIELD_DEBUG_MODE)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn reference_timestamp(&self) -> Option<NaiveDateTime> {
        match self.get(FIELD_FIRST_START_TIME)? {
            ConfigValue::Timestamp(t) => Some(t),
            ConfigValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn snapshot(&self) -> ConfigValue {
        self.tree.read().clone()
    }

    fn replace(&self, tree: ConfigValue) {
        *self.tree.write() = tree;
    }

    fn store_derived(&self, key: &str, value: &str) {
        let path = format!("{PATHS_NAMESPACE}.{key}");
        // The namespace root is a mapping we own; the write only fails if a
        // caller stored a scalar at `paths`, and then the value is dropped.
        let _ = self.set(&path, ConfigValue::from(value));
    }
}
