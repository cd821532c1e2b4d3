//! Derived-path accessor surface
//!
//! [`DerivedPaths`] is what the settings facade holds: every standard
//! directory as a freshly-derived (≤1 s stale) native-separator string.
//! Keys carry an explicit computed marker instead of relying on attribute
//! interception: a computed key is derived on every read and rejects
//! writes. `tensorboard_dir` resolves through the same build as
//! `tsb_logs_dir`, so the two can never drift apart.

use crate::cache::{DerivedPathCache, OwnerId};
use crate::error::{PathsError, Result};
use crate::facade::SettingsSource;
use crate::isolation::{isolate, IsolationMode, IsolationOutcome};
use crate::layout::{build_layout, LayoutDescriptor, LayoutInputs};
use crate::platform::{to_dual, DualValue, OsFamily};
use chrono::{Local, NaiveDateTime};
use cm_tree::ConfigValue;
use std::fmt;
use std::sync::Arc;

/// Addressable derived paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKey {
    /// `base[/debug]/project/experiment`
    WorkDir,
    /// Checkpoint directory under work
    CheckpointDir,
    /// Best-checkpoint directory under checkpoint
    BestCheckpointDir,
    /// Debug directory under work
    DebugDir,
    /// Time-series log directory (computed, never stored)
    TsbLogsDir,
    /// Plain log directory
    LogDir,
    /// Backup directory
    BackupDir,
    /// Read-only mirror of [`PathKey::TsbLogsDir`]
    TensorboardDir,
}

impl PathKey {
    /// Every key, in layout order
    pub const ALL: [Self; 8] = [
        Self::WorkDir,
        Self::CheckpointDir,
        Self::BestCheckpointDir,
        Self::DebugDir,
        Self::TsbLogsDir,
        Self::LogDir,
        Self::BackupDir,
        Self::TensorboardDir,
    ];

    /// Field name of this key
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WorkDir => "work_dir",
            Self::CheckpointDir => "checkpoint_dir",
            Self::BestCheckpointDir => "best_checkpoint_dir",
            Self::DebugDir => "debug_dir",
            Self::TsbLogsDir => "tsb_logs_dir",
            Self::LogDir => "log_dir",
            Self::BackupDir => "backup_dir",
            Self::TensorboardDir => "tensorboard_dir",
        }
    }

    /// Computed keys are derived on every read and reject writes
    #[must_use]
    pub fn is_computed(self) -> bool {
        matches!(self, Self::TsbLogsDir | Self::TensorboardDir)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engine instance the settings facade drives
pub struct DerivedPaths {
    settings: Arc<dyn SettingsSource>,
    family: OsFamily,
    owner: OwnerId,
    cache: DerivedPathCache,
    /// Captured at construction; used when the settings carry no reference
    /// timestamp so calendar-derived paths stay stable within one run
    fallback_timestamp: NaiveDateTime,
}

impl DerivedPaths {
    /// Engine over `settings` for the host family
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsSource>) -> Self {
        Self::with_family(settings, OsFamily::current())
    }

    /// Engine pinned to a specific family (tests, cross-family tooling)
    #[must_use]
    pub fn with_family(settings: Arc<dyn SettingsSource>, family: OsFamily) -> Self {
        Self {
            settings,
            family,
            owner: OwnerId::next(),
            cache: DerivedPathCache::new(),
            fallback_timestamp: Local::now().naive_local(),
        }
    }

    /// Family this engine selects dual values for
    #[must_use]
    pub fn family(&self) -> OsFamily {
        self.family
    }

    fn inputs(&self) -> Result<LayoutInputs> {
        let base_node = self.settings.base_dir()?;
        let dual = DualValue::from_tree("base_dir", &base_node)?;
        let base_dir = dual.select("base_dir", self.family)?.to_string();

        Ok(LayoutInputs {
            base_dir,
            project_name: self.settings.project_name()?,
            experiment_name: self.settings.experiment_name()?,
            debug: self.settings.debug_mode(),
            timestamp: self
                .settings
                .reference_timestamp()
                .unwrap_or(self.fallback_timestamp),
        })
    }

    /// Current layout, rebuilt when the cached slot is older than the TTL
    ///
    /// # Errors
    /// Propagates missing settings and platform-selection failures.
    pub fn descriptor(&self) -> Result<Arc<LayoutDescriptor>> {
        self.cache.get_or_build(self.owner, || {
            Ok(build_layout(&self.inputs()?, self.family))
        })
    }

    /// Read one derived path
    ///
    /// [`PathKey::TensorboardDir`] resolves through [`PathKey::TsbLogsDir`]:
    /// same recomputation, no independent cache slot.
    ///
    /// # Errors
    /// Propagates missing settings and platform-selection failures.
    pub fn get(&self, key: PathKey) -> Result<String> {
        let layout = self.descriptor()?;
        let path = match key {
            PathKey::WorkDir => &layout.work_dir,
            PathKey::CheckpointDir => &layout.checkpoint_dir,
            PathKey::BestCheckpointDir => &layout.best_checkpoint_dir,
            PathKey::DebugDir => &layout.debug_dir,
            PathKey::TsbLogsDir | PathKey::TensorboardDir => &layout.tsb_logs_dir,
            PathKey::LogDir => &layout.log_dir,
            PathKey::BackupDir => &layout.backup_dir,
        };
        Ok(path.clone())
    }

    /// Write one derived path back to the settings
    ///
    /// # Errors
    /// [`PathsError::ImmutablePropertyWrite`] for computed keys.
    pub fn set(&self, key: PathKey, value: &str) -> Result<()> {
        if key.is_computed() {
            return Err(PathsError::ImmutablePropertyWrite { key });
        }
        self.settings.store_derived(key.as_str(), value);
        Ok(())
    }

    /// `work_dir` as a native-separator string
    pub fn work_dir(&self) -> Result<String> {
        self.get(PathKey::WorkDir)
    }

    /// `checkpoint_dir`
    pub fn checkpoint_dir(&self) -> Result<String> {
        self.get(PathKey::CheckpointDir)
    }

    /// `best_checkpoint_dir`
    pub fn best_checkpoint_dir(&self) -> Result<String> {
        self.get(PathKey::BestCheckpointDir)
    }

    /// `debug_dir`
    pub fn debug_dir(&self) -> Result<String> {
        self.get(PathKey::DebugDir)
    }

    /// `tsb_logs_dir`, dynamically computed
    pub fn tsb_logs_dir(&self) -> Result<String> {
        self.get(PathKey::TsbLogsDir)
    }

    /// `log_dir`
    pub fn log_dir(&self) -> Result<String> {
        self.get(PathKey::LogDir)
    }

    /// `backup_dir`
    pub fn backup_dir(&self) -> Result<String> {
        self.get(PathKey::BackupDir)
    }

    /// Read-only mirror of [`Self::tsb_logs_dir`]
    pub fn tensorboard_dir(&self) -> Result<String> {
        self.get(PathKey::TensorboardDir)
    }

    /// Per-family form of the stored base directory
    ///
    /// A scalar goes through single-to-dual conversion; a map is returned
    /// as-is. Conversion is restricted to the designated base-directory
    /// field.
    ///
    /// # Errors
    /// Propagates a missing or malformed base-directory setting.
    pub fn dual_base_dir(&self) -> Result<DualValue> {
        let node = self.settings.base_dir()?;
        Ok(match DualValue::from_tree("base_dir", &node)? {
            DualValue::Single(s) => to_dual(&s),
            dual @ DualValue::PerFamily { .. } => dual,
        })
    }

    /// Apply dual-value selection to any tree node, not only the layout
    ///
    /// # Errors
    /// Propagates platform-selection failures for the node.
    pub fn select_platform_value(&self, field: &str, node: &ConfigValue) -> Result<String> {
        let dual = DualValue::from_tree(field, node)?;
        Ok(dual.select(field, self.family)?.to_string())
    }

    /// Push the current derived map into the settings
    ///
    /// # Errors
    /// Propagates layout-build failures.
    pub fn write_back(&self) -> Result<()> {
        let layout = self.descriptor()?;
        self.settings.write_back(&layout);
        Ok(())
    }

    /// Drop the cached layout so the next read rebuilds
    ///
    /// The facade calls this after changing any of the five inputs.
    pub fn invalidate(&self) {
        self.cache.invalidate(self.owner);
    }

    /// Diagnostic snapshot: selected family and the current layout, if it
    /// can be built
    #[must_use]
    pub fn info(&self) -> serde_json::Value {
        let layout = self
            .descriptor()
            .ok()
            .and_then(|l| serde_json::to_value(&*l).ok());
        serde_json::json!({
            "family": self.family.as_key(),
            "layout": layout,
        })
    }

    /// Isolate the facade's tree for a test run
    ///
    /// Copies the current snapshot; the live settings are not touched.
    #[must_use]
    pub fn isolate(
        &self,
        timestamp: Option<NaiveDateTime>,
        mode: IsolationMode,
    ) -> IsolationOutcome {
        isolate(&self.settings.snapshot(), timestamp, mode)
    }
}

impl fmt::Debug for DerivedPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedPaths")
            .field("family", &self.family)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}
