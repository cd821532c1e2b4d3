//! Process-wide engine registry
//!
//! One engine per resolved configuration-file path, shared across the
//! process. The lifecycle is explicit: `get_or_create` materializes,
//! `reset` drops one entry, `clear` drops everything (test teardown).
//! The registry is the only process-level state in this crate.

use crate::accessor::DerivedPaths;
use crate::facade::SettingsSource;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static GLOBAL: Lazy<EngineRegistry> = Lazy::new(EngineRegistry::new);

/// Engines keyed by resolved configuration path
#[derive(Debug, Default)]
pub struct EngineRegistry {
    engines: DashMap<PathBuf, Arc<DerivedPaths>>,
}

impl EngineRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            engines: DashMap::new(),
        }
    }

    /// The process-wide registry
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Engine for `config_path`, creating one from `settings` on first use
    ///
    /// Relative paths resolve against the current working directory; the
    /// file does not have to exist.
    pub fn get_or_create<F>(&self, config_path: &Path, settings: F) -> Arc<DerivedPaths>
    where
        F: FnOnce() -> Arc<dyn SettingsSource>,
    {
        let key = Self::resolve(config_path);
        self.engines
            .entry(key)
            .or_insert_with(|| Arc::new(DerivedPaths::new(settings())))
            .clone()
    }

    /// Already-registered engine for `config_path`, if any
    #[must_use]
    pub fn get(&self, config_path: &Path) -> Option<Arc<DerivedPaths>> {
        self.engines
            .get(&Self::resolve(config_path))
            .map(|e| e.clone())
    }

    /// Drop the engine for `config_path`; returns whether one existed
    pub fn reset(&self, config_path: &Path) -> bool {
        self.engines.remove(&Self::resolve(config_path)).is_some()
    }

    /// Drop every engine (test teardown)
    pub fn clear(&self) {
        self.engines.clear();
    }

    /// Number of live engines
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// True when no engine is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Lexical resolution only: no filesystem access, so engines can be
    /// registered before their config file exists
    fn resolve(path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    }
}
