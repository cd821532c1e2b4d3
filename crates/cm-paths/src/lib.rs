//! Configuration path engine
//!
//! Dynamic path resolution and test-environment isolation over a persisted
//! configuration tree. The engine derives a standardized directory layout
//! from five base settings, selects per-OS-family path representations,
//! computes ISO-week calendar segments with short-lived caching, and
//! relocates path-like fields into an ephemeral root for isolated test
//! runs while protecting network endpoints, headers, and patterns.
//!
//! # Architecture
//!
//! ```text
//! SettingsSource ──► DerivedPaths ──► DerivedPathCache (1 s TTL)
//!                        │                  │
//!                        │            StandardLayoutBuilder
//!                        │                  │
//!                        │            CalendarComponents + DualValue
//!                        │
//!                        └──► isolate() ──► FieldClassifier ──► Relocator
//! ```
//!
//! Everything here is synchronous and near-pure: no threads, no I/O, no
//! directory creation. The settings facade (load/save, watching, autosave)
//! stays behind the [`facade::SettingsSource`] trait.
//!
//! # Example
//!
//! ```rust
//! use cm_paths::facade::InMemorySettings;
//! use cm_paths::platform::OsFamily;
//! use cm_paths::DerivedPaths;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), cm_paths::PathsError> {
//! let settings = Arc::new(InMemorySettings::from_yaml(
//!     "base_dir: /srv/app\n\
//!      project_name: proj\n\
//!      experiment_name: exp1\n\
//!      first_start_time: '2025-01-07T18:15:20'\n",
//! ).expect("valid yaml"));
//!
//! let engine = DerivedPaths::with_family(settings, OsFamily::UnixLike);
//! assert_eq!(engine.work_dir()?, "/srv/app/proj/exp1");
//! assert_eq!(engine.tensorboard_dir()?, engine.tsb_logs_dir()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod accessor;
pub mod cache;
pub mod calendar;
pub mod classify;
pub mod error;
pub mod facade;
pub mod isolation;
pub mod layout;
pub mod platform;
pub mod registry;
pub mod walker;

pub use accessor::{DerivedPaths, PathKey};
pub use calendar::CalendarComponents;
pub use classify::Classification;
pub use error::{PathsError, PlatformError, Result};
pub use isolation::{IsolationMode, IsolationOutcome};
pub use layout::{LayoutDescriptor, LayoutInputs};
pub use platform::{DualValue, OsFamily};
pub use registry::EngineRegistry;
pub use walker::RelocationReport;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the path engine
    pub use crate::accessor::{DerivedPaths, PathKey};
    pub use crate::classify::{classify, Classification};
    pub use crate::error::{PathsError, PlatformError, Result};
    pub use crate::facade::{InMemorySettings, SettingsSource};
    pub use crate::isolation::{isolate, IsolationMode};
    pub use crate::layout::{build_layout, LayoutInputs};
    pub use crate::platform::{DualValue, OsFamily};
    pub use cm_tree::ConfigValue;
}
