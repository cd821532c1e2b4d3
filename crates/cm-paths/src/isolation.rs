//! Test-environment isolation
//!
//! Builds an ephemeral root under the system temporary directory from a
//! reference timestamp, deep-copies the source tree, and redirects its
//! filesystem locations into that root. The source tree is never mutated.
//!
//! Two modes exist and are never mixed per call: the default rewrites only
//! the designated base-directory field (everything else derives from it),
//! while [`IsolationMode::RelocateTree`] walks the whole copy for legacy
//! field sets that carry absolute paths outside the standard layout.

use crate::calendar::CalendarComponents;
use crate::walker::{relocate, RelocationReport};
use chrono::{Local, NaiveDateTime};
use cm_tree::ConfigValue;
use tracing::warn;

/// Literal segment between the temporary root and the per-run directories
pub const ISOLATION_SEGMENT: &str = "tests";

/// Designated base-location field rewritten by the default mode
pub const BASE_DIR_FIELD: &str = "base_dir";

/// How much of the copied tree gets redirected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationMode {
    /// Rewrite only the designated base-directory field
    #[default]
    BaseDirOnly,
    /// Additionally drive the relocation walk over the whole copy
    RelocateTree,
}

/// Result of one isolation run
#[derive(Debug, Clone)]
pub struct IsolationOutcome {
    /// The isolated deep copy
    pub tree: ConfigValue,
    /// Ephemeral root every relocated path descends from
    pub root: String,
    /// Walk report; present only in [`IsolationMode::RelocateTree`]
    pub report: Option<RelocationReport>,
}

/// Ephemeral root for `timestamp`: `<system temp>/tests/<yyyymmdd>/<hhmmss>`
///
/// Deterministic: equal timestamps always produce the same root, and
/// timestamps at least one second apart always differ.
#[must_use]
pub fn ephemeral_root(timestamp: NaiveDateTime) -> String {
    let calendar = CalendarComponents::from_timestamp(timestamp);
    std::env::temp_dir()
        .join(ISOLATION_SEGMENT)
        .join(CalendarComponents::date_compact(timestamp))
        .join(calendar.time)
        .to_string_lossy()
        .into_owned()
}

/// Isolate `source` for a test run
///
/// An unspecified `timestamp` defaults to now, captured once for this run.
/// Returns the copy and its ephemeral root; `source` stays untouched.
#[must_use]
pub fn isolate(
    source: &ConfigValue,
    timestamp: Option<NaiveDateTime>,
    mode: IsolationMode,
) -> IsolationOutcome {
    let timestamp = timestamp.unwrap_or_else(|| Local::now().naive_local());
    let root = ephemeral_root(timestamp);
    let marker = std::env::temp_dir().to_string_lossy().into_owned();

    let mut tree = source.clone();
    if tree
        .set_path(BASE_DIR_FIELD, ConfigValue::from(root.as_str()))
        .is_err()
    {
        // A scalar or sequence at the top level has no base-dir slot; the
        // copy is still returned so the caller can decide what to do.
        warn!("source tree has no mapping root, base dir not rewritten");
    }

    let report = match mode {
        IsolationMode::BaseDirOnly => None,
        IsolationMode::RelocateTree => Some(relocate(&mut tree, &root, &marker)),
    };

    IsolationOutcome { tree, root, report }
}
