//! Error types for the path engine
//!
//! Two hard errors propagate out of this crate: a dual value missing both
//! the requested family and the Windows fallback, and a direct write to a
//! computed path key. Everything else is either total by construction
//! (classification, calendar math) or a soft skip logged by the walker.

use crate::accessor::PathKey;
use crate::platform::OsFamily;

/// Errors from platform-specific value selection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// A per-family map lacks both the requested family and the Windows
    /// fallback entry
    #[error("field '{field}' has no path for platform '{family}' and no windows fallback")]
    MissingPlatformPath {
        /// Field the value came from
        field: String,
        /// Family that was requested
        family: OsFamily,
    },

    /// The tree node is neither a string nor a per-family mapping
    #[error("field '{field}' is not a platform path value")]
    InvalidValue {
        /// Field the value came from
        field: String,
    },
}

impl PlatformError {
    /// Missing-platform error for a field/family pair
    pub fn missing(field: impl Into<String>, family: OsFamily) -> Self {
        Self::MissingPlatformPath {
            field: field.into(),
            family,
        }
    }
}

/// Combined engine error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathsError {
    /// Direct write to a computed path key
    #[error("'{key}' is computed from the layout and cannot be written directly")]
    ImmutablePropertyWrite {
        /// The key the write targeted
        key: PathKey,
    },

    /// A required layout input is absent from the settings source
    #[error("required setting '{field}' is missing")]
    MissingSetting {
        /// Name of the absent setting
        field: String,
    },

    /// Platform selection failed
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl PathsError {
    /// Missing-setting error for a field name
    pub fn missing_setting(field: impl Into<String>) -> Self {
        Self::MissingSetting {
            field: field.into(),
        }
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, PathsError>;
