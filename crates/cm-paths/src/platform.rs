//! OS-family classification and dual-value selection
//!
//! A configuration value that holds a filesystem location may be written
//! either as one string or as a per-family map, so one logical setting can
//! differ between Windows and Unix-like hosts. This module classifies the
//! host, selects the right entry with a Windows fallback, and converts a
//! single path into the per-family form. Conversion applies to exactly one
//! field, the designated base directory; every other setting keeps the
//! shape it was written in.

use crate::error::PlatformError;
use cm_tree::ConfigValue;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default base-directory root substituted for a Windows entry that was not
/// written by the user
pub const DEFAULT_WINDOWS_ROOT: &str = "d:\\logs";

/// Default base-directory root substituted for a Unix entry that was not
/// written by the user
pub const DEFAULT_UNIX_ROOT: &str = "~/logs";

static DRIVE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]:([\\/]|$)").expect("valid drive-prefix pattern"));

/// Supported operating-system families
///
/// Scope is deliberately two families; anything unrecognized falls back to
/// [`OsFamily::UnixLike`] rather than blocking startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsFamily {
    /// Windows hosts
    #[serde(rename = "windows")]
    Windows,
    /// Everything else (Linux, macOS, BSDs)
    #[serde(rename = "unix")]
    UnixLike,
}

impl OsFamily {
    /// Family of the host this process runs on; never fails
    #[inline]
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::UnixLike
        }
    }

    /// Canonical key for this family in a per-family config map
    #[inline]
    #[must_use]
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::UnixLike => "unix",
        }
    }

    /// Native path separator for this family
    #[inline]
    #[must_use]
    pub fn separator(self) -> char {
        match self {
            Self::Windows => '\\',
            Self::UnixLike => '/',
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// A value that is either one path string or a per-family pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DualValue {
    /// One string shared by every family
    Single(String),
    /// Per-family entries; either side may be absent until conversion
    PerFamily {
        /// Windows entry
        windows: Option<String>,
        /// Unix-like entry
        unix_like: Option<String>,
    },
}

impl DualValue {
    /// Parse a dual value out of a configuration tree node
    ///
    /// Accepts a string scalar or a mapping with the canonical family keys.
    ///
    /// # Errors
    /// [`PlatformError::InvalidValue`] for any other node shape.
    pub fn from_tree(field: &str, node: &ConfigValue) -> Result<Self, PlatformError> {
        match node {
            ConfigValue::String(s) => Ok(Self::Single(s.clone())),
            ConfigValue::Mapping(map) => {
                let entry = |key: &str| {
                    map.get(key)
                        .and_then(ConfigValue::as_str)
                        .map(str::to_string)
                };
                Ok(Self::PerFamily {
                    windows: entry(OsFamily::Windows.as_key()),
                    unix_like: entry(OsFamily::UnixLike.as_key()),
                })
            }
            _ => Err(PlatformError::InvalidValue {
                field: field.to_string(),
            }),
        }
    }

    /// Select the string for `family`
    ///
    /// A single value is returned unchanged. A per-family value resolves to
    /// the requested entry, then to the Windows entry as fallback.
    ///
    /// # Errors
    /// [`PlatformError::MissingPlatformPath`] when both entries are absent
    /// (including the empty-map case).
    pub fn select(&self, field: &str, family: OsFamily) -> Result<&str, PlatformError> {
        match self {
            Self::Single(s) => Ok(s),
            Self::PerFamily { windows, unix_like } => {
                let requested = match family {
                    OsFamily::Windows => windows.as_deref(),
                    OsFamily::UnixLike => unix_like.as_deref(),
                };
                requested
                    .or(windows.as_deref())
                    .ok_or_else(|| PlatformError::missing(field, family))
            }
        }
    }

    /// Render as a configuration tree node
    #[must_use]
    pub fn to_tree(&self) -> ConfigValue {
        match self {
            Self::Single(s) => ConfigValue::from(s.as_str()),
            Self::PerFamily { windows, unix_like } => {
                let mut map = cm_tree::Mapping::new();
                if let Some(w) = windows {
                    map.insert(OsFamily::Windows.as_key().to_string(), w.as_str().into());
                }
                if let Some(u) = unix_like {
                    map.insert(OsFamily::UnixLike.as_key().to_string(), u.as_str().into());
                }
                ConfigValue::Mapping(map)
            }
        }
    }
}

/// Guess which family a path string was written for
///
/// Backslash-only separators, drive prefixes, and UNC shapes read as
/// Windows; everything else reads as Unix-like.
#[must_use]
pub fn detect_path_family(path: &str) -> OsFamily {
    if path.is_empty() {
        return OsFamily::current();
    }
    if path.contains('\\') && !path.contains('/') {
        return OsFamily::Windows;
    }
    if path.starts_with("\\\\") || DRIVE_PREFIX.is_match(path) {
        return OsFamily::Windows;
    }
    if path.contains('/') {
        return OsFamily::UnixLike;
    }
    OsFamily::current()
}

/// Convert a single path into a fully-populated per-family pair
///
/// The detected source family keeps the original string; the other family
/// receives its fixed default root. Never fails; an empty input yields the
/// defaults on both sides. Only the designated base-directory field goes
/// through this conversion.
#[must_use]
pub fn to_dual(path: &str) -> DualValue {
    if path.is_empty() {
        return DualValue::PerFamily {
            windows: Some(DEFAULT_WINDOWS_ROOT.to_string()),
            unix_like: Some(DEFAULT_UNIX_ROOT.to_string()),
        };
    }

    match detect_path_family(path) {
        OsFamily::Windows => DualValue::PerFamily {
            windows: Some(path.to_string()),
            unix_like: Some(DEFAULT_UNIX_ROOT.to_string()),
        },
        OsFamily::UnixLike => DualValue::PerFamily {
            windows: Some(DEFAULT_WINDOWS_ROOT.to_string()),
            unix_like: Some(path.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_tree::Mapping;
    use pretty_assertions::assert_eq;

    fn per_family(windows: Option<&str>, unix_like: Option<&str>) -> DualValue {
        DualValue::PerFamily {
            windows: windows.map(str::to_string),
            unix_like: unix_like.map(str::to_string),
        }
    }

    #[test]
    fn scalar_selects_unchanged_for_both_families() {
        let value = DualValue::Single("/data/logs".to_string());
        assert_eq!(value.select("base_dir", OsFamily::Windows).unwrap(), "/data/logs");
        assert_eq!(value.select("base_dir", OsFamily::UnixLike).unwrap(), "/data/logs");
    }

    #[test]
    fn map_selects_requested_family() {
        let value = per_family(Some("d:\\logs"), Some("/var/logs"));
        assert_eq!(value.select("base_dir", OsFamily::Windows).unwrap(), "d:\\logs");
        assert_eq!(value.select("base_dir", OsFamily::UnixLike).unwrap(), "/var/logs");
    }

    #[test]
    fn missing_family_falls_back_to_windows() {
        let value = per_family(Some("d:\\logs"), None);
        assert_eq!(value.select("base_dir", OsFamily::UnixLike).unwrap(), "d:\\logs");
    }

    #[test]
    fn empty_map_is_always_an_error() {
        let value = per_family(None, None);
        let err = value.select("base_dir", OsFamily::UnixLike).unwrap_err();
        assert_eq!(err, PlatformError::missing("base_dir", OsFamily::UnixLike));
    }

    #[test]
    fn from_tree_accepts_string_and_mapping() {
        let scalar = ConfigValue::from("/srv/app");
        assert_eq!(
            DualValue::from_tree("base_dir", &scalar).unwrap(),
            DualValue::Single("/srv/app".to_string()),
        );

        let mut map = Mapping::new();
        map.insert("windows".to_string(), "d:\\app".into());
        map.insert("unix".to_string(), "/srv/app".into());
        let node = ConfigValue::Mapping(map);
        assert_eq!(
            DualValue::from_tree("base_dir", &node).unwrap(),
            per_family(Some("d:\\app"), Some("/srv/app")),
        );
    }

    #[test]
    fn from_tree_rejects_other_shapes() {
        let err = DualValue::from_tree("base_dir", &ConfigValue::Int(3)).unwrap_err();
        assert!(matches!(err, PlatformError::InvalidValue { .. }));
    }

    #[test]
    fn detect_family_from_separators_and_drives() {
        assert_eq!(detect_path_family("d:\\logs"), OsFamily::Windows);
        assert_eq!(detect_path_family("C:/logs"), OsFamily::Windows);
        assert_eq!(detect_path_family("\\\\server\\share"), OsFamily::Windows);
        assert_eq!(detect_path_family("/var/logs"), OsFamily::UnixLike);
        assert_eq!(detect_path_family("relative/sub"), OsFamily::UnixLike);
    }

    #[test]
    fn to_dual_keeps_source_and_substitutes_default() {
        assert_eq!(
            to_dual("d:\\data"),
            DualValue::PerFamily {
                windows: Some("d:\\data".to_string()),
                unix_like: Some(DEFAULT_UNIX_ROOT.to_string()),
            },
        );
        assert_eq!(
            to_dual("/srv/data"),
            DualValue::PerFamily {
                windows: Some(DEFAULT_WINDOWS_ROOT.to_string()),
                unix_like: Some("/srv/data".to_string()),
            },
        );
    }

    #[test]
    fn to_dual_of_empty_input_uses_both_defaults() {
        assert_eq!(
            to_dual(""),
            DualValue::PerFamily {
                windows: Some(DEFAULT_WINDOWS_ROOT.to_string()),
                unix_like: Some(DEFAULT_UNIX_ROOT.to_string()),
            },
        );
    }

    #[test]
    fn to_tree_roundtrip() {
        let value = per_family(Some("d:\\x"), Some("/x"));
        let node = value.to_tree();
        assert_eq!(DualValue::from_tree("f", &node).unwrap(), value);
    }
}
