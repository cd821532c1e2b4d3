//! The configuration value model
//!
//! [`ConfigValue`] mirrors what a structured configuration file can hold:
//! scalars, sequences, and ordered-key mappings. Mappings keep insertion
//! order so a tree round-trips through the persisted format without
//! reshuffling keys.

use crate::error::TreeError;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use std::fmt;

/// Ordered mapping of configuration keys to values
pub type Mapping = IndexMap<String, ConfigValue>;

/// A node in the configuration tree
///
/// The tree is a plain owned value: cloning it deep-copies the whole
/// structure, and ownership guarantees it is acyclic.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// Absent / null value
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Floating-point scalar
    Float(f64),
    /// String scalar
    String(String),
    /// Timestamp scalar (naive; the persisted format carries no zone)
    Timestamp(NaiveDateTime),
    /// Ordered sequence of values
    Sequence(Vec<ConfigValue>),
    /// Ordered-key mapping
    Mapping(Mapping),
}

impl ConfigValue {
    /// Empty mapping node
    #[inline]
    #[must_use]
    pub fn mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    /// Empty sequence node
    #[inline]
    #[must_use]
    pub fn sequence() -> Self {
        Self::Sequence(Vec::new())
    }

    /// String slice if this is a string scalar
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean if this is a bool scalar
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer if this is an int scalar
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Timestamp if this is a timestamp scalar
    #[inline]
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Mapping reference if this is a mapping node
    #[inline]
    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable mapping reference if this is a mapping node
    #[inline]
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Sequence reference if this is a sequence node
    #[inline]
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable sequence reference if this is a sequence node
    #[inline]
    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<ConfigValue>> {
        match self {
            Self::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// True for mapping nodes
    #[inline]
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    /// True for string scalars
    #[inline]
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Direct child of a mapping node by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Resolve a dotted path (`"paths.work_dir"`) to a node
    ///
    /// Returns `None` when any segment is missing or an intermediate node is
    /// not a mapping.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        let mut node = self;
        for segment in path.split('.') {
            if segment.is_empty() {
                return None;
            }
            node = node.as_mapping()?.get(segment)?;
        }
        Some(node)
    }

    /// Set a dotted path, creating intermediate mappings as needed
    ///
    /// # Errors
    /// - [`TreeError::EmptySegment`] for paths like `"a..b"`
    /// - [`TreeError::NotAMapping`] when an existing intermediate node is a
    ///   scalar or sequence
    pub fn set_path(&mut self, path: &str, value: ConfigValue) -> Result<(), TreeError> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(TreeError::EmptySegment(path.to_string()));
        }

        let mut node = self;
        for segment in &segments[..segments.len() - 1] {
            let map = match node {
                ConfigValue::Mapping(m) => m,
                _ => {
                    return Err(TreeError::NotAMapping {
                        path: path.to_string(),
                        segment: (*segment).to_string(),
                    });
                }
            };
            node = map
                .entry((*segment).to_string())
                .or_insert_with(ConfigValue::mapping);
        }

        let last = segments[segments.len() - 1];
        match node {
            ConfigValue::Mapping(m) => {
                m.insert(last.to_string(), value);
                Ok(())
            }
            _ => Err(TreeError::NotAMapping {
                path: path.to_string(),
                segment: last.to_string(),
            }),
        }
    }

    /// Remove a dotted path, returning the removed node if present
    pub fn remove_path(&mut self, path: &str) -> Option<ConfigValue> {
        let (parent_path, last) = path.rsplit_once('.').unwrap_or(("", path));
        let parent = if parent_path.is_empty() {
            self
        } else {
            self.get_path_mut(parent_path)?
        };
        parent.as_mapping_mut()?.shift_remove(last)
    }

    fn get_path_mut(&mut self, path: &str) -> Option<&mut ConfigValue> {
        let mut node = self;
        for segment in path.split('.') {
            if segment.is_empty() {
                return None;
            }
            node = match node {
                ConfigValue::Mapping(m) => m.get_mut(segment)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Parse a YAML document into a tree
    ///
    /// # Errors
    /// [`TreeError::InvalidYaml`] on parse failure, [`TreeError::NonStringKey`]
    /// when a mapping key is not a string.
    pub fn from_yaml_str(text: &str) -> Result<Self, TreeError> {
        let raw: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| TreeError::InvalidYaml(e.to_string()))?;
        Self::from_yaml(raw)
    }

    /// Convert from a parsed `serde_yaml` value
    ///
    /// # Errors
    /// [`TreeError::NonStringKey`] when a mapping key is not a string.
    pub fn from_yaml(raw: serde_yaml::Value) -> Result<Self, TreeError> {
        Ok(match raw {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(b) => Self::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_yaml::Value::String(s) => Self::String(s),
            serde_yaml::Value::Sequence(seq) => Self::Sequence(
                seq.into_iter()
                    .map(Self::from_yaml)
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (k, v) in map {
                    let key = match k {
                        serde_yaml::Value::String(s) => s,
                        other => {
                            return Err(TreeError::NonStringKey(format!("{other:?}")));
                        }
                    };
                    out.insert(key, Self::from_yaml(v)?);
                }
                Self::Mapping(out)
            }
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(tagged.value)?,
        })
    }

    /// Convert into a `serde_yaml` value
    ///
    /// Timestamps serialize as `YYYY-MM-DDTHH:MM:SS` strings; the persisted
    /// format has no dedicated timestamp scalar here.
    #[must_use]
    pub fn to_yaml(&self) -> serde_yaml::Value {
        match self {
            Self::Null => serde_yaml::Value::Null,
            Self::Bool(b) => serde_yaml::Value::Bool(*b),
            Self::Int(i) => serde_yaml::Value::Number((*i).into()),
            Self::Float(f) => serde_yaml::Value::Number((*f).into()),
            Self::String(s) => serde_yaml::Value::String(s.clone()),
            Self::Timestamp(t) => {
                serde_yaml::Value::String(t.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            Self::Sequence(seq) => {
                serde_yaml::Value::Sequence(seq.iter().map(Self::to_yaml).collect())
            }
            Self::Mapping(map) => {
                let mut out = serde_yaml::Mapping::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(serde_yaml::Value::String(k.clone()), v.to_yaml());
                }
                serde_yaml::Value::Mapping(out)
            }
        }
    }

    /// Render the tree as a YAML document
    ///
    /// # Errors
    /// [`TreeError::InvalidYaml`] if serialization fails (non-finite floats).
    pub fn to_yaml_string(&self) -> Result<String, TreeError> {
        serde_yaml::to_string(&self.to_yaml()).map_err(|e| TreeError::InvalidYaml(e.to_string()))
    }
}

impl Default for ConfigValue {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("~"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%dT%H:%M:%S")),
            Self::Sequence(s) => write!(f, "[sequence; {}]", s.len()),
            Self::Mapping(m) => write!(f, "{{mapping; {}}}", m.len()),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for ConfigValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<NaiveDateTime> for ConfigValue {
    fn from(t: NaiveDateTime) -> Self {
        Self::Timestamp(t)
    }
}

impl From<Mapping> for ConfigValue {
    fn from(m: Mapping) -> Self {
        Self::Mapping(m)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(s: Vec<ConfigValue>) -> Self {
        Self::Sequence(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_and_get_nested_path() {
        let mut tree = ConfigValue::mapping();
        tree.set_path("paths.work_dir", "/srv/app".into()).unwrap();

        assert_eq!(
            tree.get_path("paths.work_dir").and_then(ConfigValue::as_str),
            Some("/srv/app"),
        );
        assert!(tree.get("paths").unwrap().is_mapping());
    }

    #[test]
    fn set_path_creates_intermediates() {
        let mut tree = ConfigValue::mapping();
        tree.set_path("a.b.c.d", ConfigValue::Int(1)).unwrap();
        assert_eq!(tree.get_path("a.b.c.d").and_then(ConfigValue::as_int), Some(1));
    }

    #[test]
    fn set_path_through_scalar_fails() {
        let mut tree = ConfigValue::mapping();
        tree.set_path("a", "scalar".into()).unwrap();

        let err = tree.set_path("a.b", ConfigValue::Null).unwrap_err();
        assert!(matches!(err, TreeError::NotAMapping { .. }));
    }

    #[test]
    fn empty_segment_rejected() {
        let mut tree = ConfigValue::mapping();
        let err = tree.set_path("a..b", ConfigValue::Null).unwrap_err();
        assert!(matches!(err, TreeError::EmptySegment(_)));
    }

    #[test]
    fn get_path_missing_is_none() {
        let tree = ConfigValue::mapping();
        assert!(tree.get_path("missing.key").is_none());
    }

    #[test]
    fn remove_path_returns_value() {
        let mut tree = ConfigValue::mapping();
        tree.set_path("a.b", ConfigValue::Int(7)).unwrap();

        let removed = tree.remove_path("a.b");
        assert_eq!(removed, Some(ConfigValue::Int(7)));
        assert!(tree.get_path("a.b").is_none());
    }

    #[test]
    fn yaml_roundtrip_preserves_key_order() {
        let text = "zebra: 1\nalpha: 2\nmiddle:\n  inner: [a, b]\n";
        let tree = ConfigValue::from_yaml_str(text).unwrap();

        let keys: Vec<&String> = tree.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, vec!["zebra", "alpha", "middle"]);

        let rendered = tree.to_yaml_string().unwrap();
        let reparsed = ConfigValue::from_yaml_str(&rendered).unwrap();
        assert_eq!(tree, reparsed);
    }

    #[test]
    fn yaml_scalar_types_map_over() {
        let tree = ConfigValue::from_yaml_str("i: 3\nf: 1.5\nb: true\ns: text\nn: null\n").unwrap();
        assert_eq!(tree.get("i"), Some(&ConfigValue::Int(3)));
        assert_eq!(tree.get("f"), Some(&ConfigValue::Float(1.5)));
        assert_eq!(tree.get("b"), Some(&ConfigValue::Bool(true)));
        assert_eq!(tree.get("s").and_then(ConfigValue::as_str), Some("text"));
        assert_eq!(tree.get("n"), Some(&ConfigValue::Null));
    }

    #[test]
    fn clone_is_deep() {
        let mut tree = ConfigValue::mapping();
        tree.set_path("a.b", "original".into()).unwrap();

        let mut copy = tree.clone();
        copy.set_path("a.b", "changed".into()).unwrap();

        assert_eq!(tree.get_path("a.b").and_then(ConfigValue::as_str), Some("original"));
        assert_eq!(copy.get_path("a.b").and_then(ConfigValue::as_str), Some("changed"));
    }

    #[test]
    fn timestamp_renders_as_iso_string() {
        let ts = chrono::NaiveDate::from_ymd_opt(2025, 1, 7)
            .unwrap()
            .and_hms_opt(18, 15, 20)
            .unwrap();
        let value = ConfigValue::Timestamp(ts);
        assert_eq!(value.to_yaml(), serde_yaml::Value::String("2025-01-07T18:15:20".into()));
    }

    proptest::proptest! {
        #[test]
        fn set_then_get_roundtrips(
            first in "[a-z]{1,8}",
            second in "[a-z]{1,8}",
            value in "\\PC{0,24}",
        ) {
            let mut tree = ConfigValue::mapping();
            let path = format!("{first}.{second}");
            tree.set_path(&path, ConfigValue::from(value.as_str())).unwrap();
            proptest::prop_assert_eq!(
                tree.get_path(&path).and_then(ConfigValue::as_str),
                Some(value.as_str()),
            );
        }
    }
}
