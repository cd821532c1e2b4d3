//! In-place relocation of path-like fields
//!
//! Walks a configuration tree and rewrites every relocatable path so it
//! descends from an ephemeral root, leaving protected and unclassified
//! fields byte-for-byte untouched. Re-running the walk over an already
//! relocated tree is a no-op: any value that already contains the marker
//! (the system temporary root the ephemeral root lives under) is skipped.
//!
//! A malformed individual value never aborts the walk; it is logged and
//! left as-is.

use crate::classify::{classify_str, looks_like_path, Classification};
use crate::layout::join_under;
use crate::platform::{detect_path_family, OsFamily};
use cm_tree::ConfigValue;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Nesting bound for the walk; an owned tree cannot alias itself, so this
/// only guards degenerate deeply-nested documents
const MAX_DEPTH: usize = 128;

/// One rewritten field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    /// Dotted path of the field (sequence elements use `[index]`)
    pub key_path: String,
    /// Value before the rewrite
    pub from: String,
    /// Value after the rewrite
    pub to: String,
}

/// Outcome of one relocation walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationReport {
    /// Fields that were rewritten
    pub relocated: Vec<Relocation>,
    /// Fields that looked relocatable but could not be confidently rewritten
    pub ambiguous: Vec<String>,
}

/// Relocate every path-like field of `tree` under `root`, in place
///
/// `marker` is the idempotence guard: values already containing it are never
/// rewritten. The walk mutates the tree it is given and holds no references
/// to it afterwards.
pub fn relocate(tree: &mut ConfigValue, root: &str, marker: &str) -> RelocationReport {
    let mut walker = Relocator {
        root: root.to_string(),
        marker: marker.to_string(),
        family: detect_path_family(root),
        claimed: HashMap::new(),
        report: RelocationReport::default(),
    };
    walker.visit(tree, "", 0);
    walker.report
}

struct Relocator {
    root: String,
    marker: String,
    family: OsFamily,
    /// destination → original, for collision disambiguation within one run
    claimed: HashMap<String, String>,
    report: RelocationReport,
}

impl Relocator {
    fn visit(&mut self, node: &mut ConfigValue, parent: &str, depth: usize) {
        if depth > MAX_DEPTH {
            warn!(parent, "nesting exceeds walk depth bound, subtree left unchanged");
            self.report.ambiguous.push(parent.to_string());
            return;
        }

        match node {
            ConfigValue::Mapping(map) => {
                for (key, value) in map.iter_mut() {
                    let key_path = if parent.is_empty() {
                        key.clone()
                    } else {
                        format!("{parent}.{key}")
                    };
                    match value {
                        ConfigValue::String(s) => {
                            if classify_str(key, s) == Classification::PathLike {
                                self.rewrite_named(key, &key_path, s);
                            }
                        }
                        ConfigValue::Mapping(_) | ConfigValue::Sequence(_) => {
                            self.visit(value, &key_path, depth + 1);
                        }
                        _ => {}
                    }
                }
            }
            ConfigValue::Sequence(seq) => {
                for (index, item) in seq.iter_mut().enumerate() {
                    let key_path = format!("{parent}[{index}]");
                    match item {
                        ConfigValue::String(s) => {
                            // No field name here, so the looser value-shape
                            // heuristic decides.
                            if looks_like_path(s) && !s.contains(&self.marker) {
                                self.rewrite_generic(&key_path, s);
                            }
                        }
                        ConfigValue::Mapping(_) | ConfigValue::Sequence(_) => {
                            self.visit(item, &key_path, depth + 1);
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn rewrite_named(&mut self, key: &str, key_path: &str, value: &mut String) {
        if value.contains(&self.marker) {
            return;
        }

        if let Some(child) = canonical_child(&key.to_lowercase()) {
            let dest = match child {
                None => self.root.clone(),
                Some(segment) => join_under(self.family, &self.root, &[segment]),
            };
            self.apply(key_path, value, dest);
            return;
        }

        self.rewrite_generic(key_path, value);
    }

    fn rewrite_generic(&mut self, key_path: &str, value: &mut String) {
        match self.generic_destination(value) {
            Some(dest) => self.apply(key_path, value, dest),
            None => {
                warn!(key_path, original = %value, "path could not be confidently relocated");
                self.report.ambiguous.push(key_path.to_string());
            }
        }
    }

    /// Destination for a path without a canonical-table entry
    fn generic_destination(&mut self, original: &str) -> Option<String> {
        let dest = if let Some(rest) = original.strip_prefix("./") {
            if rest.is_empty() {
                return None;
            }
            join_under(self.family, &self.root, &[rest])
        } else if let Some(rest) = original.strip_prefix("../") {
            if rest.is_empty() {
                return None;
            }
            join_under(self.family, &self.root, &[rest])
        } else if is_absolute(original) {
            let segments: Vec<&str> = original
                .split(['/', '\\'])
                .filter(|s| !s.is_empty() && *s != ".." && !is_drive_token(s))
                .collect();
            let tail = if segments.len() > 2 {
                &segments[segments.len() - 2..]
            } else {
                &segments[..]
            };
            if tail.is_empty() {
                join_under(self.family, &self.root, &["data"])
            } else {
                join_under(self.family, &self.root, tail)
            }
        } else {
            join_under(self.family, &self.root, &[original])
        };

        Some(self.claim(original, dest))
    }

    /// Two distinct originals mapping to one destination get an 8-hex
    /// SHA-256 suffix on the second claim; deterministic across runs
    fn claim(&mut self, original: &str, dest: String) -> String {
        match self.claimed.get(&dest) {
            Some(prev) if prev != original => {
                let disambiguated = format!("{dest}-{}", short_hash(original));
                self.claimed
                    .insert(disambiguated.clone(), original.to_string());
                disambiguated
            }
            _ => {
                self.claimed.insert(dest.clone(), original.to_string());
                dest
            }
        }
    }

    fn apply(&mut self, key_path: &str, value: &mut String, dest: String) {
        if *value == dest {
            return;
        }
        debug!(key_path, from = %value, to = %dest, "relocated path field");
        self.report.relocated.push(Relocation {
            key_path: key_path.to_string(),
            from: value.clone(),
            to: dest.clone(),
        });
        *value = dest;
    }
}

/// Canonical directory table: `None` maps onto the root itself, `Some`
/// onto a fixed child
fn canonical_child(key_lower: &str) -> Option<Option<&'static str>> {
    match key_lower {
        "base_dir" | "work_dir" => Some(None),
        "log_dir" => Some(Some("logs")),
        "data_dir" => Some(Some("data")),
        "output_dir" => Some(Some("output")),
        "temp_dir" => Some(Some("temp")),
        "cache_dir" => Some(Some("cache")),
        "backup_dir" => Some(Some("backup")),
        "download_dir" => Some(Some("downloads")),
        "upload_dir" => Some(Some("uploads")),
        "storage_dir" => Some(Some("storage")),
        _ => None,
    }
}

fn is_absolute(value: &str) -> bool {
    value.starts_with('/') || value.starts_with('\\') || is_drive_token_prefix(value)
}

fn is_drive_token_prefix(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(first), Some(':')) if first.is_ascii_alphabetic()
    )
}

fn is_drive_token(segment: &str) -> bool {
    segment.len() == 2 && is_drive_token_prefix(segment)
}

fn short_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(&digest[..4])
}
