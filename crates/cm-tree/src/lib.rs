//! Configuration value tree
//!
//! The in-memory model of a persisted configuration file: ordered-key
//! mappings, sequences, and scalar leaves (strings, integers, floats,
//! booleans, timestamps). Keys are unique within a mapping and nesting is
//! arbitrary.
//!
//! This crate owns only the model. Loading, saving, watching, and the
//! attribute-style facade over it live outside; the path engine in
//! `cm-paths` reads and rewrites trees built from this crate.
//!
//! # Example
//!
//! ```rust
//! use cm_tree::ConfigValue;
//!
//! let mut tree = ConfigValue::mapping();
//! tree.set_path("paths.work_dir", ConfigValue::from("/srv/app/proj")).unwrap();
//!
//! assert_eq!(
//!     tree.get_path("paths.work_dir").and_then(ConfigValue::as_str),
//!     Some("/srv/app/proj"),
//! );
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod value;

pub use error::TreeError;
pub use value::{ConfigValue, Mapping};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
