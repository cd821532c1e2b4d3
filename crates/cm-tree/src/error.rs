//! Error types for tree access

/// Errors raised by dotted-path access into a configuration tree
#[derive(Debug, Clone, thiserror::Error)]
pub enum TreeError {
    /// Dotted path contains an empty segment (`"a..b"`, leading/trailing dot)
    #[error("dotted path contains empty segment: '{0}'")]
    EmptySegment(String),

    /// An intermediate segment resolved to a non-mapping value
    #[error("segment '{segment}' in '{path}' is not a mapping")]
    NotAMapping {
        /// Full dotted path being traversed
        path: String,
        /// Segment that resolved to a scalar or sequence
        segment: String,
    },

    /// YAML text could not be parsed into a tree
    #[error("invalid yaml: {0}")]
    InvalidYaml(String),

    /// A mapping key was not a string
    #[error("non-string mapping key: {0}")]
    NonStringKey(String),
}
