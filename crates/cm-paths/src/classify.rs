//! Field classification for test isolation
//!
//! Decides, for a (field name, value) pair, whether the value is a
//! relocatable path, a protected value that must never be rewritten, or
//! neither. Protection is checked before path detection and takes priority.
//! Path detection matches only on name suffixes; protection matches on both
//! names (network roles, headers) and value shapes (schemes, regexes, MIME
//! types, URL paths).
//!
//! The heuristics are order-sensitive and approximate; unanticipated
//! field-naming conventions will be misclassified. Loosening the path rules
//! requires re-verifying every protected-field test.

use cm_tree::ConfigValue;

/// Outcome of classifying one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Name marks the value as a relocatable filesystem location
    PathLike,
    /// Value (or name) marks the field as off-limits for relocation
    Protected,
    /// Neither of the above; left untouched
    Neither,
}

/// Network schemes that mark a value as protected
const NETWORK_SCHEMES: [&str; 5] = ["http://", "https://", "ftp://", "ws://", "wss://"];

/// Schemes excluded by the loose value-only path heuristic
const NON_PATH_SCHEMES: [&str; 6] =
    ["http://", "https://", "ftp://", "ws://", "wss://", "file://"];

const NETWORK_NAME_KEYWORDS: [&str; 6] = ["proxy", "url", "endpoint", "api", "host", "server"];

const HEADER_NAME_KEYWORDS: [&str; 6] = [
    "header",
    "accept",
    "content-type",
    "user-agent",
    "cookie",
    "authorization",
];

const CANONICAL_HEADERS: [&str; 14] = [
    "accept",
    "accept-charset",
    "accept-encoding",
    "accept-language",
    "authorization",
    "cache-control",
    "connection",
    "content-length",
    "content-type",
    "cookie",
    "origin",
    "referer",
    "set-cookie",
    "user-agent",
];

const MIME_TOKENS: [&str; 7] = [
    "text/",
    "application/",
    "image/",
    "video/",
    "audio/",
    "multipart/",
    "message/",
];

const URL_API_MARKERS: [&str; 4] = ["/api/", "/v1/", "/v2/", "/rest/"];

const KNOWN_TLDS: [&str; 12] = [
    ".com", ".org", ".net", ".io", ".gov", ".edu", ".mil", ".biz", ".info", ".dev", ".app", ".co",
];

const PATHLIKE_NAME_SUFFIXES: [&str; 12] = [
    "_dir",
    "dir",
    "_path",
    "path",
    "_file",
    "file",
    "_directory",
    "directory",
    "_folder",
    "folder",
    "_location",
    "location",
];

const UNIX_PATH_PREFIXES: [&str; 9] = [
    "~/", "./", "../", "/tmp/", "/var/", "/usr/", "/opt/", "/home/", "/etc/",
];

const COMMON_FILE_EXTENSIONS: [&str; 9] = [
    ".txt", ".log", ".yaml", ".yml", ".json", ".xml", ".ini", ".conf", ".cfg",
];

/// Classify a configuration tree node
///
/// Non-string and blank values are always [`Classification::Neither`].
/// Total: never fails.
#[must_use]
pub fn classify(name: &str, value: &ConfigValue) -> Classification {
    match value.as_str() {
        Some(text) => classify_str(name, text),
        None => Classification::Neither,
    }
}

/// Classify a (name, string value) pair, first match wins
#[must_use]
pub fn classify_str(name: &str, value: &str) -> Classification {
    if value.trim().is_empty() {
        return Classification::Neither;
    }
    if is_protected(name, value) {
        return Classification::Protected;
    }

    let name_lower = name.to_lowercase();
    if PATHLIKE_NAME_SUFFIXES.iter().any(|s| name_lower.ends_with(s)) {
        return Classification::PathLike;
    }
    Classification::Neither
}

fn is_protected(name: &str, value: &str) -> bool {
    let value_lower = value.to_lowercase();
    if NETWORK_SCHEMES.iter().any(|s| value_lower.starts_with(s)) {
        return true;
    }

    // Header matching treats `Content_Type` and `content-type` alike.
    let name_norm = name.to_lowercase().replace('_', "-");
    if NETWORK_NAME_KEYWORDS.iter().any(|k| name_norm.contains(k)) {
        return true;
    }
    if HEADER_NAME_KEYWORDS.iter().any(|k| name_norm.contains(k))
        || CANONICAL_HEADERS.contains(&name_norm.as_str())
    {
        return true;
    }

    if looks_like_regex(value) {
        return true;
    }
    if is_mime_like(&value_lower) {
        return true;
    }
    looks_like_url_path(value)
}

/// Regex-shape heuristic: anchors, escape classes, character classes,
/// grouping, quantifiers, alternation, brace repetition
///
/// Windows drive paths are excluded up front so `d:\new\table.txt` does not
/// read as `\n`/`\t` escapes.
#[must_use]
pub fn looks_like_regex(value: &str) -> bool {
    if is_drive_prefixed(value) {
        return false;
    }

    let has_escape_class = ["\\d", "\\w", "\\s", "\\n", "\\t"]
        .iter()
        .any(|e| value.contains(e))
        && !value.contains('/')
        && !value.contains(':');

    value.starts_with('^')
        || value.ends_with('$')
        || has_escape_class
        || (value.contains('[') && value.contains(']'))
        || (value.contains('(') && value.contains(')'))
        || value.contains('+')
        || value.contains('*')
        || value.contains('?')
        || value.contains('|')
        || (value.contains('{') && value.contains('}'))
}

fn is_mime_like(value_lower: &str) -> bool {
    value_lower.contains('/') && MIME_TOKENS.iter().any(|t| value_lower.contains(t))
}

/// URL-path shape heuristic: API-style absolute paths, wildcard domains,
/// host-plus-path values, and bare hostnames with a known TLD
fn looks_like_url_path(value: &str) -> bool {
    // Shapes that are clearly filesystem paths never match.
    if value.starts_with("./")
        || value.starts_with("../")
        || value.starts_with("~/")
        || value.contains('\\')
        || is_drive_prefixed(value)
    {
        return false;
    }

    let lower = value.to_lowercase();
    if value.starts_with('/') {
        // A single leading slash is an absolute path unless it reads like a
        // REST route; doubled slashes never match.
        return !value.starts_with("//") && URL_API_MARKERS.iter().any(|m| lower.contains(m));
    }

    if value.starts_with("*.") {
        return true;
    }

    let host = lower.split(['/', ':']).next().unwrap_or("");
    if host.contains('.') {
        if lower.contains('/') {
            return true;
        }
        if KNOWN_TLDS.iter().any(|t| host.ends_with(t)) {
            return true;
        }
    }
    false
}

/// Loose value-only path heuristic for bare sequence elements
///
/// With no field name available the value shape has to carry the decision,
/// so this is wider than [`classify_str`]'s name-suffix rule but still
/// refuses schemes, MIME types, and regex-shaped values.
#[must_use]
pub fn looks_like_path(value: &str) -> bool {
    if value.len() < 2 {
        return false;
    }

    let lower = value.to_lowercase();
    if NON_PATH_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return false;
    }
    if is_mime_like(&lower) {
        return false;
    }
    if is_drive_prefixed(value) {
        return true;
    }
    if looks_like_regex(value) {
        return false;
    }
    if UNIX_PATH_PREFIXES.iter().any(|p| value.starts_with(p)) {
        return true;
    }

    if value.contains('/') || value.contains('\\') {
        if value.starts_with('/') && !value.starts_with("//") {
            return !URL_API_MARKERS.iter().any(|m| lower.contains(m));
        }
        if value.contains('\\') {
            return true;
        }
        if value.contains('.') && !value.starts_with('.') {
            return COMMON_FILE_EXTENSIONS.iter().any(|e| lower.contains(e));
        }
    }
    false
}

fn is_drive_prefixed(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(first), Some(':')) if first.is_ascii_alphabetic()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_named_fields_are_path_like() {
        assert_eq!(
            classify_str("base_dir", "/original/base/path"),
            Classification::PathLike,
        );
        assert_eq!(classify_str("storage_location", "/srv/store"), Classification::PathLike);
        assert_eq!(classify_str("workdir", "/scratch"), Classification::PathLike);
        assert_eq!(classify_str("issue_file", "./issues/1.md"), Classification::PathLike);
    }

    #[test]
    fn network_urls_are_protected_regardless_of_name() {
        assert_eq!(
            classify_str("download_dir", "http://mirror.example.com/files"),
            Classification::Protected,
        );
        assert_eq!(
            classify_str("proxy_url", "http://proxy.local:8080"),
            Classification::Protected,
        );
        assert_eq!(classify_str("socket", "wss://feed.example.com"), Classification::Protected);
    }

    #[test]
    fn network_role_names_are_protected() {
        assert_eq!(classify_str("api_root", "/v3/things"), Classification::Protected);
        assert_eq!(classify_str("db_host", "10.0.0.5"), Classification::Protected);
        assert_eq!(classify_str("server_path", "/srv/www"), Classification::Protected);
    }

    #[test]
    fn header_fields_are_protected() {
        assert_eq!(
            classify_str("accept", "text/html,application/xhtml+xml"),
            Classification::Protected,
        );
        assert_eq!(
            classify_str("Content_Type", "application/json"),
            Classification::Protected,
        );
        assert_eq!(classify_str("User_Agent", "agent/1.0"), Classification::Protected);
    }

    #[test]
    fn regex_values_are_protected() {
        assert_eq!(
            classify_str("url_pattern", "^https://[^/]+/api/v\\d+/"),
            Classification::Protected,
        );
        assert_eq!(
            classify_str("level2_pattern", "^https?://[^/]+/chapter/\\d+$"),
            Classification::Protected,
        );
        assert_eq!(classify_str("exclude", "\\.jpg$"), Classification::Protected);
    }

    #[test]
    fn mime_values_are_protected() {
        assert_eq!(classify_str("format", "image/png"), Classification::Protected);
        assert_eq!(classify_str("payload", "multipart/form-data"), Classification::Protected);
    }

    #[test]
    fn url_shaped_values_are_protected() {
        assert_eq!(classify_str("route_path", "/api/v2/users"), Classification::Protected);
        assert_eq!(classify_str("domain_file", "*.example.com"), Classification::Protected);
        assert_eq!(classify_str("cdn_path", "cdn.example.com/assets"), Classification::Protected);
        assert_eq!(classify_str("site_dir", "example.com"), Classification::Protected);
    }

    #[test]
    fn plain_paths_do_not_trip_url_heuristics() {
        assert_eq!(classify_str("data_dir", "/var/lib/app"), Classification::PathLike);
        assert_eq!(classify_str("rel_dir", "./cache"), Classification::PathLike);
        assert_eq!(classify_str("win_dir", "d:\\logs\\app"), Classification::PathLike);
    }

    #[test]
    fn non_path_names_are_neither() {
        assert_eq!(classify_str("concurrency", "5"), Classification::Neither);
        assert_eq!(classify_str("project_name", "demo"), Classification::Neither);
    }

    #[test]
    fn blank_and_non_string_values_are_neither() {
        assert_eq!(classify_str("base_dir", "   "), Classification::Neither);
        assert_eq!(classify("base_dir", &ConfigValue::Int(4)), Classification::Neither);
        assert_eq!(classify("base_dir", &ConfigValue::Bool(true)), Classification::Neither);
    }

    #[test]
    fn drive_paths_are_not_regexes() {
        assert!(!looks_like_regex("d:\\new\\table.txt"));
        assert!(looks_like_regex("^start"));
        assert!(looks_like_regex("a|b"));
        assert!(looks_like_regex("colou?r"));
    }

    #[test]
    fn loose_heuristic_accepts_path_shapes() {
        assert!(looks_like_path("/var/data/input"));
        assert!(looks_like_path("./relative/file"));
        assert!(looks_like_path("../up/one"));
        assert!(looks_like_path("d:\\data"));
        assert!(looks_like_path("logs/app.log"));
    }

    #[test]
    fn loose_heuristic_rejects_non_paths() {
        assert!(!looks_like_path("https://example.com/x"));
        assert!(!looks_like_path("file://share/x"));
        assert!(!looks_like_path("text/html"));
        assert!(!looks_like_path("\\.jpg$"));
        assert!(!looks_like_path("/api/v1/items"));
        assert!(!looks_like_path("x"));
    }
}
