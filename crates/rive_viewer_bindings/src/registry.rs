// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime registry and file-argument helpers.
//!
//! The registry remembers, per runtime name, where the runtime came from,
//! which version it is and its cached script text. It is owned by the
//! session and evicted explicitly on reload.

use std::collections::{HashMap, HashSet};

/// Oldest runtime version with ViewModel scripting support
pub const MIN_SCRIPTING_RUNTIME_VERSION: &str = "2.34.0";

/// One resolved runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEntry {
    /// URL the runtime was resolved from
    pub resolved_url: String,
    /// Version, if known
    pub version: Option<String>,
    /// Cached script text
    pub source: Option<String>,
}

/// Resolved runtimes by name
#[derive(Debug, Default)]
pub struct RuntimeRegistry {
    entries: HashMap<String, RuntimeEntry>,
    warnings_shown: HashSet<String>,
}

impl RuntimeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved runtime. The version is taken from the URL when
    /// not given.
    pub fn record(&mut self, name: &str, resolved_url: &str, version: Option<&str>, source: Option<String>) {
        let version = version
            .map(str::to_string)
            .or_else(|| extract_version_from_url(resolved_url));
        tracing::debug!("Runtime {name} resolved to {resolved_url} ({version:?})");
        self.entries.insert(
            name.to_string(),
            RuntimeEntry {
                resolved_url: resolved_url.to_string(),
                version,
                source,
            },
        );
    }

    /// Look up a runtime
    pub fn get(&self, name: &str) -> Option<&RuntimeEntry> {
        self.entries.get(name)
    }

    /// Version of a runtime
    pub fn version(&self, name: &str) -> Option<&str> {
        self.entries.get(name)?.version.as_deref()
    }

    /// Forget a runtime, dropping its cached script
    pub fn evict(&mut self, name: &str) -> Option<RuntimeEntry> {
        self.entries.remove(name)
    }

    /// Number of resolved runtimes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is resolved
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Warning for a runtime too old for ViewModel scripting.
    ///
    /// Returned at most once per `name@version`; unknown versions never warn.
    pub fn scripting_warning(&mut self, name: &str) -> Option<String> {
        let version = self.version(name)?.to_string();
        if is_semver_at_least(&version, MIN_SCRIPTING_RUNTIME_VERSION) {
            return None;
        }
        if !self.warnings_shown.insert(format!("{name}@{version}")) {
            return None;
        }
        let message = format!(
            "Runtime {name}@{version} is below {MIN_SCRIPTING_RUNTIME_VERSION}; VM scripting may be unavailable."
        );
        tracing::warn!("{message}");
        Some(message)
    }
}

/// The `@version` segment of a package URL. The last `@` wins, so scoped
/// packages (`@scope/name@1.2.3`) yield their version.
pub fn extract_version_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.rsplit_once('@')?;
    let version = rest.split('/').next()?;
    (!version.is_empty()).then(|| version.to_string())
}

/// First `major.minor.patch` triple in `raw`
pub fn parse_semver_parts(raw: &str) -> Option<[u64; 3]> {
    let bytes = raw.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if bytes[start].is_ascii_digit() {
            if let Some(parts) = parse_triple(&raw[start..]) {
                return Some(parts);
            }
        }
        start += 1;
    }
    None
}

fn parse_triple(text: &str) -> Option<[u64; 3]> {
    let mut parts = [0u64; 3];
    let mut rest = text;
    for (index, part) in parts.iter_mut().enumerate() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        *part = rest[..digits].parse().ok()?;
        rest = &rest[digits..];
        if index < 2 {
            rest = rest.strip_prefix('.')?;
        }
    }
    Some(parts)
}

/// Whether `version` is at least `minimum`. Unparseable input counts as new
/// enough.
pub fn is_semver_at_least(version: &str, minimum: &str) -> bool {
    match (parse_semver_parts(version), parse_semver_parts(minimum)) {
        (Some(current), Some(minimum)) => current >= minimum,
        _ => true,
    }
}

/// Whether a path names an animation file (`.riv`, or a `.ron` scene)
pub fn looks_like_animation_file(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.ends_with(".riv") || lower.ends_with(".ron")
}

/// Animation files among command-line arguments. Flags are skipped;
/// `file://` URLs are accepted.
pub fn extract_opened_file_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .filter_map(|arg| {
            let trimmed = arg.as_ref().trim_matches('"').trim().to_string();
            if trimmed.is_empty() || trimmed.starts_with('-') {
                return None;
            }
            let lower = trimmed.to_ascii_lowercase();
            let is_file_url = lower.starts_with("file://") && (lower.contains(".riv") || lower.contains(".ron"));
            (looks_like_animation_file(&trimmed) || is_file_url).then_some(trimmed)
        })
        .collect()
}

/// Local path for a `file://` URL or plain path argument
pub fn file_arg_to_path(arg: &str) -> std::path::PathBuf {
    let path = arg.strip_prefix("file://").unwrap_or(arg);
    std::path::PathBuf::from(percent_decode(path))
}

/// Decode `%XX` escapes; malformed escapes are kept as written
fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
                .and_then(|pair| std::str::from_utf8(pair).ok());
            if let Some(byte) = hex.and_then(|pair| u8::from_str_radix(pair, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_url() {
        assert_eq!(
            extract_version_from_url("https://cdn.jsdelivr.net/npm/@rive-app/webgl2@2.34.3/rive.js").as_deref(),
            Some("2.34.3")
        );
        assert_eq!(
            extract_version_from_url("https://cdn.example/npm/webgl2@2.34.3/rive.js").as_deref(),
            Some("2.34.3")
        );
        assert_eq!(extract_version_from_url("https://cdn.example/rive.js"), None);
        assert_eq!(extract_version_from_url("https://cdn.example/npm/@rive-app/canvas"), Some("rive-app".into()));
    }

    #[test]
    fn test_semver_compare() {
        assert!(is_semver_at_least("2.34.0", "2.34.0"));
        assert!(is_semver_at_least("v2.35.1-beta", "2.34.0"));
        assert!(!is_semver_at_least("2.33.9", "2.34.0"));
        assert!(!is_semver_at_least("1.99.99", "2.0.0"));
        assert!(is_semver_at_least("latest", "2.34.0"));
        assert_eq!(parse_semver_parts("rive 10.2.30 build"), Some([10, 2, 30]));
        assert_eq!(parse_semver_parts("1.2"), None);
    }

    #[test]
    fn test_scripting_warning_once() {
        let mut registry = RuntimeRegistry::new();
        registry.record("canvas", "https://cdn.example/canvas@2.30.1", None, None);
        registry.record("webgl2", "https://cdn.example/webgl2@2.34.3", None, Some("/* js */".into()));

        assert!(registry.scripting_warning("canvas").is_some());
        assert!(registry.scripting_warning("canvas").is_none());
        assert!(registry.scripting_warning("webgl2").is_none());
        assert!(registry.scripting_warning("missing").is_none());

        assert!(registry.evict("webgl2").unwrap().source.is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_file_args() {
        let args = ["--flag", "\"C:/art/Hero.RIV\"", "notes.txt", "file:///tmp/scene.riv", "  ", "demo.ron"];
        assert_eq!(
            extract_opened_file_args(args),
            vec!["C:/art/Hero.RIV", "file:///tmp/scene.riv", "demo.ron"]
        );
        assert_eq!(file_arg_to_path("file:///tmp/my%20scene.ron"), std::path::PathBuf::from("/tmp/my scene.ron"));
        assert_eq!(
            file_arg_to_path("file:///tmp/caf%C3%A9%23%5B1%5D.riv"),
            std::path::PathBuf::from("/tmp/café#[1].riv")
        );
        assert_eq!(file_arg_to_path("/tmp/100%25%zz%4"), std::path::PathBuf::from("/tmp/100%%zz%4"));
    }
}
