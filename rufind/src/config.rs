use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Defaults for search invocations, loadable from config files.
///
/// Configuration can come from multiple locations, in order of precedence:
/// 1. Custom config file specified via `--config`
/// 2. Local `.rufind.yaml` in the current directory
/// 3. Global `$HOME/.config/rufind/config.yaml`
///
/// The configuration uses YAML format. Example:
/// ```yaml
/// # Root directory to search in
/// root: "."
///
/// # Directory names to skip during traversal
/// ignore_dirs:
///   - ".git"
///   - ".venv"
///
/// # Case-insensitive content matching
/// case_insensitive: false
///
/// # Matcher thread count (default: CPU cores)
/// thread_count: 4
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
///
/// CLI arguments take precedence over config file values; the merge is
/// performed by the front end. Combining a config with the pattern
/// arguments via [`SearchConfig::request`] produces a [`SearchRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Root directory to start the search from
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Directory base names excluded from traversal, applied before descent
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,

    /// Whether content matching ignores case
    #[serde(default)]
    pub case_insensitive: bool,

    /// Number of matcher threads
    /// Defaults to the number of CPU cores if not specified
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_ignore_dirs() -> Vec<String> {
    vec![".git".to_string(), ".venv".to_string()]
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get().max(1)).unwrap()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            ignore_dirs: default_ignore_dirs(),
            case_insensitive: false,
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file, falling back to the
    /// default locations for anything it does not set
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("rufind/config.yaml")),
            // Local config
            Some(PathBuf::from(".rufind.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Builds a request from these defaults and the pattern arguments
    pub fn request(
        &self,
        name_pattern: impl Into<String>,
        content_pattern: Option<String>,
    ) -> SearchRequest {
        SearchRequest {
            root: self.root.clone(),
            name_pattern: name_pattern.into(),
            content_pattern,
            ignore_dirs: self.ignore_dirs.clone(),
            case_insensitive: self.case_insensitive,
        }
    }
}

/// One search invocation. Immutable once handed to the engine.
///
/// `name_pattern` is interpreted as a shell glob if it contains any of
/// `* ? [ ]` and as an unanchored regex otherwise; the interpretation is
/// decided once when the pattern is compiled, not per file.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Root directory to search under
    pub root: PathBuf,
    /// File-name pattern (glob or regex)
    pub name_pattern: String,
    /// Optional regex applied to file contents
    pub content_pattern: Option<String>,
    /// Directory base names pruned before descent
    pub ignore_dirs: Vec<String>,
    /// Whether content matching ignores case
    pub case_insensitive: bool,
}

impl SearchRequest {
    /// Creates a request with the default ignore set and case-sensitive
    /// content matching
    pub fn new(root: impl Into<PathBuf>, name_pattern: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name_pattern: name_pattern.into(),
            content_pattern: None,
            ignore_dirs: default_ignore_dirs(),
            case_insensitive: false,
        }
    }

    pub fn with_content_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.content_pattern = Some(pattern.into());
        self
    }

    pub fn with_ignore_dirs(mut self, dirs: Vec<String>) -> Self {
        self.ignore_dirs = dirs;
        self
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            root: "src"
            ignore_dirs: ["node_modules", ".git"]
            case_insensitive: true
            thread_count: 4
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.root, PathBuf::from("src"));
        assert_eq!(
            config.ignore_dirs,
            vec!["node_modules".to_string(), ".git".to_string()]
        );
        assert!(config.case_insensitive);
        assert_eq!(config.thread_count, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"root: \".\"\n").unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(
            config.ignore_dirs,
            vec![".git".to_string(), ".venv".to_string()]
        );
        assert!(!config.case_insensitive);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_config() {
        let config_content = r#"
            root: []  # Should be string
            thread_count: "invalid"  # Should be number
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let result = SearchConfig::load_from(Some(&config_path));
        assert!(result.is_err(), "Expected error loading invalid config");
    }

    #[test]
    fn test_request_from_config() {
        let config = SearchConfig {
            root: PathBuf::from("/tmp"),
            ignore_dirs: vec!["target".to_string()],
            case_insensitive: true,
            ..SearchConfig::default()
        };

        let request = config.request("*.rs", Some("TODO".to_string()));
        assert_eq!(request.root, PathBuf::from("/tmp"));
        assert_eq!(request.name_pattern, "*.rs");
        assert_eq!(request.content_pattern.as_deref(), Some("TODO"));
        assert_eq!(request.ignore_dirs, vec!["target".to_string()]);
        assert!(request.case_insensitive);
    }

    #[test]
    fn test_request_builder() {
        let request = SearchRequest::new("/tmp", "*.log")
            .with_content_pattern("error")
            .with_ignore_dirs(vec![".git".to_string()])
            .case_insensitive(true);

        assert_eq!(request.root, PathBuf::from("/tmp"));
        assert_eq!(request.content_pattern.as_deref(), Some("error"));
        assert_eq!(request.ignore_dirs, vec![".git".to_string()]);
        assert!(request.case_insensitive);
    }
}
