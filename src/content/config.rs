//! Content configuration
//!
//! Loaded from a RON file (`assets/config.ron` unless `ABB_CONFIG` says
//! otherwise). A missing file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ContentError;

/// Default config file location
pub const CONFIG_FILE: &str = "assets/config.ron";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "ABB_CONFIG";

/// Directory name every payload entry in the package is namespaced under
pub const DEFAULT_ARCHIVE_ROOT: &str = "content_package";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Bundled content package on disk
    pub package_path: PathBuf,
    /// Private data directory for temporary files (None = platform default)
    pub data_dir: Option<PathBuf>,
    /// Archive root directory name
    pub archive_root: String,
    /// Enemy parameter resource spawned by the demo
    pub enemy: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            package_path: PathBuf::from("assets/content_package.zip"),
            data_dir: None,
            archive_root: DEFAULT_ARCHIVE_ROOT.to_string(),
            enemy: "content:///enemies/crawler.txt".to_string(),
        }
    }
}

impl ContentConfig {
    /// Load from the default location (or `ABB_CONFIG`)
    pub fn load() -> Result<Self, ContentError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Load from a specific file, falling back to defaults if it is absent
    pub fn load_from(path: &Path) -> Result<Self, ContentError> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(contents: &str) -> Result<Self, ContentError> {
        ron::from_str(contents).map_err(|e| ContentError::Config(e.to_string()))
    }

    /// Resolved data directory
    ///
    /// `data_dir` if set, else `<local data dir>/abb`, else `<temp dir>/abb`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("abb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ContentConfig::from_ron(r#"(data_dir: Some("/tmp/abb-test"))"#).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/abb-test")));
        assert_eq!(config.archive_root, DEFAULT_ARCHIVE_ROOT);
        assert_eq!(config.resolved_data_dir(), PathBuf::from("/tmp/abb-test"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContentConfig::load_from(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, ContentConfig::default());
    }

    #[test]
    fn test_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid ron data (").unwrap();
        assert!(matches!(
            ContentConfig::load_from(file.path()),
            Err(ContentError::Config(_))
        ));
    }

    #[test]
    fn test_default_data_dir_is_namespaced() {
        let config = ContentConfig::default();
        assert!(config.resolved_data_dir().ends_with("abb"));
    }
}
