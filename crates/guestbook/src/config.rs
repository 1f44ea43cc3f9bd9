//! Guestbook store configuration.
//!
//! Default location: `./data/wishes.json`, next to the served site.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default file name of the guestbook document inside `data_dir`.
pub const DEFAULT_FILE_NAME: &str = "wishes.json";

/// Configuration for the guestbook store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the guestbook document. Created on first use.
    pub data_dir: PathBuf,

    /// File name of the JSON document inside `data_dir`.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::with_data_dir("data")
    }
}

impl StoreConfig {
    /// Create a config storing `wishes.json` under `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_name: default_file_name(),
        }
    }

    /// Full path of the guestbook document.
    pub fn wishes_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Directory temp files are staged in before the atomic rename.
    ///
    /// Always the document's own directory, so the rename never crosses
    /// filesystems.
    pub fn staging_dir(&self) -> &Path {
        if self.data_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            &self.data_dir
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.wishes_path(), PathBuf::from("data/wishes.json"));
    }

    #[test]
    fn test_custom_file_name() {
        let config = StoreConfig {
            data_dir: PathBuf::from("/srv/wedding"),
            file_name: "guestbook.json".to_string(),
        };
        assert_eq!(
            config.wishes_path(),
            PathBuf::from("/srv/wedding/guestbook.json")
        );
    }

    #[test]
    fn test_empty_data_dir_stages_in_cwd() {
        let config = StoreConfig::with_data_dir("");
        assert_eq!(config.staging_dir(), Path::new("."));
    }

    #[test]
    fn test_file_name_defaults_when_missing() {
        let config: StoreConfig = serde_json::from_str(r#"{"data_dir": "/tmp/x"}"#).unwrap();
        assert_eq!(config.file_name, DEFAULT_FILE_NAME);
    }
}
