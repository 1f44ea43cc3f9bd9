//! Configuration loading for the invitation server.
//!
//! # Configuration Layout
//!
//! - **Infrastructure** (`InfraConfig`): paths, bind address, telemetry.
//! - **Site** (`SiteConfig`): the couple's names and WhatsApp number, and the
//!   quote backend.
//!
//! # Usage
//!
//! ```rust,no_run
//! use guestconf::InvitationConfig;
//!
//! let config = InvitationConfig::load_from(None).expect("Failed to load config");
//! println!("Guestbook in: {}", config.infra.paths.data_dir.display());
//! println!("Listening on: {}", config.infra.bind.addr());
//! ```
//!
//! # Config File Locations
//!
//! Files are merged in order (later wins, key by key):
//! 1. `/etc/invitation/config.toml` (system)
//! 2. `~/.config/invitation/config.toml` (user)
//! 3. `./invitation.toml` or the `--config` path (local override)
//! 4. Environment variables (`INVITATION_*`, `PORT`, `GEMINI_API_KEY`, ...)
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! data_dir = "/var/lib/invitation"
//! static_dir = "/srv/invitation/dist"
//!
//! [bind]
//! http_port = 3000
//!
//! [telemetry]
//! otlp_endpoint = "127.0.0.1:4317"
//! log_level = "info"
//!
//! [event]
//! groom = "Yamin"
//! bride = "Anisa"
//! phone = "6285156684814"
//!
//! [quote]
//! model = "gemini-3-flash-preview"
//! ```

pub mod infra;
pub mod loader;
pub mod site;

pub use infra::{BindConfig, InfraConfig, PathsConfig, TelemetryConfig};
pub use loader::{discover_config_files_with_override, ConfigSources};
pub use site::{EventConfig, QuoteConfig, SiteConfig};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid [{section}] section: {message}")]
    Section { section: String, message: String },
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvitationConfig {
    pub infra: InfraConfig,
    pub site: SiteConfig,
}

impl InvitationConfig {
    /// Load configuration with an explicit file replacing `./invitation.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in loader::discover_config_files_with_override(config_path) {
            let table = loader::load_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let mut config = loader::from_table(&merged)?;
        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Render the effective config as TOML. The API key is masked.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# Invitation Configuration\n\n");

        output.push_str("[paths]\n");
        output.push_str(&format!(
            "data_dir = \"{}\"\n",
            self.infra.paths.data_dir.display()
        ));
        output.push_str(&format!(
            "static_dir = \"{}\"\n",
            self.infra.paths.static_dir.display()
        ));

        output.push_str("\n[bind]\n");
        output.push_str(&format!("host = \"{}\"\n", self.infra.bind.host));
        output.push_str(&format!("http_port = {}\n", self.infra.bind.http_port));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!(
            "otlp_endpoint = \"{}\"\n",
            self.infra.telemetry.otlp_endpoint
        ));
        output.push_str(&format!(
            "log_level = \"{}\"\n",
            self.infra.telemetry.log_level
        ));

        output.push_str("\n[event]\n");
        output.push_str(&format!("groom = \"{}\"\n", self.site.event.groom));
        output.push_str(&format!("bride = \"{}\"\n", self.site.event.bride));
        output.push_str(&format!("phone = \"{}\"\n", self.site.event.phone));

        output.push_str("\n[quote]\n");
        let api_key = if self.site.quote.has_api_key() { "********" } else { "" };
        output.push_str(&format!("api_key = \"{}\"\n", api_key));
        output.push_str(&format!("model = \"{}\"\n", self.site.quote.model));
        output.push_str(&format!("endpoint = \"{}\"\n", self.site.quote.endpoint));
        output.push_str(&format!("timeout_ms = {}\n", self.site.quote.timeout_ms));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = InvitationConfig::default();
        assert_eq!(config.infra.bind.http_port, 3000);
        assert_eq!(config.site.event.bride, "Anisa");
        assert!(!config.site.quote.has_api_key());
    }

    #[test]
    fn test_to_toml_round_trips_through_loader() {
        let config = InvitationConfig::default();
        let rendered = config.to_toml();
        assert!(rendered.contains("[paths]"));
        assert!(rendered.contains("[event]"));

        let table: toml::Table = rendered.parse().unwrap();
        let reparsed = loader::from_table(&table).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_to_toml_masks_api_key() {
        let mut config = InvitationConfig::default();
        config.site.quote.api_key = "AIza-very-secret".to_string();
        let rendered = config.to_toml();
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("api_key = \"********\""));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[event]\ngroom = \"Andi\"\n[bind]\nhost = \"127.0.0.1\"").unwrap();

        let (config, sources) =
            InvitationConfig::load_with_sources_from(Some(file.path())).unwrap();
        assert_eq!(config.site.event.groom, "Andi");
        assert_eq!(config.site.event.bride, "Anisa");
        assert_eq!(config.infra.bind.host, "127.0.0.1");
        assert_eq!(sources.files.last().map(PathBuf::as_path), Some(file.path()));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("typo.toml");

        let err = InvitationConfig::load_from(Some(&missing)).unwrap_err();
        match err {
            ConfigError::FileRead { path, .. } => assert_eq!(path, missing),
            other => panic!("expected FileRead, got {other:?}"),
        }
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bind\nhttp_port = 1").unwrap();

        let err = InvitationConfig::load_from(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
