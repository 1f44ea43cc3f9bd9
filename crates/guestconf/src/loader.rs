//! Config file discovery, table merging, and environment variable overlay.

use crate::{ConfigError, InfraConfig, InvitationConfig, SiteConfig};
use serde::de::DeserializeOwned;
use std::env;
use std::path::{Path, PathBuf};
use toml::Table;

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local). Discovered files are
/// only returned if they exist; an explicit `cli_path` replaces the local
/// file and is always returned, so a missing one fails at load time.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/invitation/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("invitation/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("invitation.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read and parse one TOML file into a raw table.
pub fn load_table(path: &Path) -> Result<Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Deep-merge `overlay` into `base`. Keys in `overlay` win; nested tables
/// merge key by key so a later file can override a single setting.
pub fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Build a config from a merged table. Missing sections take defaults.
pub fn from_table(table: &Table) -> Result<InvitationConfig, ConfigError> {
    let mut config = InvitationConfig {
        infra: InfraConfig {
            paths: section(table, "paths")?,
            bind: section(table, "bind")?,
            telemetry: section(table, "telemetry")?,
        },
        site: SiteConfig {
            event: section(table, "event")?,
            quote: section(table, "quote")?,
        },
    };

    let paths = &mut config.infra.paths;
    paths.data_dir = expand_path(&paths.data_dir.to_string_lossy());
    paths.static_dir = expand_path(&paths.static_dir.to_string_lossy());

    Ok(config)
}

fn section<T: DeserializeOwned + Default>(table: &Table, name: &str) -> Result<T, ConfigError> {
    match table.get(name) {
        Some(value) => value
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Section {
                section: name.to_string(),
                message: e.to_string(),
            }),
        None => Ok(T::default()),
    }
}

/// Apply environment variable overrides from the process environment.
pub fn apply_env_overrides(config: &mut InvitationConfig, sources: &mut ConfigSources) {
    apply_overrides(config, sources, |key| env::var(key).ok());
}

/// Apply overrides from an arbitrary variable lookup.
///
/// Later entries in each group win: `PORT` is read before
/// `INVITATION_HTTP_PORT`, `API_KEY` before `GEMINI_API_KEY`.
pub fn apply_overrides<F>(config: &mut InvitationConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let mut read = |key: &str| {
        let value = lookup(key)?;
        sources.env_overrides.push(key.to_string());
        Some(value)
    };

    if let Some(v) = read("INVITATION_DATA_DIR") {
        config.infra.paths.data_dir = expand_path(&v);
    }
    if let Some(v) = read("INVITATION_STATIC_DIR") {
        config.infra.paths.static_dir = expand_path(&v);
    }

    if let Some(v) = read("INVITATION_HOST") {
        config.infra.bind.host = v;
    }
    for key in ["PORT", "INVITATION_HTTP_PORT"] {
        if let Some(port) = read(key).and_then(|v| v.trim().parse().ok()) {
            config.infra.bind.http_port = port;
        }
    }

    for key in ["OTEL_EXPORTER_OTLP_ENDPOINT", "INVITATION_OTLP_ENDPOINT"] {
        if let Some(v) = read(key) {
            config.infra.telemetry.otlp_endpoint = v;
        }
    }
    for key in ["RUST_LOG", "INVITATION_LOG_LEVEL"] {
        if let Some(v) = read(key) {
            config.infra.telemetry.log_level = v;
        }
    }

    if let Some(v) = read("INVITATION_PHONE") {
        config.site.event.phone = v;
    }
    for key in ["API_KEY", "GEMINI_API_KEY"] {
        if let Some(v) = read(key) {
            config.site.quote.api_key = v;
        }
    }
    if let Some(v) = read("INVITATION_QUOTE_MODEL") {
        config.site.quote.model = v;
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        return directories::BaseDirs::new()
            .map(|d| d.home_dir().join(stripped))
            .unwrap_or_else(|| PathBuf::from(path));
    }

    if let Some(stripped) = path.strip_prefix('$') {
        // $VAR or $VAR/rest/of/path
        let (var_name, rest) = match stripped.find('/') {
            Some(pos) => (&stripped[..pos], Some(&stripped[pos + 1..])),
            None => (stripped, None),
        };
        return match (env::var(var_name), rest) {
            (Ok(value), Some(rest)) => PathBuf::from(value).join(rest),
            (Ok(value), None) => PathBuf::from(value),
            (Err(_), _) => PathBuf::from(path),
        };
    }

    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn parse(toml: &str) -> Table {
        toml.parse().unwrap()
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/wedding/data");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().ends_with("wedding/data"));
    }

    #[test]
    fn test_expand_path_absolute() {
        assert_eq!(expand_path("/srv/wedding"), PathBuf::from("/srv/wedding"));
    }

    #[test]
    fn test_expand_path_unknown_var_is_literal() {
        let expanded = expand_path("$INVITATION_SURELY_UNSET_VAR/data");
        assert_eq!(expanded, PathBuf::from("$INVITATION_SURELY_UNSET_VAR/data"));
    }

    #[test]
    fn test_discover_keeps_explicit_path_last() {
        let explicit = Path::new("/nonexistent/invitation-wedding.toml");
        let files = discover_config_files_with_override(Some(explicit));
        assert_eq!(files.last().map(PathBuf::as_path), Some(explicit));
        assert!(!files.contains(&PathBuf::from("invitation.toml")));
    }

    #[test]
    fn test_minimal_table() {
        let config = from_table(&parse(
            r#"
[paths]
data_dir = "/srv/wedding/data"
"#,
        ))
        .unwrap();

        assert_eq!(config.infra.paths.data_dir, PathBuf::from("/srv/wedding/data"));
        assert_eq!(config.infra.paths.static_dir, PathBuf::from("public"));
        assert_eq!(config.infra.bind.http_port, 3000);
        assert_eq!(config.site.event.groom, "Yamin");
    }

    #[test]
    fn test_full_table() {
        let config = from_table(&parse(
            r#"
[paths]
data_dir = "/data"
static_dir = "/www"

[bind]
host = "127.0.0.1"
http_port = 8080

[telemetry]
otlp_endpoint = "127.0.0.1:4317"
log_level = "debug"

[event]
groom = "Andi"
bride = "Rina"
phone = "628123"

[quote]
api_key = "secret"
model = "gemini-test"
timeout_ms = 2500
"#,
        ))
        .unwrap();

        assert_eq!(config.infra.paths.static_dir, PathBuf::from("/www"));
        assert_eq!(config.infra.bind.addr(), "127.0.0.1:8080");
        assert!(config.infra.telemetry.otlp_enabled());
        assert_eq!(config.infra.telemetry.log_level, "debug");
        assert_eq!(config.site.event.groom, "Andi");
        assert_eq!(config.site.event.bride, "Rina");
        assert_eq!(config.site.event.phone, "628123");
        assert_eq!(config.site.quote.api_key, "secret");
        assert_eq!(config.site.quote.model, "gemini-test");
        assert_eq!(config.site.quote.timeout_ms, 2500);
        assert!(config.site.quote.endpoint.starts_with("https://"));
    }

    #[test]
    fn test_bad_section_type() {
        let err = from_table(&parse("[bind]\nhttp_port = \"eighty\"\n")).unwrap_err();
        assert!(matches!(err, ConfigError::Section { ref section, .. } if section == "bind"));
    }

    #[test]
    fn test_merge_overrides_single_key() {
        let mut base = parse(
            r#"
[bind]
host = "127.0.0.1"
http_port = 8080
"#,
        );
        merge_tables(&mut base, parse("[bind]\nhttp_port = 3000\n"));

        let config = from_table(&base).unwrap();
        assert_eq!(config.infra.bind.host, "127.0.0.1");
        // Overlay wins even when it sets the compiled default
        assert_eq!(config.infra.bind.http_port, 3000);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "4000"),
            ("INVITATION_DATA_DIR", "/var/lib/invitation"),
            ("API_KEY", "from-api-key"),
            ("GEMINI_API_KEY", "from-gemini"),
            ("INVITATION_PHONE", "62811"),
        ]
        .into_iter()
        .collect();

        let mut config = InvitationConfig::default();
        let mut sources = ConfigSources::default();
        apply_overrides(&mut config, &mut sources, |key| {
            vars.get(key).map(|v| v.to_string())
        });

        assert_eq!(config.infra.bind.http_port, 4000);
        assert_eq!(config.infra.paths.data_dir, PathBuf::from("/var/lib/invitation"));
        assert_eq!(config.site.quote.api_key, "from-gemini");
        assert_eq!(config.site.event.phone, "62811");
        assert_eq!(
            sources.env_overrides,
            vec!["INVITATION_DATA_DIR", "PORT", "INVITATION_PHONE", "API_KEY", "GEMINI_API_KEY"]
        );
    }

    #[test]
    fn test_unparseable_port_ignored() {
        let mut config = InvitationConfig::default();
        let mut sources = ConfigSources::default();
        apply_overrides(&mut config, &mut sources, |key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        });
        assert_eq!(config.infra.bind.http_port, 3000);
    }
}
