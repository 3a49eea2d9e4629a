use serde::Deserialize;
use std::path::PathBuf;

/// Issue search settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Free-text search terms. `is:issue ... sort:updated` is always
    /// appended server-side and never replaces these.
    pub query: String,
    /// Page size for cursor pagination.
    pub page_size: u32,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            query: "is:open involves:@me".to_string(),
            page_size: 50,
        }
    }
}

/// Stack inventory settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Inventory endpoint, queried once per session with a bearer token.
    pub api_url: String,
    /// Host used to derive per-stack dashboard URLs.
    pub dashboard_host: String,
    /// Organization slug in dashboard URLs.
    pub org: String,
    /// Credential file holding `{ "id_token": "..." }`, relative to the
    /// home directory unless absolute.
    pub credentials_file: PathBuf,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.terramate.io/v1/stacks".to_string(),
            dashboard_host: "cloud.terramate.io".to_string(),
            org: "terramate-demo".to_string(),
            credentials_file: PathBuf::from(".terramate.d/credentials.tmrc.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// "stacks" or "issues"; the view shown at startup.
    pub default_view: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub github: GithubConfig,
    pub cloud: CloudConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("stackdash").join("config.toml"))
}

impl Config {
    /// Load the user config, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring malformed config {}: {}", path.display(), err);
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[general]
default_view = "issues"

[github]
query = "org:acme label:bug"
page_size = 25

[cloud]
api_url = "https://api.example.io/v1/stacks"
dashboard_host = "cloud.example.io"
org = "acme"
credentials_file = ".example.d/credentials.json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.default_view.as_deref(), Some("issues"));
        assert_eq!(config.github.query, "org:acme label:bug");
        assert_eq!(config.github.page_size, 25);
        assert_eq!(config.cloud.org, "acme");
        assert_eq!(
            config.cloud.credentials_file,
            PathBuf::from(".example.d/credentials.json")
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.github.page_size, 50);
        assert_eq!(config.cloud.dashboard_host, "cloud.terramate.io");
        assert!(config.general.default_view.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str("[github]\nquery = \"org:acme\"\n").unwrap();
        assert_eq!(config.github.query, "org:acme");
        assert_eq!(config.github.page_size, 50);
    }
}
