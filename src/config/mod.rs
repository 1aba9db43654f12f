//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/poi-median/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use crate::format::get_formatter;
use crate::query::sort::{SortDirection, SortField};
use crate::spatial::{Coordinates, Viewport};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default values for queries and output
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Default map view
    #[serde(default)]
    pub map: MapConfig,

    /// Analysis backend settings
    #[serde(default)]
    pub source: SourceConfig,

    /// URL generation settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Default values for queries and output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Rows per table page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Default sort column
    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    /// Default sort direction ("asc" or "desc")
    #[serde(default = "default_direction")]
    pub direction: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Map view used when there is nothing to focus on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    #[serde(default = "default_center_lng")]
    pub center_lng: f64,

    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

/// Analysis backend settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceConfig {
    /// Results endpoint of the analysis backend (used by `analyze --remote`)
    #[serde(default)]
    pub url: String,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_sort_by() -> String {
    DEFAULT_SORT_BY.to_string()
}
fn default_direction() -> String {
    DEFAULT_DIRECTION.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_center_lat() -> f64 {
    DEFAULT_CENTER_LAT
}
fn default_center_lng() -> f64 {
    DEFAULT_CENTER_LNG
}
fn default_zoom() -> f64 {
    DEFAULT_ZOOM
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lng},{zoom}z".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map={zoom}/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "here".to_string(),
        "https://wego.here.com/?map={lat},{lng},{zoom}".to_string(),
    );
    providers
}

// Implement Default traits
impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            server: ServerConfig::default(),
            map: MapConfig::default(),
            source: SourceConfig::default(),
            url: UrlConfig::default(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            format: default_format(),
            sort_by: default_sort_by(),
            direction: default_direction(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lng: default_center_lng(),
            zoom: default_zoom(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from a specific path, creating it if missing
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            let config: Config = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Check values that serde cannot constrain
    pub fn validate(&self) -> Result<()> {
        if self.defaults.page_size == 0 {
            return Err(Error::Config("defaults.page_size must be at least 1".to_string()));
        }
        self.defaults
            .sort_by
            .parse::<SortField>()
            .map_err(|e| Error::Config(format!("defaults.sort_by: {}", e)))?;
        self.defaults
            .direction
            .parse::<SortDirection>()
            .map_err(|e| Error::Config(format!("defaults.direction: {}", e)))?;
        if get_formatter(&self.defaults.format).is_none() {
            return Err(Error::Config(format!(
                "defaults.format: Unknown format: {}",
                self.defaults.format
            )));
        }
        if !self.map.zoom.is_finite() || self.map.zoom < 0.0 {
            return Err(Error::Config(format!("map.zoom: Invalid zoom value: {}", self.map.zoom)));
        }
        Coordinates::new(self.map.center_lat, self.map.center_lng).validate()?;
        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "page_size"] => Some(self.defaults.page_size.to_string()),
            ["defaults", "format"] => Some(self.defaults.format.clone()),
            ["defaults", "sort_by"] => Some(self.defaults.sort_by.clone()),
            ["defaults", "direction"] => Some(self.defaults.direction.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["map", "center_lat"] => Some(self.map.center_lat.to_string()),
            ["map", "center_lng"] => Some(self.map.center_lng.to_string()),
            ["map", "zoom"] => Some(self.map.zoom.to_string()),

            ["source", "url"] => Some(self.source.url.clone()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "page_size"] => {
                self.defaults.page_size = value
                    .parse()
                    .ok()
                    .filter(|size: &usize| *size > 0)
                    .ok_or_else(|| Error::Config(format!("Invalid page size: {}", value)))?;
            }
            ["defaults", "format"] => {
                self.defaults.format = value.to_string();
            }
            ["defaults", "sort_by"] => {
                self.defaults.sort_by = value.to_string();
            }
            ["defaults", "direction"] => {
                self.defaults.direction = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid port value: {}", value)))?;
            }

            ["map", "center_lat"] => {
                self.map.center_lat = parse_degrees(value, -90.0, 90.0)?;
            }
            ["map", "center_lng"] => {
                self.map.center_lng = parse_degrees(value, -180.0, 180.0)?;
            }
            ["map", "zoom"] => {
                self.map.zoom = value
                    .parse()
                    .ok()
                    .filter(|zoom: &f64| zoom.is_finite() && *zoom >= 0.0)
                    .ok_or_else(|| Error::Config(format!("Invalid zoom value: {}", value)))?;
            }

            ["source", "url"] => {
                self.source.url = value.to_string();
            }

            ["url", "default"] => {
                self.url.default = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "defaults.page_size",
            "defaults.format",
            "defaults.sort_by",
            "defaults.direction",
            "server.host",
            "server.port",
            "map.center_lat",
            "map.center_lng",
            "map.zoom",
            "source.url",
            "url.default",
        ]
    }

    /// Format a map URL for a viewport using the specified provider
    ///
    /// Replaces {lat}, {lng} and {zoom} placeholders; zoom is rounded to a
    /// whole level since most providers reject fractions.
    pub fn format_url(&self, provider: Option<&str>, viewport: &Viewport) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self
            .url
            .providers
            .get(provider_name)
            .ok_or_else(|| Error::Config(format!("Unknown URL provider: {}", provider_name)))?;

        Ok(template
            .replace("{lat}", &viewport.center.lat.to_string())
            .replace("{lng}", &viewport.center.lng.to_string())
            .replace("{zoom}", &(viewport.zoom.round() as i64).to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_degrees(value: &str, min: f64, max: f64) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or_else(|| Error::Config(format!("Invalid coordinate value: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn viewport(lat: f64, lng: f64, zoom: f64) -> Viewport {
        Viewport {
            center: Coordinates::new(lat, lng),
            zoom,
            radius_meters: None,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.defaults.page_size, 10);
        assert_eq!(config.defaults.format, "text");
        assert_eq!(config.server.port, 7295);
        assert_eq!(config.map.zoom, 12.0);
        assert!(config.source.url.is_empty());
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("defaults.sort_by"), Some("id".to_string()));

        config.set("defaults.sort_by", "distance").unwrap();
        assert_eq!(config.get("defaults.sort_by"), Some("distance".to_string()));

        config.set("defaults.page_size", "25").unwrap();
        assert_eq!(config.defaults.page_size, 25);

        config.set("map.center_lat", "19.4326").unwrap();
        assert_eq!(config.map.center_lat, 19.4326);
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("defaults.page_size", "0").is_err());
        assert!(config.set("defaults.page_size", "ten").is_err());
        assert!(config.set("server.port", "99999").is_err());
        assert!(config.set("map.center_lat", "95").is_err());
    }

    #[test]
    fn test_format_url() {
        let config = Config::default();
        let view = viewport(20.7214, -103.3905, 12.4);

        let url = config.format_url(Some("google"), &view).unwrap();
        assert_eq!(url, "https://www.google.com/maps/@20.7214,-103.3905,12z");

        let url = config.format_url(Some("openstreetmap"), &view).unwrap();
        assert_eq!(url, "https://www.openstreetmap.org/#map=12/20.7214/-103.3905");
    }

    #[test]
    fn test_format_url_default_provider() {
        let config = Config::default();
        let url = config.format_url(None, &viewport(20.7, -103.4, 13.0)).unwrap();
        assert!(url.contains("google.com"));
    }

    #[test]
    fn test_format_url_unknown_provider() {
        let config = Config::default();
        assert!(config
            .format_url(Some("unknown"), &viewport(20.7, -103.4, 13.0))
            .is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("poi-median").join("config.toml");

        let mut config = Config::default();
        config.defaults.page_size = 50;
        config.source.url = "http://localhost:5000/api/results".to_string();
        config.save_to(path.clone()).unwrap();

        let loaded = Config::load_from(path).unwrap();
        assert_eq!(loaded.defaults.page_size, 50);
        assert_eq!(loaded.source.url, "http://localhost:5000/api/results");
    }

    #[test]
    fn test_load_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config::load_from(path.clone()).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 7295);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[defaults]\npage_size = 0\n").unwrap();

        assert!(matches!(Config::load_from(path), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_rejects_unusable_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        for content in [
            "[defaults]\nsort_by = \"height\"\n",
            "[defaults]\ndirection = \"sideways\"\n",
            "[defaults]\nformat = \"gpx\"\n",
            "[map]\nzoom = -3.0\n",
        ] {
            fs::write(&path, content).unwrap();
            match Config::load_from(path.clone()) {
                Err(Error::Config(msg)) => {
                    assert!(msg.contains("defaults.") || msg.contains("map.zoom"), "{}", msg)
                }
                other => panic!("{:?} loaded: {:?}", content, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_set_rejects_bad_zoom() {
        let mut config = Config::default();
        assert!(config.set("map.zoom", "NaN").is_err());
        assert!(config.set("map.zoom", "-1").is_err());
        assert!(config.set("map.zoom", "inf").is_err());
        assert_eq!(config.map.zoom, 12.0);

        config.set("map.zoom", "14.5").unwrap();
        assert_eq!(config.map.zoom, 14.5);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.server.host, "127.0.0.1");
        assert_eq!(loaded.defaults.page_size, 10);
        assert!(loaded.url.providers.contains_key("here"));
    }

    #[test]
    fn test_serialization_format() {
        let toml = toml::to_string_pretty(&Config::default()).unwrap();

        assert!(toml.contains("[defaults]"));
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[map]"));
        assert!(toml.contains("[url.providers]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7295");
    }

    #[test]
    fn test_available_keys() {
        let keys = Config::available_keys();
        for key in &keys {
            assert!(Config::default().get(key).is_some(), "{} has no getter", key);
        }
        assert!(keys.contains(&"map.zoom"));
    }
}
