//! Configuration: the runtime `FeedConfig` and the on-disk config file.
//!
//! The file lives at `~/.fr24-feed/config.yaml` and holds the home point,
//! endpoint, filter radius, aggregator settings, and poll interval.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::aggregator::{CallsignPolicy, DEFAULT_HISTORY_DEPTH};
use crate::feed::{feed_url, DEFAULT_HOST, DEFAULT_PORT};
use crate::types::*;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

/// Everything needed to build an aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub home: Coordinates,
    pub radius_km: Option<f64>,
    pub host: String,
    pub port: u16,
    pub history_depth: usize,
    pub timeout: Duration,
    pub callsign_policy: CallsignPolicy,
}

impl FeedConfig {
    pub fn new(home: Coordinates) -> Self {
        FeedConfig {
            home,
            radius_km: None,
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            history_depth: DEFAULT_HISTORY_DEPTH,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            callsign_policy: CallsignPolicy::default(),
        }
    }

    pub fn url(&self) -> String {
        feed_url(&self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.home.is_valid() {
            return Err(FeedError::Config(format!(
                "home coordinates out of range: {}",
                self.home
            )));
        }
        if let Some(r) = self.radius_km {
            if r.is_nan() || r <= 0.0 {
                return Err(FeedError::Config(format!("radius must be positive, got {r}")));
            }
        }
        if self.host.is_empty() {
            return Err(FeedError::Config("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(FeedError::Config("port must not be 0".into()));
        }
        if self.history_depth == 0 {
            return Err(FeedError::Config("history depth must be at least 1".into()));
        }
        if self.timeout.is_zero() {
            return Err(FeedError::Config("timeout must be positive".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

/// Contents of `config.yaml`.
#[derive(Debug, Clone, PartialEq)]
pub struct FileConfig {
    pub home: HomeConfig,
    pub feed: EndpointConfig,
    pub filter: FilterConfig,
    pub aggregator: AggregatorConfig,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomeConfig {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    pub history_depth: usize,
    pub callsign_policy: CallsignPolicy,
}

impl Default for FileConfig {
    fn default() -> Self {
        FileConfig {
            home: HomeConfig {
                lat: None,
                lon: None,
            },
            feed: EndpointConfig {
                host: DEFAULT_HOST.into(),
                port: DEFAULT_PORT,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            filter: FilterConfig { radius_km: None },
            aggregator: AggregatorConfig {
                history_depth: DEFAULT_HISTORY_DEPTH,
                callsign_policy: CallsignPolicy::default(),
            },
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl FileConfig {
    /// Build and validate a `FeedConfig`. The home point is required.
    pub fn to_feed_config(&self) -> Result<FeedConfig> {
        let home = match (self.home.lat, self.home.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon),
            _ => {
                return Err(FeedError::Config(
                    "home coordinates are required (home.lat and home.lon)".into(),
                ))
            }
        };
        let config = FeedConfig {
            home,
            radius_km: self.filter.radius_km,
            host: self.feed.host.clone(),
            port: self.feed.port,
            history_depth: self.aggregator.history_depth,
            timeout: Duration::from_secs(self.feed.timeout_secs),
            callsign_policy: self.aggregator.callsign_policy,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Get the config directory path (`~/.fr24-feed/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".fr24-feed")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load `~/.fr24-feed/config.yaml`, or defaults if it is missing or unreadable.
pub fn load_config() -> FileConfig {
    let path = config_file();
    if !path.exists() {
        return FileConfig::default();
    }
    load_config_from(&path).unwrap_or_default()
}

/// Load a config file from an explicit path.
pub fn load_config_from(path: &Path) -> Result<FileConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_config(&text))
}

/// Save to `~/.fr24-feed/config.yaml`.
pub fn save_config(config: &FileConfig) -> Result<PathBuf> {
    let path = config_file();
    save_config_to(&path, config)?;
    Ok(path)
}

/// Save to an explicit path, creating parent directories.
pub fn save_config_to(path: &Path, config: &FileConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| FeedError::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config)).map_err(|e| FeedError::Config(e.to_string()))
}

/// Parse simple YAML-like config text. Unknown keys and bad values are ignored.
fn parse_config(text: &str) -> FileConfig {
    let mut config = FileConfig::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            if val.is_empty() {
                current_section = Some(key.to_string());
            } else {
                current_section = None;
                if key == "poll_interval_secs" {
                    if let Ok(v) = val.parse() {
                        config.poll_interval_secs = v;
                    }
                }
            }
            continue;
        }

        let Some(section) = current_section.as_deref() else {
            continue;
        };
        match (section, key) {
            ("home", "lat") => config.home.lat = parse_float_value(val),
            ("home", "lon") => config.home.lon = parse_float_value(val),
            ("feed", "host") => {
                if let Some(v) = parse_string_value(val) {
                    config.feed.host = v;
                }
            }
            ("feed", "port") => {
                if let Ok(v) = val.parse() {
                    config.feed.port = v;
                }
            }
            ("feed", "timeout_secs") => {
                if let Ok(v) = val.parse() {
                    config.feed.timeout_secs = v;
                }
            }
            ("filter", "radius_km") => config.filter.radius_km = parse_float_value(val),
            ("aggregator", "history_depth") => {
                if let Ok(v) = val.parse() {
                    config.aggregator.history_depth = v;
                }
            }
            ("aggregator", "callsign_policy") => {
                if let Some(p) = parse_string_value(val).and_then(|v| v.parse().ok()) {
                    config.aggregator.callsign_policy = p;
                }
            }
            _ => {}
        }
    }

    config
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(val: &str) -> Option<f64> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    val.parse().ok()
}

fn optional(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "null".into())
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &FileConfig) -> String {
    let lines = [
        "# fr24-feed configuration".to_string(),
        String::new(),
        "home:".into(),
        format!("  lat: {}", optional(config.home.lat)),
        format!("  lon: {}", optional(config.home.lon)),
        String::new(),
        "feed:".into(),
        format!("  host: \"{}\"", config.feed.host),
        format!("  port: {}", config.feed.port),
        format!("  timeout_secs: {}", config.feed.timeout_secs),
        String::new(),
        "filter:".into(),
        format!("  radius_km: {}", optional(config.filter.radius_km)),
        String::new(),
        "aggregator:".into(),
        format!("  history_depth: {}", config.aggregator.history_depth),
        format!("  callsign_policy: {}", config.aggregator.callsign_policy),
        String::new(),
        format!("poll_interval_secs: {}", config.poll_interval_secs),
    ];
    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.feed.host, "localhost");
        assert_eq!(config.feed.port, 8754);
        assert_eq!(config.feed.timeout_secs, 10);
        assert_eq!(config.aggregator.history_depth, 10);
        assert_eq!(config.aggregator.callsign_policy, CallsignPolicy::FirstSeen);
        assert!(config.home.lat.is_none());
        assert!(config.filter.radius_km.is_none());
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
home:
  lat: 51.47
  lon: -0.4543

feed:
  host: "192.168.1.20"
  port: 8080
  timeout_secs: 5

filter:
  radius_km: 50

aggregator:
  history_depth: 4
  callsign_policy: most_recent

poll_interval_secs: 30
"#;
        let config = parse_config(text);
        assert_eq!(config.home.lat, Some(51.47));
        assert_eq!(config.home.lon, Some(-0.4543));
        assert_eq!(config.feed.host, "192.168.1.20");
        assert_eq!(config.feed.port, 8080);
        assert_eq!(config.feed.timeout_secs, 5);
        assert_eq!(config.filter.radius_km, Some(50.0));
        assert_eq!(config.aggregator.history_depth, 4);
        assert_eq!(config.aggregator.callsign_policy, CallsignPolicy::MostRecent);
        assert_eq!(config.poll_interval_secs, 30);
    }

    #[test]
    fn test_parse_config_null_values() {
        let text = r#"
home:
  lat: null
  lon: ~

filter:
  radius_km: null
"#;
        let config = parse_config(text);
        assert!(config.home.lat.is_none());
        assert!(config.home.lon.is_none());
        assert!(config.filter.radius_km.is_none());
    }

    #[test]
    fn test_parse_config_ignores_bad_values() {
        let text = "feed:\n  port: not-a-port\naggregator:\n  callsign_policy: sometimes\n";
        let config = parse_config(text);
        assert_eq!(config.feed.port, 8754);
        assert_eq!(config.aggregator.callsign_policy, CallsignPolicy::FirstSeen);
    }

    #[test]
    fn test_roundtrip() {
        let mut config = FileConfig::default();
        config.home.lat = Some(35.5);
        config.home.lon = Some(-82.5);
        config.filter.radius_km = Some(25.5);
        config.feed.host = "radar.local".into();
        config.aggregator.callsign_policy = CallsignPolicy::MostRecent;

        let parsed = parse_config(&serialize_config(&config));
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = FileConfig::default();
        config.home.lat = Some(51.5);
        config.home.lon = Some(-0.1);
        save_config_to(&path, &config).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, FeedError::Io(_)));
    }

    #[test]
    fn test_to_feed_config_requires_home() {
        let err = FileConfig::default().to_feed_config().unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[test]
    fn test_to_feed_config() {
        let mut file = FileConfig::default();
        file.home.lat = Some(51.5);
        file.home.lon = Some(-0.1);
        file.filter.radius_km = Some(50.0);
        file.feed.timeout_secs = 3;

        let config = file.to_feed_config().unwrap();
        assert_eq!(config.home, Coordinates::new(51.5, -0.1));
        assert_eq!(config.radius_km, Some(50.0));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.url(), "http://localhost:8754/flights.json");
    }

    #[test]
    fn test_validate() {
        let home = Coordinates::new(51.5, -0.1);
        assert!(FeedConfig::new(home).validate().is_ok());

        let mut bad = FeedConfig::new(Coordinates::new(95.0, 0.0));
        assert!(bad.validate().is_err());

        bad = FeedConfig::new(home);
        bad.radius_km = Some(0.0);
        assert!(bad.validate().is_err());

        bad = FeedConfig::new(home);
        bad.history_depth = 0;
        assert!(bad.validate().is_err());

        bad = FeedConfig::new(home);
        bad.port = 0;
        assert!(bad.validate().is_err());
    }
}
