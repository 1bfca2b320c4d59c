use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub mirror: MirrorConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base address of the product resource; `products` is joined onto it
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Transport-level request timeout
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_base_url() -> String {
  "https://fakestoreapi.com".to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MirrorBackend {
  /// Mirror to a SQLite file in the data directory
  #[default]
  Sqlite,
  /// Headless use: nothing is read or written
  None,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MirrorConfig {
  #[serde(default)]
  pub backend: MirrorBackend,
  /// Database path (defaults to $XDG_DATA_HOME/c9s/mirror.db)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Filter directive used when C9S_LOG is unset
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Log file (defaults to $XDG_DATA_HOME/c9s/c9s.log)
  pub file: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      file: None,
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./c9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/c9s/config.yaml
  ///
  /// Without a file, defaults are used. `C9S_API_URL` overrides the base URL.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    Ok(config.with_env_overrides())
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("c9s.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("c9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file is valid and means "all defaults"
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }

  fn with_env_overrides(mut self) -> Self {
    if let Ok(url) = std::env::var("C9S_API_URL") {
      if !url.trim().is_empty() {
        self.api.base_url = url;
      }
    }
    self
  }

  /// Directory for the mirror database and log file.
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("c9s"))
  }

  pub fn mirror_path(&self) -> Result<PathBuf> {
    match &self.mirror.path {
      Some(p) => Ok(p.clone()),
      None => Ok(Self::data_dir()?.join("mirror.db")),
    }
  }

  pub fn log_path(&self) -> Result<PathBuf> {
    match &self.log.file {
      Some(p) => Ok(p.clone()),
      None => Ok(Self::data_dir()?.join("c9s.log")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_config_uses_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.api.base_url, "https://fakestoreapi.com");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.mirror.backend, MirrorBackend::Sqlite);
    assert_eq!(config.log.level, "info");
  }

  #[test]
  fn test_partial_config() {
    let yaml = r#"
api:
  base_url: http://localhost:3000
mirror:
  backend: none
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:3000");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.mirror.backend, MirrorBackend::None);
    assert!(config.mirror.path.is_none());
  }

  #[test]
  fn test_unknown_backend_is_rejected() {
    let yaml = "mirror:\n  backend: redis\n";
    assert!(Config::parse(yaml).is_err());
  }

  #[test]
  fn test_explicit_mirror_path_wins() {
    let yaml = "mirror:\n  path: /tmp/products.db\n";
    let config = Config::parse(yaml).unwrap();
    assert_eq!(
      config.mirror_path().unwrap(),
      PathBuf::from("/tmp/products.db")
    );
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
