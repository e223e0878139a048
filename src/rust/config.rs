use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::bundle::LoadOptions;
use crate::form::Locale;

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "MUSHROOM_FORM_HOME";

pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub images_dir: PathBuf,
    pub model_sha256: Option<String>,
    pub locale: Locale,
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = default_home();
        Self {
            model_path: home.join("model.json"),
            images_dir: home.join("images"),
            model_sha256: None,
            locale: Locale::default(),
        }
    }
}

impl AppConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            expected_sha256: self.model_sha256.clone(),
            ..LoadOptions::default()
        }
    }
}

/// Settings of the HTTP surface.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
        }
    }
}

/// Returns the data directory holding the model and images
pub fn default_home() -> PathBuf {
    // 1. Check environment variable
    if let Ok(path) = env::var(HOME_ENV) {
        return PathBuf::from(path);
    }

    // 2. Use platform-specific data directory
    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("mushroom-form");
    }

    // 3. Fallback to user's home directory
    if let Some(home_dir) = dirs::home_dir() {
        return home_dir.join(".local").join("share").join("mushroom-form");
    }

    // 4. If all else fails, use system temp directory
    env::temp_dir().join("mushroom-form")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_live_under_home() {
        let config = AppConfig::default();
        let home = default_home();
        assert_eq!(config.model_path, home.join("model.json"));
        assert_eq!(config.images_dir, home.join("images"));
        assert_eq!(config.locale, Locale::Ru);
    }

    #[test]
    fn test_default_bind_matches_constant() {
        assert_eq!(ServerConfig::default().bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_load_options_carry_digest() {
        let config = AppConfig {
            model_sha256: Some("abc".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.load_options().expected_sha256.as_deref(), Some("abc"));
    }
}
