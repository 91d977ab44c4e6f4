use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::mail::imap_client::DEFAULT_WINDOW;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub imap_server: String,
    pub imap_port: u16,
    pub folder: String,
    pub fetch_count: usize,
    /// Pre-fills the address field of the login form.
    pub user_email: Option<String>,

    pub api_base: String,
    pub model: String,
    pub temperature: f64,
    /// Name of the environment variable holding the model API key.
    pub api_key_env: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            imap_server: "imap.gmail.com".to_string(),
            imap_port: 993,
            folder: "INBOX".to_string(),
            fetch_count: DEFAULT_WINDOW,
            user_email: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("inbox_mind"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Read `path`, writing a template with the defaults first if it does not exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let sample = Config::default();
        fs::write(path, toml::to_string_pretty(&sample)?)?;
        log::info!("wrote default config to {}", path.display());
        return Ok(sample);
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gets_a_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
        assert_eq!(load_config_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "imap_server = \"imap.fastmail.com\"\nfetch_count = 3\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.imap_server, "imap.fastmail.com");
        assert_eq!(cfg.fetch_count, 3);
        assert_eq!(cfg.imap_port, 993);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.api_key_env, "GROQ_API_KEY");
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "imap_port = \"not a number\"").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
