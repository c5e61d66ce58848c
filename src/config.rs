use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, OptionExt, Result, eyre};
use serde::{Deserialize, Serialize};

use crate::resolver::types::MAX_BATCH_SIZE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Track ids per track-detail request, at most 400
    pub batch_size: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub netease: NetEaseConfig,
    pub qq_music: QqMusicConfig,
    pub qishui: QishuiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetEaseConfig {
    pub playlist_url: String,
    pub tracks_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QqMusicConfig {
    pub playlist_url: String,
    pub tracks_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QishuiConfig {
    pub playlist_url: String,
    pub tracks_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            request_timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36".to_string(),
            netease: NetEaseConfig::default(),
            qq_music: QqMusicConfig::default(),
            qishui: QishuiConfig::default(),
        }
    }
}

impl Default for NetEaseConfig {
    fn default() -> Self {
        Self {
            playlist_url: "https://music.163.com/api/v6/playlist/detail".to_string(),
            tracks_url: "https://music.163.com/api/v3/song/detail".to_string(),
        }
    }
}

impl Default for QqMusicConfig {
    fn default() -> Self {
        Self {
            playlist_url: "https://c.y.qq.com/qzone/fcg-bin/fcg_ucc_getcdinfo_byids_cp.fcg"
                .to_string(),
            tracks_url: "https://u.y.qq.com/cgi-bin/musicu.fcg".to_string(),
        }
    }
}

impl Default for QishuiConfig {
    fn default() -> Self {
        Self {
            playlist_url: "https://api.qishui.com/luna/pc/playlist/detail".to_string(),
            tracks_url: "https://api.qishui.com/luna/pc/track/multi".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("songlist-resolver").join("config.toml"))
    }

    /// Load the default config file, or built-in defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to the default path, unless a file is already there
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_eyre("Could not determine config directory")?;
        Self::write_default_to(&path)?;
        Ok(path)
    }

    fn write_default_to(path: &Path) -> Result<()> {
        if path.exists() {
            tracing::info!("Config file already exists at {}", path.display());
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(eyre!(
                "batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE,
                self.batch_size
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(eyre!("request_timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "batch_size = 100\n\n[netease]\nplaylist_url = \"http://localhost:9000/playlist\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.batch_size, 100);
        assert_eq!(config.netease.playlist_url, "http://localhost:9000/playlist");
        assert_eq!(config.netease.tracks_url, NetEaseConfig::default().tracks_url);
        assert_eq!(config.qq_music, QqMusicConfig::default());
    }

    #[test]
    fn test_rejects_oversized_batches() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 401").unwrap();

        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = \"lots\"").unwrap();

        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_write_default_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::write_default_to(&path).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_write_default_keeps_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 5").unwrap();

        Config::write_default_to(file.path()).unwrap();

        assert_eq!(Config::from_file(file.path()).unwrap().batch_size, 5);
    }
}
