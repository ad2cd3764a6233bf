//! User preferences (theme, selected network)
//!
//! Preferences are plain key/value strings behind a [`PreferencePort`]. The
//! store reads them once at startup and writes through on every change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::network::Network;

pub const THEME_KEY: &str = "theme";
pub const NETWORK_KEY: &str = "network";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Theme> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Preferences {
    pub theme: Theme,
    pub network: Network,
}

/// Key/value persistence for preferences
pub trait PreferencePort: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Preferences kept in memory only
#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(entries: &[(&str, &str)]) -> Self {
        let values = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl PreferencePort for MemoryPreferences {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences stored as a JSON object in a single file
pub struct FilePreferences {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

impl PreferencePort for FilePreferences {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        Ok(self.load_all()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut values = self.load_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Preferences loaded once and passed around explicitly
pub struct SettingsStore {
    port: Box<dyn PreferencePort>,
    current: Preferences,
}

impl SettingsStore {
    /// Read preferences; missing or unrecognized values fall back to
    /// light theme and testnet.
    pub fn load(port: Box<dyn PreferencePort>) -> Result<Self, StorageError> {
        let theme = match port.read(THEME_KEY)? {
            Some(raw) => Theme::parse(&raw).unwrap_or_else(|| {
                log::warn!("Ignoring unknown theme '{}'", raw);
                Theme::default()
            }),
            None => Theme::default(),
        };

        let network = match port.read(NETWORK_KEY)? {
            Some(raw) => raw.parse::<Network>().unwrap_or_else(|e| {
                log::warn!("Ignoring stored network: {}", e);
                Network::default()
            }),
            None => Network::default(),
        };

        log::debug!("Loaded preferences: theme={}, network={}", theme.as_str(), network);

        Ok(Self {
            port,
            current: Preferences { theme, network },
        })
    }

    pub fn preferences(&self) -> Preferences {
        self.current
    }

    pub fn theme(&self) -> Theme {
        self.current.theme
    }

    pub fn network(&self) -> Network {
        self.current.network
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StorageError> {
        self.port.write(THEME_KEY, theme.as_str())?;
        self.current.theme = theme;
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, StorageError> {
        let next = self.current.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Returns true when the selection actually changed
    pub fn set_network(&mut self, network: Network) -> Result<bool, StorageError> {
        if network == self.current.network {
            return Ok(false);
        }
        self.port.write(NETWORK_KEY, network.as_str())?;
        self.current.network = network;
        log::info!("Network switched to {}", network);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_empty() {
        let store = SettingsStore::load(Box::new(MemoryPreferences::new())).unwrap();
        assert_eq!(store.theme(), Theme::Light);
        assert_eq!(store.network(), Network::Testnet);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let port = MemoryPreferences::with(&[("theme", "sepia"), ("network", "devnet")]);
        let store = SettingsStore::load(Box::new(port)).unwrap();
        assert_eq!(store.preferences(), Preferences::default());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        {
            let mut store = SettingsStore::load(Box::new(FilePreferences::new(&path))).unwrap();
            assert_eq!(store.toggle_theme().unwrap(), Theme::Dark);
            assert!(store.set_network(Network::Mainnet).unwrap());
            assert!(!store.set_network(Network::Mainnet).unwrap());
        }

        let store = SettingsStore::load(Box::new(FilePreferences::new(&path))).unwrap();
        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(store.network(), Network::Mainnet);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"theme\": \"dark\""));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();
        assert!(SettingsStore::load(Box::new(FilePreferences::new(&path))).is_err());
    }
}
