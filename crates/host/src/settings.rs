//! Settings persistence using a JSON file
//!
//! The file holds the flat document served as /settings.json. Edits are
//! written back right away, and memory only changes once the write succeeded.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use settings_sync_protocol::{parse_settings, ProtocolError, SettingValue, SettingsMap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown setting {0}")]
    UnknownKey(String),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings document error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Settings encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Settings storage backed by a JSON file
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    values: SettingsMap,
}

impl SettingsStore {
    /// Open the settings file. A missing file is an empty document.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = read_document(&path).await?;
        Ok(Self { path, values })
    }

    /// In-memory store, never written to disk until `save`
    pub fn with_values(path: impl Into<PathBuf>, values: SettingsMap) -> Self {
        Self {
            path: path.into(),
            values,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get all settings
    pub const fn values(&self) -> &SettingsMap {
        &self.values
    }

    /// Get a single setting
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    /// Serialized document, as served to pages
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.values)?)
    }

    /// Apply an edit received as text, keeping the setting's type
    pub fn apply_change(&mut self, key: &str, raw: &str) -> Result<SettingValue, StoreError> {
        let updated = self.coerce_change(key, raw)?;
        self.values.insert(key.to_string(), updated.clone());
        Ok(updated)
    }

    /// Apply an edit and persist it. A failed write leaves the store as it was.
    pub async fn commit_change(&mut self, key: &str, raw: &str) -> Result<SettingValue, StoreError> {
        let updated = self.coerce_change(key, raw)?;

        let mut next = self.values.clone();
        next.insert(key.to_string(), updated.clone());
        write_document(&self.path, &next).await?;

        self.values = next;
        Ok(updated)
    }

    fn coerce_change(&self, key: &str, raw: &str) -> Result<SettingValue, StoreError> {
        let current = self
            .values
            .get(key)
            .ok_or_else(|| StoreError::UnknownKey(key.to_string()))?;

        current.coerce_like(raw).ok_or_else(|| StoreError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
    }

    /// Write the document back to its file
    pub async fn save(&self) -> Result<(), StoreError> {
        write_document(&self.path, &self.values).await
    }

    /// Re-read the file, dropping in-memory state. Returns the number of settings.
    pub async fn reload(&mut self) -> Result<usize, StoreError> {
        self.values = read_document(&self.path).await?;
        Ok(self.values.len())
    }
}

async fn read_document(path: &Path) -> Result<SettingsMap, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(parse_settings(&content)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Settings file {} not found, starting empty", path.display());
            Ok(SettingsMap::new())
        }
        Err(e) => Err(e.into()),
    }
}

async fn write_document(path: &Path, values: &SettingsMap) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(values)?;
    tokio::fs::write(path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SettingsMap {
        let mut values = SettingsMap::new();
        values.insert("ssid".into(), SettingValue::from("home"));
        values.insert("port".into(), SettingValue::from(1883.0));
        values.insert("enableGsm".into(), SettingValue::from(false));
        values
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::open(dir.path().join("settings.json")).await.expect("opens");
        assert!(store.values().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[1,2,3]").expect("write");

        let err = SettingsStore::open(&path).await.expect_err("not an object");
        assert!(matches!(err, StoreError::Protocol(ProtocolError::NotAnObject)));
    }

    #[test]
    fn test_apply_change_keeps_type() {
        let mut store = SettingsStore::with_values("unused.json", sample());

        assert_eq!(store.apply_change("port", "8883").expect("number"), SettingValue::Number(8883.0));
        assert_eq!(store.apply_change("enableGsm", "TRUE").expect("bool"), SettingValue::Bool(true));
        assert_eq!(store.apply_change("ssid", "office").expect("text"), SettingValue::from("office"));
        assert_eq!(store.get("ssid"), Some(&SettingValue::from("office")));
    }

    #[test]
    fn test_apply_change_errors() {
        let mut store = SettingsStore::with_values("unused.json", sample());

        assert!(matches!(store.apply_change("nope", "1"), Err(StoreError::UnknownKey(k)) if k == "nope"));
        assert!(matches!(
            store.apply_change("port", "fast"),
            Err(StoreError::InvalidValue { key, .. }) if key == "port"
        ));
        // Failed edits leave the value untouched
        assert_eq!(store.get("port"), Some(&SettingValue::Number(1883.0)));
    }

    #[tokio::test]
    async fn test_commit_change_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");

        let mut store = SettingsStore::with_values(&path, sample());
        assert_eq!(store.commit_change("ssid", "").await.expect("text"), SettingValue::from(""));

        let reopened = SettingsStore::open(&path).await.expect("reopens");
        assert_eq!(reopened.get("ssid"), Some(&SettingValue::from("")));
        // Rewritten in the document's key order
        let keys: Vec<&str> = reopened.values().keys().map(String::as_str).collect();
        assert_eq!(keys, ["ssid", "port", "enableGsm"]);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_old_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory can't be written as a file
        let mut store = SettingsStore::with_values(dir.path(), sample());

        let err = store.commit_change("port", "9999").await.expect_err("write fails");
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.get("port"), Some(&SettingValue::Number(1883.0)));
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");

        let mut store = SettingsStore::with_values(&path, sample());
        store.apply_change("port", "1884").expect("valid");
        store.save().await.expect("saves");

        let reopened = SettingsStore::open(&path).await.expect("reopens");
        assert_eq!(reopened.get("port"), Some(&SettingValue::Number(1884.0)));

        std::fs::write(&path, r#"{"only":true}"#).expect("write");
        assert_eq!(store.reload().await.expect("reloads"), 1);
        assert_eq!(store.get("only"), Some(&SettingValue::Bool(true)));
    }
}
