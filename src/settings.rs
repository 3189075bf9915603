//! Settings persistence seam.
//!
//! Every mode transition and configuration change is written through a
//! [`SettingsStore`] immediately, one key per value. Writes are
//! fire-and-forget: stores log failures and carry on, they never surface
//! them to the caller.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Persisted setting keys.
pub mod keys {
    pub const MODE: &str = "header_mode";
    pub const FONT_FACE: &str = "header_font_face";
    pub const FONT_SIZE: &str = "header_font_size";
    pub const FONT_BOLD: &str = "header_font_bold";
    pub const TOP_PADDING: &str = "header_top_padding";
    pub const BOTTOM_PADDING: &str = "header_bottom_padding";
    pub const USE_BOOK_MARGINS: &str = "header_use_book_margins";
    pub const MARGIN: &str = "header_margin";
    pub const LEFT_MAX_WIDTH_PCT: &str = "header_left_max_width_pct";
    pub const RIGHT_MAX_WIDTH_PCT: &str = "header_right_max_width_pct";
    pub const CENTER_MAX_WIDTH_PCT: &str = "header_center_max_width_pct";
    pub const SEPARATOR: &str = "header_separator";
    /// Host-owned clock preference, read only.
    pub const TWELVE_HOUR_CLOCK: &str = "twelve_hour_clock";
}

/// A single persisted value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Host settings backend.
pub trait SettingsStore {
    /// Read a previously written value, if any.
    fn read(&self, key: &str) -> Option<SettingValue>;

    /// Write a value. Implementations must not block on confirmation and
    /// must swallow backend failures.
    fn write(&mut self, key: &str, value: SettingValue);

    fn read_bool(&self, key: &str) -> Option<bool> {
        self.read(key).and_then(|value| value.as_bool())
    }

    fn read_int(&self, key: &str) -> Option<i64> {
        self.read(key).and_then(|value| value.as_int())
    }

    fn read_text(&self, key: &str) -> Option<String> {
        match self.read(key) {
            Some(SettingValue::Text(value)) => Some(value),
            _ => None,
        }
    }
}

impl<S> SettingsStore for &mut S
where
    S: SettingsStore + ?Sized,
{
    fn read(&self, key: &str) -> Option<SettingValue> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: SettingValue) {
        (**self).write(key, value)
    }
}

/// In-memory store, used by tests and hosts that persist elsewhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, SettingValue>,
    writes: usize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write` calls observed since construction.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Seed a value without counting it as a write.
    pub fn with_value(mut self, key: &str, value: impl Into<SettingValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: SettingValue) {
        self.writes += 1;
        self.values.insert(key.into(), value);
    }
}

#[cfg(feature = "std")]
pub use file_store::JsonFileSettingsStore;

#[cfg(feature = "std")]
mod file_store {
    use super::{SettingValue, SettingsStore};
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::fs::{self, File, OpenOptions};
    use std::io::{BufWriter, Read, Write};
    use std::path::{Path, PathBuf};

    const DEFAULT_MAX_FILE_BYTES: usize = 64 * 1024;

    /// JSON-object settings file.
    ///
    /// The file is read once on open. Each `write` rewrites the whole file
    /// through a sibling temp file and a rename, so a crash mid-write leaves
    /// the previous contents intact. I/O and decode failures are logged and
    /// ignored; an unreadable file opens as an empty store.
    ///
    /// Entries that are not a bool, integer or string are skipped on read
    /// and written back untouched, so one bad entry never costs the others.
    #[derive(Clone, Debug)]
    pub struct JsonFileSettingsStore {
        path: PathBuf,
        max_file_bytes: usize,
        values: BTreeMap<String, SettingValue>,
        opaque: BTreeMap<String, Value>,
    }

    impl JsonFileSettingsStore {
        /// Open (or lazily create) the settings file at `path`.
        pub fn open(path: impl Into<PathBuf>) -> Self {
            Self::open_with_max_file_bytes(path, DEFAULT_MAX_FILE_BYTES)
        }

        /// Open with an explicit size cap for the settings file.
        ///
        /// Values of `0` are treated as `1` to keep the cap explicit.
        pub fn open_with_max_file_bytes(path: impl Into<PathBuf>, max_file_bytes: usize) -> Self {
            let path = path.into();
            let max_file_bytes = max_file_bytes.max(1);
            let raw = load_entries(&path, max_file_bytes).unwrap_or_default();
            let mut values = BTreeMap::new();
            let mut opaque = BTreeMap::new();
            for (key, value) in raw {
                match serde_json::from_value::<SettingValue>(value.clone()) {
                    Ok(setting) => {
                        values.insert(key, setting);
                    }
                    Err(_) => {
                        log::warn!("settings: ignoring unsupported value for {}", key);
                        opaque.insert(key, value);
                    }
                }
            }
            Self {
                path,
                max_file_bytes,
                values,
                opaque,
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn flush(&self) {
            let Some(parent) = self.path.parent() else {
                return;
            };
            if !parent.as_os_str().is_empty() && fs::create_dir_all(parent).is_err() {
                log::warn!("settings: cannot create {}", parent.display());
                return;
            }
            let mut entries: BTreeMap<&str, Value> = self
                .opaque
                .iter()
                .map(|(key, value)| (key.as_str(), value.clone()))
                .collect();
            for (key, value) in &self.values {
                let encoded = match serde_json::to_value(value) {
                    Ok(encoded) => encoded,
                    Err(err) => {
                        log::warn!("settings: encode {} failed: {}", key, err);
                        return;
                    }
                };
                entries.insert(key.as_str(), encoded);
            }
            let payload = match serde_json::to_vec_pretty(&entries) {
                Ok(payload) => payload,
                Err(err) => {
                    log::warn!("settings: encode failed: {}", err);
                    return;
                }
            };
            if payload.len() > self.max_file_bytes {
                log::warn!(
                    "settings: payload {} bytes exceeds cap {}",
                    payload.len(),
                    self.max_file_bytes
                );
                return;
            }

            let temp_path = self.path.with_extension(format!("json.tmp-{}", std::process::id()));
            if let Err(err) = write_file(&temp_path, &payload) {
                log::warn!("settings: write {} failed: {}", temp_path.display(), err);
                let _ = fs::remove_file(&temp_path);
                return;
            }
            if let Err(err) = fs::rename(&temp_path, &self.path) {
                log::warn!("settings: rename to {} failed: {}", self.path.display(), err);
                let _ = fs::remove_file(&temp_path);
            }
        }
    }

    impl SettingsStore for JsonFileSettingsStore {
        fn read(&self, key: &str) -> Option<SettingValue> {
            self.values.get(key).cloned()
        }

        fn write(&mut self, key: &str, value: SettingValue) {
            self.opaque.remove(key);
            self.values.insert(key.into(), value);
            self.flush();
        }
    }

    fn write_file(path: &Path, payload: &[u8]) -> std::io::Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(payload)?;
        writer.flush()?;
        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()
    }

    fn load_entries(path: &Path, max_file_bytes: usize) -> Option<BTreeMap<String, Value>> {
        let len = fs::metadata(path).ok()?.len();
        if len > max_file_bytes as u64 {
            log::warn!(
                "settings: {} is {} bytes, over cap {}; ignoring",
                path.display(),
                len,
                max_file_bytes
            );
            return None;
        }
        let file = File::open(path).ok()?;
        let mut payload = Vec::with_capacity(len as usize);
        file.take(max_file_bytes as u64 + 1)
            .read_to_end(&mut payload)
            .ok()?;
        match serde_json::from_slice(&payload) {
            Ok(values) => Some(values),
            Err(err) => {
                log::warn!("settings: {} is not valid JSON: {}", path.display(), err);
                None
            }
        }
    }
}
