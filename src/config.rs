//! Loads the flat `KEY=VALUE` zone file.
//!
//! The file is not a real INI file: there are no sections, comments or
//! escapes. Every non-blank line is split on its first `=` and stored in an
//! insertion-ordered map. A line without `=` aborts the whole load.

use crate::error::ConfigError;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Key holding the station identifier.
pub const STATION_KEY: &str = "AZS";

/// Prefix shown in front of the station identifier.
pub const STATION_LABEL_PREFIX: &str = "Номер станции: ";

/// The parsed zone file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMap {
    entries: IndexMap<String, String>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses file contents. Fails on the first line that has no separator.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut map = Self::new();

        for (index, raw_line) in content.trim_start_matches('\u{feff}').lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedLine {
                    line: index + 1,
                    content: line.to_string(),
                })?;
            map.insert(key, value);
        }

        Ok(map)
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::parse(&content)?;
        debug!("Parsed {} entries from {}", map.len(), path.display());
        Ok(map)
    }

    /// Inserts an entry. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The `AZS` value, or an empty string when the file has none.
    pub fn station_id(&self) -> &str {
        self.get(STATION_KEY).unwrap_or("")
    }

    /// Text for the station label at the top of the window.
    pub fn station_label(&self) -> String {
        format!("{}{}", STATION_LABEL_PREFIX, self.station_id())
    }
}
