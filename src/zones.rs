//! Builds the list of selectable zones from a [`ConfigMap`] and resolves a
//! selected zone back to its stream URL.

use crate::config::ConfigMap;

/// Keys starting with this prefix describe zones.
pub const ZONE_PREFIX: &str = "Zona";

/// One selectable zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneOption {
    /// The mapping key the option was derived from.
    pub key: String,
    /// Text shown next to the radio button.
    pub label: String,
}

/// How a selected option is turned back into a mapping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneLookup {
    /// Look up `"Zona=" + label`. Keys read from a file never have this
    /// shape, so file-defined zones need [`ZoneLookup::SourceKey`].
    #[default]
    ReconstructedKey,
    /// Look up the key the option was built from.
    SourceKey,
}

impl ZoneLookup {
    /// The mapping key this strategy reads for `option`.
    pub fn key_for(self, option: &ZoneOption) -> String {
        match self {
            ZoneLookup::ReconstructedKey => format!("{}={}", ZONE_PREFIX, option.label),
            ZoneLookup::SourceKey => option.key.clone(),
        }
    }

    /// Resolves `option` to a stream URL. Empty values count as missing.
    pub fn resolve<'a>(self, config: &'a ConfigMap, option: &ZoneOption) -> Option<&'a str> {
        config
            .get(&self.key_for(option))
            .filter(|url| !url.is_empty())
    }
}

/// Display label for a zone entry: the part of the key after its first `=`.
///
/// Keys read from a file never contain `=`, so for those the entry's value
/// is used instead.
pub fn zone_label<'a>(key: &'a str, value: &'a str) -> &'a str {
    key.split_once('=').map_or(value, |(_, name)| name)
}

/// Derives the options for every `Zona*` key with a non-empty value, in file order.
pub fn build_zone_options(config: &ConfigMap) -> Vec<ZoneOption> {
    config
        .iter()
        .filter(|(key, value)| key.starts_with(ZONE_PREFIX) && !value.is_empty())
        .map(|(key, value)| ZoneOption {
            key: key.to_string(),
            label: zone_label(key, value).to_string(),
        })
        .collect()
}

/// The single active option, by position in the current option list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneSelection {
    selected: Option<usize>,
}

impl ZoneSelection {
    /// Selects `index`, implicitly deselecting the previous one. Returns the previous index.
    pub fn select(&mut self, index: usize) -> Option<usize> {
        self.selected.replace(index)
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected == Some(index)
    }
}
