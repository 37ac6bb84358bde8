use serde::{Deserialize, Serialize};
use std::fmt;

/// Boolean flags that drive how text diffs are computed and displayed.
///
/// Every flag defaults to `false` and is only written out when set, so a
/// config file only ever lists what the user changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSettings {
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_case: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_whitespace: bool,

    /// Convert CRLF and CR line endings to LF before diffing
    #[serde(default, skip_serializing_if = "is_false")]
    pub normalize_eol: bool,

    /// Run the file type's formatter before diffing
    #[serde(default, skip_serializing_if = "is_false")]
    pub apply_formatter: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Stable identifiers of the persisted flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    IgnoreCase,
    IgnoreWhitespace,
    NormalizeEol,
    ApplyFormatter,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::IgnoreCase,
        SettingKey::IgnoreWhitespace,
        SettingKey::NormalizeEol,
        SettingKey::ApplyFormatter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::IgnoreCase => "diff.ignoreCase",
            SettingKey::IgnoreWhitespace => "diff.ignoreWhitespace",
            SettingKey::NormalizeEol => "diff.normalizeEOL",
            SettingKey::ApplyFormatter => "diff.applyFormatter",
        }
    }

    /// Look a key up by its stable name, ignoring ASCII case
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(name))
    }

    pub fn default_value(self) -> bool {
        false
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DiffSettings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::IgnoreCase => self.ignore_case,
            SettingKey::IgnoreWhitespace => self.ignore_whitespace,
            SettingKey::NormalizeEol => self.normalize_eol,
            SettingKey::ApplyFormatter => self.apply_formatter,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: bool) {
        let slot = match key {
            SettingKey::IgnoreCase => &mut self.ignore_case,
            SettingKey::IgnoreWhitespace => &mut self.ignore_whitespace,
            SettingKey::NormalizeEol => &mut self.normalize_eol,
            SettingKey::ApplyFormatter => &mut self.apply_formatter,
        };
        *slot = value;
    }

    /// Set a flag from its textual form; unrecognized values reset it to
    /// its default
    pub fn set_from_str(&mut self, key: SettingKey, value: &str) {
        self.set(key, parse_bool(value).unwrap_or(key.default_value()));
    }

    pub fn is_default(&self) -> bool {
        SettingKey::ALL
            .into_iter()
            .all(|key| self.get(key) == key.default_value())
    }
}

/// Parse the boolean spellings accepted in settings (`1/true/on/yes`,
/// `0/false/off/no`, any case)
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_spellings() {
        for value in ["1", "true", "ON", "Yes"] {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in ["0", "False", "off", "NO"] {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_setting_key_names() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SettingKey::parse("diff.normalizeeol"), Some(SettingKey::NormalizeEol));
        assert_eq!(SettingKey::parse("diff.unknown"), None);
    }

    #[test]
    fn test_set_from_str_falls_back_to_default() {
        let mut settings = DiffSettings::default();
        settings.set_from_str(SettingKey::IgnoreCase, "yes");
        assert!(settings.ignore_case);
        settings.set_from_str(SettingKey::IgnoreCase, "garbage");
        assert!(!settings.ignore_case);
        assert!(settings.is_default());
    }

    #[test]
    fn test_only_non_default_flags_are_serialized() {
        let mut settings = DiffSettings::default();
        assert_eq!(toml::to_string(&settings).unwrap().trim(), "");

        settings.set(SettingKey::ApplyFormatter, true);
        let serialized = toml::to_string(&settings).unwrap();
        assert!(serialized.contains("apply_formatter = true"));
        assert!(!serialized.contains("ignore_case"));

        let restored: DiffSettings = toml::from_str(&serialized).unwrap();
        assert_eq!(restored, settings);
    }
}
