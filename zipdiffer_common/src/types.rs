use crate::DiffSettings;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of the difference between the two sides of a diff entry.
///
/// The variants are ordered, so `max` over children yields the severity of
/// a directory.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum DifferenceType {
    /// Both sides are byte-identical
    #[default]
    None = 0,
    /// Both sides are text that only differs in whitespace
    WhitespacesOnly = 1,
    /// Contents differ, or one side is missing
    Different = 2,
}

impl DifferenceType {
    pub fn is_different(self) -> bool {
        self != DifferenceType::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifferenceType::None => "none",
            DifferenceType::WhitespacesOnly => "whitespaces-only",
            DifferenceType::Different => "different",
        }
    }
}

impl fmt::Display for DifferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities a file can have depending on its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    Text,
    Image,
}

/// What to do when the server answers a download with a redirect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Redirect {
    /// Automatically follow redirects
    #[default]
    Follow,
    /// Fail when redirected
    Error,
}

/// Which credentials (URL user-info) are sent along with a download
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    /// Send credentials only to the origin they were given for
    #[default]
    SameOrigin,
    /// Never send credentials
    Omit,
    /// Always send credentials, even after a cross-origin redirect
    Include,
}

impl Credentials {
    pub fn as_str(self) -> &'static str {
        match self {
            Credentials::SameOrigin => "same-origin",
            Credentials::Omit => "omit",
            Credentials::Include => "include",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "same-origin" => Some(Credentials::SameOrigin),
            "omit" => Some(Credentials::Omit),
            "include" => Some(Credentials::Include),
            _ => None,
        }
    }
}

/// Options for fetching a remote archive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOptions {
    /// Extension appended to the URL's last path segment when the server
    /// does not provide a filename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,

    #[serde(default)]
    pub redirect: Redirect,

    #[serde(default)]
    pub credentials: Credentials,
}

/// Tuning of the tree pairing algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDiffOptions {
    /// Pair the single top-level directories of both archives even when
    /// their names differ (only when both roots hold exactly one directory
    /// and no files)
    #[serde(default)]
    pub unwrap_single_root: bool,

    /// Fall back to a case-insensitive name match when no entry with the
    /// exact same name exists on the right side
    #[serde(default)]
    pub case_insensitive_pairing: bool,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Persisted text diff flags
    #[serde(default)]
    pub settings: DiffSettings,

    /// Tree pairing options
    #[serde(default)]
    pub tree: TreeDiffOptions,

    /// Defaults for remote archives
    #[serde(default)]
    pub download: DownloadOptions,

    /// Enable portable mode (config alongside binary)
    #[serde(default)]
    pub portable_mode: bool,
}

/// BLAKE3 hash value (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blake3Hash(pub [u8; 32]);

impl Blake3Hash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<blake3::Hash> for Blake3Hash {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

const SIZE_UNITS: [&str; 5] = ["kB", "MB", "GB", "TB", "PB"];

/// Format a byte count for humans (`"512 byte"`, `"1.5 kB"`, `"-2 MB"`)
pub fn format_size(size: i64) -> String {
    if size < 0 {
        format!("-{}", format_unsigned_size(size.unsigned_abs()))
    } else {
        format_unsigned_size(size as u64)
    }
}

fn format_unsigned_size(size: u64) -> String {
    if size < 1024 {
        return format!("{} byte", group_thousands(&size.to_string()));
    }

    let mut value = size as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", format_decimal(value), SIZE_UNITS[unit])
}

fn format_decimal(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        group_thousands(integer)
    } else {
        format!("{}.{}", group_thousands(integer), fraction)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difference_type_ordering() {
        assert!(DifferenceType::None < DifferenceType::WhitespacesOnly);
        assert!(DifferenceType::WhitespacesOnly < DifferenceType::Different);
        assert_eq!(
            DifferenceType::WhitespacesOnly.max(DifferenceType::None),
            DifferenceType::WhitespacesOnly
        );
        assert!(!DifferenceType::None.is_different());
        assert!(DifferenceType::WhitespacesOnly.is_different());
    }

    #[test]
    fn test_credentials_parse() {
        for credentials in [Credentials::SameOrigin, Credentials::Omit, Credentials::Include] {
            assert_eq!(Credentials::parse(credentials.as_str()), Some(credentials));
        }
        assert_eq!(Credentials::parse("whatever"), None);
    }

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(0), "0 byte");
        assert_eq!(format_size(512), "512 byte");
        assert_eq!(format_size(1023), "1,023 byte");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(1024), "1 kB");
        assert_eq!(format_size(1536), "1.5 kB");
        assert_eq!(format_size(1024 * 1024), "1 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024 / 2), "1.5 GB");
        assert_eq!(format_size(5 * 1024_i64.pow(5)), "5 PB");
        assert_eq!(format_size(1024_i64.pow(6)), "1,024 PB");
    }

    #[test]
    fn test_format_size_negative() {
        assert_eq!(format_size(-2048), "-2 kB");
        assert_eq!(format_size(-1), "-1 byte");
    }

    #[test]
    fn test_app_config_defaults_from_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.tree, TreeDiffOptions::default());
        assert_eq!(config.download.redirect, Redirect::Follow);
        assert_eq!(config.download.credentials, Credentials::SameOrigin);
        assert!(!config.settings.ignore_case);
    }
}
