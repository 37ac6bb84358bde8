//! Extension → capability registry.
//!
//! Every known file extension maps to an [`ExtensionInfo`] telling whether
//! files with that extension can be shown as images, as text, or both, and
//! for text which highlight language, formatter and diff algorithms apply.

use crate::formatter::Formatter;
use crate::text_diff::DiffAlgorithm;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;
use zipdiffer_common::{FileFormat, ZipDifferError};

/// Syntax highlighting language tag of a text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightLanguage {
    AsciiDoc,
    Bash,
    C,
    Cpp,
    CSharp,
    Css,
    Diff,
    Dos,
    JavaScript,
    Json,
    Less,
    Markdown,
    Perl,
    Php,
    PlainText,
    Po,
    PowerShell,
    Python,
    Ruby,
    Rust,
    Scss,
    Sql,
    Twig,
    TypeScript,
    VbNet,
    VbScript,
    Xml,
    Yaml,
}

impl HighlightLanguage {
    pub fn tag(self) -> &'static str {
        match self {
            HighlightLanguage::AsciiDoc => "asciidoc",
            HighlightLanguage::Bash => "bash",
            HighlightLanguage::C => "c",
            HighlightLanguage::Cpp => "cpp",
            HighlightLanguage::CSharp => "csharp",
            HighlightLanguage::Css => "css",
            HighlightLanguage::Diff => "diff",
            HighlightLanguage::Dos => "dos",
            HighlightLanguage::JavaScript => "javascript",
            HighlightLanguage::Json => "json",
            HighlightLanguage::Less => "less",
            HighlightLanguage::Markdown => "markdown",
            HighlightLanguage::Perl => "perl",
            HighlightLanguage::Php => "php",
            HighlightLanguage::PlainText => "plaintext",
            HighlightLanguage::Po => "po",
            HighlightLanguage::PowerShell => "powershell",
            HighlightLanguage::Python => "python",
            HighlightLanguage::Ruby => "ruby",
            HighlightLanguage::Rust => "rust",
            HighlightLanguage::Scss => "scss",
            HighlightLanguage::Sql => "sql",
            HighlightLanguage::Twig => "twig",
            HighlightLanguage::TypeScript => "typescript",
            HighlightLanguage::VbNet => "vbnet",
            HighlightLanguage::VbScript => "vbscript",
            HighlightLanguage::Xml => "xml",
            HighlightLanguage::Yaml => "yaml",
        }
    }
}

impl fmt::Display for HighlightLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub mime_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInfo {
    pub highlight_language: HighlightLanguage,
    pub formatter: Option<Formatter>,
    /// Never empty; the first entry is the preferred algorithm
    pub diff_algorithms: Vec<DiffAlgorithm>,
}

/// Capabilities of one extension. Both descriptors absent means the
/// extension is known but untyped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionInfo {
    pub image: Option<ImageInfo>,
    pub text: Option<TextInfo>,
}

impl ExtensionInfo {
    pub fn formats(&self) -> Vec<FileFormat> {
        let mut formats = Vec::with_capacity(2);
        if self.image.is_some() {
            formats.push(FileFormat::Image);
        }
        if self.text.is_some() {
            formats.push(FileFormat::Text);
        }
        formats
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn is_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Immutable lookup table of extensions and aliases
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    entries: HashMap<String, ExtensionInfo>,
    aliases: HashMap<String, String>,
}

impl FormatRegistry {
    pub fn builder() -> FormatRegistryBuilder {
        FormatRegistryBuilder::default()
    }

    /// The process-wide registry of built-in formats.
    ///
    /// # Panics
    ///
    /// Panics on first use if the built-in tables are inconsistent, which
    /// the unit tests rule out.
    pub fn global() -> &'static FormatRegistry {
        static GLOBAL: LazyLock<FormatRegistry> = LazyLock::new(|| {
            builtin_formats()
                .build()
                .expect("built-in format registry tables are inconsistent")
        });
        &GLOBAL
    }

    /// Case-insensitive lookup; a leading `.` is ignored and aliases resolve
    /// to their canonical entry.
    pub fn lookup(&self, extension: &str) -> Option<&ExtensionInfo> {
        let key = extension.trim_start_matches('.').to_lowercase();
        match self.aliases.get(&key) {
            Some(target) => self.entries.get(target),
            None => self.entries.get(&key),
        }
    }

    pub fn lookup_filename(&self, filename: &str) -> Option<&ExtensionInfo> {
        extension_of(filename).and_then(|ext| self.lookup(ext))
    }

    /// Canonical name of an extension, following aliases
    pub fn canonical<'a>(&'a self, extension: &str) -> Option<&'a str> {
        let key = extension.trim_start_matches('.').to_lowercase();
        let key = self.aliases.get(&key).cloned().unwrap_or(key);
        self.entries.get_key_value(&key).map(|(k, _)| k.as_str())
    }

    /// Canonical extensions in alphabetical order, each with its aliases
    pub fn extensions(&self) -> Vec<(&str, Vec<&str>)> {
        let mut aliases_by_target: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (alias, target) in &self.aliases {
            aliases_by_target
                .entry(target.as_str())
                .or_default()
                .push(alias.as_str());
        }

        let mut extensions: Vec<(&str, Vec<&str>)> = self
            .entries
            .keys()
            .map(|ext| {
                let mut aliases = aliases_by_target.remove(ext.as_str()).unwrap_or_default();
                aliases.sort_unstable();
                (ext.as_str(), aliases)
            })
            .collect();
        extensions.sort_unstable_by(|a, b| a.0.cmp(b.0));
        extensions
    }

    pub fn mime_type_for(&self, filename: &str) -> Option<&'static str> {
        self.lookup_filename(filename)?
            .image
            .as_ref()
            .map(|image| image.mime_type)
    }

    pub fn highlight_language_for(&self, filename: &str) -> Option<HighlightLanguage> {
        self.lookup_filename(filename)?
            .text
            .as_ref()
            .map(|text| text.highlight_language)
    }

    pub fn formatter_for(&self, filename: &str) -> Option<Formatter> {
        self.lookup_filename(filename)?.text.as_ref()?.formatter
    }

    pub fn formats_for(&self, filename: &str) -> Vec<FileFormat> {
        self.lookup_filename(filename)
            .map(ExtensionInfo::formats)
            .unwrap_or_default()
    }

    /// Diff algorithms offered for a file; empty when it is not text
    pub fn diff_algorithms_for(&self, filename: &str) -> &[DiffAlgorithm] {
        self.lookup_filename(filename)
            .and_then(|info| info.text.as_ref())
            .map(|text| text.diff_algorithms.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_text(&self, filename: &str) -> bool {
        self.lookup_filename(filename)
            .is_some_and(ExtensionInfo::is_text)
    }
}

/// Text after the last `.` of the final path component
pub fn extension_of(filename: &str) -> Option<&str> {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Collects entries and aliases, validated by [`FormatRegistryBuilder::build`]
#[derive(Debug, Default)]
pub struct FormatRegistryBuilder {
    entries: Vec<(String, ExtensionInfo)>,
    aliases: Vec<(String, String)>,
}

impl FormatRegistryBuilder {
    pub fn entry(mut self, extension: &str, info: ExtensionInfo) -> Self {
        self.entries.push((extension.to_lowercase(), info));
        self
    }

    pub fn untyped(self, extension: &str) -> Self {
        self.entry(extension, ExtensionInfo::default())
    }

    pub fn image(self, extension: &str, mime_type: &'static str) -> Self {
        self.entry(
            extension,
            ExtensionInfo {
                image: Some(ImageInfo { mime_type }),
                text: None,
            },
        )
    }

    /// Text entry offered the common diff algorithms
    pub fn text(
        self,
        extension: &str,
        language: HighlightLanguage,
        formatter: Option<Formatter>,
    ) -> Self {
        self.text_with(extension, language, formatter, DiffAlgorithm::COMMON.to_vec())
    }

    pub fn text_with(
        self,
        extension: &str,
        language: HighlightLanguage,
        formatter: Option<Formatter>,
        diff_algorithms: Vec<DiffAlgorithm>,
    ) -> Self {
        self.entry(
            extension,
            ExtensionInfo {
                image: None,
                text: Some(TextInfo {
                    highlight_language: language,
                    formatter,
                    diff_algorithms,
                }),
            },
        )
    }

    pub fn image_text(
        self,
        extension: &str,
        mime_type: &'static str,
        language: HighlightLanguage,
        formatter: Option<Formatter>,
    ) -> Self {
        self.entry(
            extension,
            ExtensionInfo {
                image: Some(ImageInfo { mime_type }),
                text: Some(TextInfo {
                    highlight_language: language,
                    formatter,
                    diff_algorithms: DiffAlgorithm::COMMON.to_vec(),
                }),
            },
        )
    }

    pub fn alias(mut self, alias: &str, target: &str) -> Self {
        self.aliases.push((alias.to_lowercase(), target.to_lowercase()));
        self
    }

    pub fn build(self) -> Result<FormatRegistry, ZipDifferError> {
        let mut entries = HashMap::with_capacity(self.entries.len());
        for (extension, info) in self.entries {
            if let Some(text) = &info.text {
                if text.diff_algorithms.is_empty() {
                    return Err(ZipDifferError::Config(format!(
                        "text format {} has no diff algorithm",
                        extension
                    )));
                }
            }
            if entries.insert(extension.clone(), info).is_some() {
                return Err(ZipDifferError::Config(format!(
                    "extension {} registered twice",
                    extension
                )));
            }
        }

        let mut aliases = HashMap::with_capacity(self.aliases.len());
        for (alias, target) in self.aliases {
            if !entries.contains_key(&target) {
                return Err(ZipDifferError::Config(format!(
                    "alias {} points to unregistered extension {}",
                    alias, target
                )));
            }
            if entries.contains_key(&alias) {
                return Err(ZipDifferError::Config(format!(
                    "alias {} shadows a registered extension",
                    alias
                )));
            }
            if aliases.insert(alias.clone(), target).is_some() {
                return Err(ZipDifferError::Config(format!(
                    "alias {} registered twice",
                    alias
                )));
            }
        }

        Ok(FormatRegistry { entries, aliases })
    }
}

fn builtin_formats() -> FormatRegistryBuilder {
    use HighlightLanguage as L;

    let css_algorithms = [DiffAlgorithm::Css]
        .into_iter()
        .chain(DiffAlgorithm::COMMON)
        .collect::<Vec<_>>();
    let json_algorithms = [DiffAlgorithm::Json]
        .into_iter()
        .chain(DiffAlgorithm::COMMON)
        .collect::<Vec<_>>();

    FormatRegistry::builder()
        .text("adoc", L::AsciiDoc, None)
        .image("apng", "image/apng")
        .text("atom", L::Xml, Some(Formatter::Xml))
        .image("avif", "image/avif")
        .text("bat", L::Dos, None)
        .image("bmp", "image/bmp")
        .text("c", L::C, None)
        .text("cpp", L::Cpp, None)
        .text("cs", L::CSharp, None)
        .text_with("css", L::Css, Some(Formatter::Css), css_algorithms.clone())
        .text("cts", L::TypeScript, None)
        .image("cur", "image/x-icon")
        .text("diff", L::Diff, None)
        .image("gif", "image/gif")
        .text("gyp", L::Python, None)
        .text("h", L::C, None)
        .untyped("heic")
        .text("html", L::Xml, Some(Formatter::Html))
        .image("ico", "image/x-icon")
        .image("jpg", "image/jpeg")
        .text("js", L::JavaScript, Some(Formatter::Javascript))
        .text_with("json", L::Json, None, json_algorithms)
        .text("less", L::Less, None)
        .text("md", L::Markdown, None)
        .text("php", L::Php, None)
        .text("pl", L::Perl, None)
        .image("png", "image/png")
        .text("po", L::Po, None)
        .text("ps1", L::PowerShell, None)
        .text("py", L::Python, None)
        .text("rb", L::Ruby, None)
        .text("rs", L::Rust, None)
        .text("rss", L::Xml, Some(Formatter::Xml))
        .text_with("scss", L::Scss, None, css_algorithms)
        .text("sh", L::Bash, None)
        .text("sql", L::Sql, None)
        .image_text("svg", "image/svg+xml", L::Xml, Some(Formatter::Xml))
        .untyped("tif")
        .text("ts", L::TypeScript, None)
        .text("tsx", L::TypeScript, None)
        .text("twig", L::Twig, None)
        .text("txt", L::PlainText, None)
        .text("vb", L::VbNet, None)
        .text("vbs", L::VbScript, None)
        .image("webp", "image/webp")
        .text("xhtml", L::Xml, Some(Formatter::Html))
        .text("xml", L::Xml, Some(Formatter::Xml))
        .text("xsd", L::Xml, Some(Formatter::Xml))
        .text("xsl", L::Xml, Some(Formatter::Xml))
        .text("yaml", L::Yaml, None)
        .alias("asciidoc", "adoc")
        .alias("bash", "sh")
        .alias("zsh", "sh")
        .alias("cmd", "bat")
        .alias("cjs", "js")
        .alias("mjs", "js")
        .alias("mts", "cts")
        .alias("heif", "heic")
        .alias("htm", "html")
        .alias("jfif", "jpg")
        .alias("jpeg", "jpg")
        .alias("pjp", "jpg")
        .alias("pjpeg", "jpg")
        .alias("jsonc", "json")
        .alias("markdown", "md")
        .alias("mkd", "md")
        .alias("mkdown", "md")
        .alias("patch", "diff")
        .alias("perl", "pl")
        .alias("pm", "pl")
        .alias("ps", "ps1")
        .alias("python", "py")
        .alias("ruby", "rb")
        .alias("rust", "rs")
        .alias("sass", "scss")
        .alias("tiff", "tif")
        .alias("vba", "vbs")
        .alias("vbscript", "vbs")
        .alias("yml", "yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_consistent() {
        let registry = builtin_formats().build().unwrap();
        for (extension, _) in registry.extensions() {
            if let Some(text) = &registry.lookup(extension).unwrap().text {
                assert!(!text.diff_algorithms.is_empty(), "{}", extension);
            }
        }
        assert!(FormatRegistry::global().lookup("txt").is_some());
    }

    #[test]
    fn test_alias_resolution_is_case_insensitive() {
        let registry = FormatRegistry::global();
        let htm = registry.lookup("HTM").unwrap();
        let html = registry.lookup("html").unwrap();
        assert_eq!(htm, html);
        let text = htm.text.as_ref().unwrap();
        assert_eq!(text.highlight_language, HighlightLanguage::Xml);
        assert_eq!(text.formatter, Some(Formatter::Html));
        assert_eq!(text.diff_algorithms, DiffAlgorithm::COMMON.to_vec());
    }

    #[test]
    fn test_every_alias_matches_its_target() {
        let registry = FormatRegistry::global();
        for (extension, aliases) in registry.extensions() {
            for alias in aliases {
                assert_eq!(registry.lookup(alias), registry.lookup(extension));
                assert_eq!(registry.canonical(alias), Some(extension));
            }
        }
        assert_eq!(registry.canonical(".JPEG"), Some("jpg"));
        assert_eq!(registry.canonical("nope"), None);
    }

    #[test]
    fn test_unknown_extension_is_absent() {
        let registry = FormatRegistry::global();
        assert!(registry.lookup("exe").is_none());
        assert!(registry.lookup("").is_none());
        assert!(registry.formats_for("program.exe").is_empty());
        assert!(registry.formats_for("Makefile").is_empty());
    }

    #[test]
    fn test_untyped_entries_have_no_formats() {
        let registry = FormatRegistry::global();
        let heif = registry.lookup("heif").unwrap();
        assert!(heif.formats().is_empty());
        assert!(!registry.is_text("photo.tiff"));
    }

    #[test]
    fn test_svg_is_image_and_text() {
        let registry = FormatRegistry::global();
        assert_eq!(
            registry.formats_for("logo.SVG"),
            vec![FileFormat::Image, FileFormat::Text]
        );
        assert_eq!(registry.mime_type_for("logo.svg"), Some("image/svg+xml"));
        assert_eq!(registry.formatter_for("logo.svg"), Some(Formatter::Xml));
    }

    #[test]
    fn test_format_specific_algorithms_are_prepended() {
        let registry = FormatRegistry::global();
        let css = registry.diff_algorithms_for("style.css");
        assert_eq!(css[0], DiffAlgorithm::Css);
        assert_eq!(&css[1..], &DiffAlgorithm::COMMON);
        assert_eq!(registry.diff_algorithms_for("theme.sass")[0], DiffAlgorithm::Css);
        let json = registry.diff_algorithms_for("package.jsonc");
        assert_eq!(json[0], DiffAlgorithm::Json);
        assert_eq!(registry.diff_algorithms_for("main.rs"), &DiffAlgorithm::COMMON);
        assert!(registry.diff_algorithms_for("logo.png").is_empty());
    }

    #[test]
    fn test_filename_helpers() {
        let registry = FormatRegistry::global();
        assert_eq!(registry.mime_type_for("photo.JPEG"), Some("image/jpeg"));
        assert_eq!(registry.mime_type_for("notes.txt"), None);
        assert_eq!(
            registry.highlight_language_for("build.gyp"),
            Some(HighlightLanguage::Python)
        );
        assert_eq!(
            registry.highlight_language_for("messages.po").map(HighlightLanguage::tag),
            Some("po")
        );
        assert_eq!(registry.formatter_for("app.mjs"), Some(Formatter::Javascript));
        assert_eq!(registry.formatter_for("app.ts"), None);
        assert_eq!(registry.formats_for("readme.md"), vec![FileFormat::Text]);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("archive.tar.gz"), Some("gz"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of(".bashrc"), Some("bashrc"));
        assert_eq!(extension_of("dir.d/file"), None);
    }

    #[test]
    fn test_dangling_alias_is_config_error() {
        let result = FormatRegistry::builder()
            .text("txt", HighlightLanguage::PlainText, None)
            .alias("text", "missing")
            .build();
        assert!(matches!(result, Err(ZipDifferError::Config(_))));
    }

    #[test]
    fn test_empty_algorithm_list_is_config_error() {
        let result = FormatRegistry::builder()
            .text_with("txt", HighlightLanguage::PlainText, None, Vec::new())
            .build();
        assert!(matches!(result, Err(ZipDifferError::Config(_))));
    }

    #[test]
    fn test_alias_shadowing_entry_is_config_error() {
        let result = FormatRegistry::builder()
            .text("txt", HighlightLanguage::PlainText, None)
            .text("text", HighlightLanguage::PlainText, None)
            .alias("text", "txt")
            .build();
        assert!(matches!(result, Err(ZipDifferError::Config(_))));
    }
}
