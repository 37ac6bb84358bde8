use crate::archive::File;
use crate::differ::DiffFile;
use crate::format_registry::FormatRegistry;
use crate::formatter::format_or_original;
use serde::Serialize;
use similar::{capture_diff_slices, Algorithm, DiffTag, TextDiff};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use zipdiffer_common::{DiffSettings, ZipDifferError};

/// Modifier flags a diff algorithm may honor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffModifier {
    IgnoreCase,
    IgnoreWhitespace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffFlags {
    pub ignore_case: bool,
    pub ignore_whitespace: bool,
}

impl DiffFlags {
    pub fn from_settings(settings: &DiffSettings) -> Self {
        Self {
            ignore_case: settings.ignore_case,
            ignore_whitespace: settings.ignore_whitespace,
        }
    }

    fn has(self, modifier: DiffModifier) -> bool {
        match modifier {
            DiffModifier::IgnoreCase => self.ignore_case,
            DiffModifier::IgnoreWhitespace => self.ignore_whitespace,
        }
    }
}

/// One segment of a diff. Unchanged segments have both flags false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub value: String,
    pub added: bool,
    pub removed: bool,
}

impl Change {
    pub fn unchanged(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            added: false,
            removed: false,
        }
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            added: true,
            removed: false,
        }
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            added: false,
            removed: true,
        }
    }

    pub fn is_change(&self) -> bool {
        self.added || self.removed
    }
}

/// The catalog of text diff strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    /// Unified diff with three lines of context
    Patch,
    Lines,
    Words,
    Chars,
    /// Tokenized on CSS punctuation
    Css,
    /// Line diff of canonicalized JSON
    Json,
}

impl DiffAlgorithm {
    /// Offered for every text format, in order
    pub const COMMON: [DiffAlgorithm; 4] = [
        DiffAlgorithm::Patch,
        DiffAlgorithm::Lines,
        DiffAlgorithm::Words,
        DiffAlgorithm::Chars,
    ];

    pub const ALL: [DiffAlgorithm; 6] = [
        DiffAlgorithm::Patch,
        DiffAlgorithm::Lines,
        DiffAlgorithm::Words,
        DiffAlgorithm::Chars,
        DiffAlgorithm::Css,
        DiffAlgorithm::Json,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            DiffAlgorithm::Patch => "Patch",
            DiffAlgorithm::Lines => "Lines",
            DiffAlgorithm::Words => "Words",
            DiffAlgorithm::Chars => "Chars",
            DiffAlgorithm::Css => "CSS",
            DiffAlgorithm::Json => "JSON",
        }
    }

    /// Stable identifier used on the command line
    pub fn id(self) -> &'static str {
        match self {
            DiffAlgorithm::Patch => "patch",
            DiffAlgorithm::Lines => "lines",
            DiffAlgorithm::Words => "words",
            DiffAlgorithm::Chars => "chars",
            DiffAlgorithm::Css => "css",
            DiffAlgorithm::Json => "json",
        }
    }

    pub fn supported_modifiers(self) -> &'static [DiffModifier] {
        match self {
            DiffAlgorithm::Words => &[DiffModifier::IgnoreCase, DiffModifier::IgnoreWhitespace],
            DiffAlgorithm::Chars => &[DiffModifier::IgnoreCase],
            _ => &[],
        }
    }

    pub fn supports(self, modifier: DiffModifier) -> bool {
        self.supported_modifiers().contains(&modifier)
    }

    /// Drop the flags this algorithm does not honor
    pub fn effective_flags(self, flags: DiffFlags) -> DiffFlags {
        DiffFlags {
            ignore_case: flags.has(DiffModifier::IgnoreCase)
                && self.supports(DiffModifier::IgnoreCase),
            ignore_whitespace: flags.has(DiffModifier::IgnoreWhitespace)
                && self.supports(DiffModifier::IgnoreWhitespace),
        }
    }

    pub fn apply(self, old: &str, new: &str, flags: DiffFlags) -> Vec<Change> {
        let flags = self.effective_flags(flags);
        match self {
            DiffAlgorithm::Patch => patch_changes(old, new),
            DiffAlgorithm::Lines => diff_tokens(&line_tokens(old), &line_tokens(new)),
            DiffAlgorithm::Words => diff_tokens(
                &word_tokens(old, flags),
                &word_tokens(new, flags),
            ),
            DiffAlgorithm::Chars => diff_tokens(
                &char_tokens(old, flags.ignore_case),
                &char_tokens(new, flags.ignore_case),
            ),
            DiffAlgorithm::Css => diff_tokens(&css_tokens(old), &css_tokens(new)),
            DiffAlgorithm::Json => json_changes(old, new),
        }
    }
}

impl fmt::Display for DiffAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiffAlgorithm {
    type Err = ZipDifferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiffAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| ZipDifferError::Comparison(format!("unknown diff algorithm: {}", s)))
    }
}

// ---------------------------------------------------------------------------
// Tokenizers
// ---------------------------------------------------------------------------

/// A slice of the input plus the key it is compared by
#[derive(Debug, Clone)]
struct Token<'a> {
    key: Cow<'a, str>,
    text: &'a str,
}

impl<'a> Token<'a> {
    fn literal(text: &'a str) -> Self {
        Self {
            key: Cow::Borrowed(text),
            text,
        }
    }

    fn folded(text: &'a str, key: &'a str, ignore_case: bool) -> Self {
        let key = if ignore_case {
            Cow::Owned(key.to_lowercase())
        } else {
            Cow::Borrowed(key)
        };
        Self { key, text }
    }
}

fn line_tokens(text: &str) -> Vec<Token<'_>> {
    text.split_inclusive('\n').map(Token::literal).collect()
}

fn char_tokens(text: &str, ignore_case: bool) -> Vec<Token<'_>> {
    text.char_indices()
        .map(|(i, c)| {
            let slice = &text[i..i + c.len_utf8()];
            Token::folded(slice, slice, ignore_case)
        })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Other,
}

fn classify_char(c: char) -> CharClass {
    if is_word_char(c) {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Other
    }
}

/// Split into word runs, whitespace runs and single punctuation characters
fn raw_word_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;

    for (i, c) in text.char_indices() {
        let class = classify_char(c);
        let split = match current {
            None => false,
            Some(CharClass::Other) => true,
            Some(prev) => prev != class,
        };
        if split {
            spans.push(&text[start..i]);
            start = i;
        }
        current = Some(class);
    }
    if start < text.len() {
        spans.push(&text[start..]);
    }
    spans
}

fn word_tokens(text: &str, flags: DiffFlags) -> Vec<Token<'_>> {
    let spans = raw_word_spans(text);
    if !flags.ignore_whitespace {
        return spans
            .into_iter()
            .map(|span| Token::folded(span, span, flags.ignore_case))
            .collect();
    }

    // Whitespace is not a token of its own: it is glued to the token before
    // it (or, at the very start, to the first token) and left out of the key.
    let mut bounds: Vec<(usize, usize, &str)> = Vec::new();
    let mut offset = 0;
    let mut leading: Option<usize> = None;
    for span in spans {
        let start = offset;
        offset += span.len();

        if span.chars().all(char::is_whitespace) {
            match bounds.last_mut() {
                Some((_, end, _)) => *end = offset,
                None => leading = Some(start),
            }
        } else {
            let begin = leading.take().unwrap_or(start);
            bounds.push((begin, offset, span));
        }
    }
    if let Some(begin) = leading {
        bounds.push((begin, text.len(), ""));
    }

    bounds
        .into_iter()
        .map(|(begin, end, key)| Token::folded(&text[begin..end], key, flags.ignore_case))
        .collect()
}

fn is_css_delimiter(c: char) -> bool {
    matches!(c, '{' | '}' | ':' | ';' | ',')
}

fn css_tokens(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (i, c) in text.char_indices() {
        if is_css_delimiter(c) {
            if start < i {
                tokens.push(Token::literal(&text[start..i]));
            }
            let end = i + c.len_utf8();
            tokens.push(Token::literal(&text[i..end]));
            start = end;
            in_space = None;
            continue;
        }
        let space = c.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) && start < i {
            tokens.push(Token::literal(&text[start..i]));
            start = i;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(Token::literal(&text[start..]));
    }
    tokens
}

// ---------------------------------------------------------------------------
// Diff engines
// ---------------------------------------------------------------------------

fn push_merged(changes: &mut Vec<Change>, change: Change) {
    if change.value.is_empty() {
        return;
    }
    match changes.last_mut() {
        Some(last) if last.added == change.added && last.removed == change.removed => {
            last.value.push_str(&change.value);
        }
        _ => changes.push(change),
    }
}

fn concat(tokens: &[Token<'_>]) -> String {
    tokens.iter().map(|t| t.text).collect()
}

/// Token diff where every run of edits between two unchanged segments is
/// reported as one removal followed by one addition
fn diff_tokens(old: &[Token<'_>], new: &[Token<'_>]) -> Vec<Change> {
    let old_keys: Vec<&str> = old.iter().map(|t| t.key.as_ref()).collect();
    let new_keys: Vec<&str> = new.iter().map(|t| t.key.as_ref()).collect();

    let mut changes = Vec::new();
    let mut removed = String::new();
    let mut added = String::new();

    let flush = |changes: &mut Vec<Change>, removed: &mut String, added: &mut String| {
        push_merged(changes, Change::removed(std::mem::take(removed)));
        push_merged(changes, Change::added(std::mem::take(added)));
    };

    for op in capture_diff_slices(Algorithm::Myers, &old_keys, &new_keys) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                flush(&mut changes, &mut removed, &mut added);
                push_merged(&mut changes, Change::unchanged(concat(&new[new_range])));
            }
            DiffTag::Delete => removed.push_str(&concat(&old[old_range])),
            DiffTag::Insert => added.push_str(&concat(&new[new_range])),
            DiffTag::Replace => {
                removed.push_str(&concat(&old[old_range]));
                added.push_str(&concat(&new[new_range]));
            }
        }
    }
    flush(&mut changes, &mut removed, &mut added);
    changes
}

/// One change per line of a unified diff, file headers dropped
fn patch_changes(old: &str, new: &str) -> Vec<Change> {
    let diff = TextDiff::from_lines(old, new);
    let patch = diff
        .unified_diff()
        .context_radius(3)
        .header("left", "right")
        .to_string();

    patch
        .split_inclusive('\n')
        .skip_while(|line| !line.starts_with("@@"))
        .map(|line| Change {
            value: line.to_string(),
            added: line.starts_with('+'),
            removed: line.starts_with('-'),
        })
        .collect()
}

/// Parse, sort keys, pretty-print with two spaces
fn canonical_json(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let mut pretty = serde_json::to_string_pretty(&value).ok()?;
    pretty.push('\n');
    Some(pretty)
}

fn json_changes(old: &str, new: &str) -> Vec<Change> {
    match (canonical_json(old), canonical_json(new)) {
        (Some(old), Some(new)) => diff_tokens(&line_tokens(&old), &line_tokens(&new)),
        _ => {
            debug!("JSON did not parse, falling back to a line diff");
            diff_tokens(&line_tokens(old), &line_tokens(new))
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Result of comparing one file pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextComparison {
    pub algorithm: DiffAlgorithm,
    pub changes: Vec<Change>,
}

impl TextComparison {
    pub fn is_identical(&self) -> bool {
        !self.changes.iter().any(Change::is_change)
    }
}

/// Runs text diffs on demand, applying the persisted diff settings
pub struct TextDiffEngine<'r> {
    registry: &'r FormatRegistry,
    settings: DiffSettings,
}

impl TextDiffEngine<'static> {
    pub fn new(settings: DiffSettings) -> Self {
        Self::with_registry(FormatRegistry::global(), settings)
    }
}

impl Default for TextDiffEngine<'static> {
    fn default() -> Self {
        Self::new(DiffSettings::default())
    }
}

impl<'r> TextDiffEngine<'r> {
    pub fn with_registry(registry: &'r FormatRegistry, settings: DiffSettings) -> Self {
        Self { registry, settings }
    }

    pub fn settings(&self) -> &DiffSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: DiffSettings) {
        self.settings = settings;
    }

    /// Normalize line endings and run the file's formatter, as configured
    pub fn prepare_text<'t>(&self, filename: &str, text: &'t str) -> Cow<'t, str> {
        let mut result = Cow::Borrowed(text);

        if self.settings.normalize_eol && result.contains('\r') {
            result = Cow::Owned(result.replace("\r\n", "\n").replace('\r', "\n"));
        }

        if self.settings.apply_formatter {
            if let Some(formatter) = self.registry.formatter_for(filename) {
                result = Cow::Owned(format_or_original(formatter, &result));
            }
        }

        result
    }

    pub fn available_algorithms(&self, filename: &str) -> &'r [DiffAlgorithm] {
        self.registry.diff_algorithms_for(filename)
    }

    /// Diff two texts as if they were both named `filename`. Without an
    /// explicit algorithm the file's preferred one is used.
    pub fn compare_text(
        &self,
        filename: &str,
        old: &str,
        new: &str,
        algorithm: Option<DiffAlgorithm>,
    ) -> Result<TextComparison, ZipDifferError> {
        let available = self.available_algorithms(filename);
        let algorithm = match algorithm {
            Some(algorithm) if available.contains(&algorithm) => algorithm,
            Some(algorithm) => {
                return Err(ZipDifferError::Comparison(format!(
                    "{} diff is not available for {}",
                    algorithm, filename
                )));
            }
            None => *available.first().ok_or_else(|| {
                ZipDifferError::Comparison(format!("{} is not a text file", filename))
            })?,
        };

        let old = self.prepare_text(filename, old);
        let new = self.prepare_text(filename, new);
        let changes = algorithm.apply(&old, &new, DiffFlags::from_settings(&self.settings));
        debug!("{} diff of {}: {} segments", algorithm, filename, changes.len());

        Ok(TextComparison { algorithm, changes })
    }

    /// Diff the two sides of a file entry; a missing side counts as empty
    pub fn compare_files(
        &self,
        file: &DiffFile<'_>,
        algorithm: Option<DiffAlgorithm>,
    ) -> Result<TextComparison, ZipDifferError> {
        let old = decode(file.left())?;
        let new = decode(file.right())?;
        self.compare_text(file.name(), old, new, algorithm)
    }
}

fn decode(file: Option<&File>) -> Result<&str, ZipDifferError> {
    match file {
        Some(file) => std::str::from_utf8(file.data()).map_err(|e| {
            ZipDifferError::Comparison(format!("{} is not valid UTF-8: {}", file.path(), e))
        }),
        None => Ok(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(changes: &[Change]) -> Vec<(&str, bool, bool)> {
        changes
            .iter()
            .map(|c| (c.value.as_str(), c.added, c.removed))
            .collect()
    }

    fn rebuild(changes: &[Change], side_added: bool) -> String {
        changes
            .iter()
            .filter(|c| if side_added { !c.removed } else { !c.added })
            .map(|c| c.value.as_str())
            .collect()
    }

    #[test]
    fn test_lines_diff() {
        let changes = DiffAlgorithm::Lines.apply(
            "line1\nline2\nline3\n",
            "line1\nline2_modified\nline3\n",
            DiffFlags::default(),
        );
        assert_eq!(
            changed(&changes),
            vec![
                ("line1\n", false, false),
                ("line2\n", false, true),
                ("line2_modified\n", true, false),
                ("line3\n", false, false),
            ]
        );
    }

    #[test]
    fn test_words_diff_keeps_whitespace_tokens() {
        let changes = DiffAlgorithm::Words.apply("Hello World", "Hello  Rust", DiffFlags::default());
        assert_eq!(
            changed(&changes),
            vec![
                ("Hello", false, false),
                (" World", false, true),
                ("  Rust", true, false),
            ]
        );
    }

    #[test]
    fn test_words_ignore_whitespace() {
        let flags = DiffFlags {
            ignore_whitespace: true,
            ..Default::default()
        };
        let changes = DiffAlgorithm::Words.apply("a  b\tc", "a b c", flags);
        assert_eq!(changed(&changes), vec![("a b c", false, false)]);
    }

    #[test]
    fn test_words_ignore_case() {
        let flags = DiffFlags {
            ignore_case: true,
            ..Default::default()
        };
        let changes = DiffAlgorithm::Words.apply("Hello World", "hello WORLD", flags);
        assert!(changes.iter().all(|c| !c.is_change()));
        assert_eq!(rebuild(&changes, true), "hello WORLD");
    }

    #[test]
    fn test_chars_diff_merges_adjacent_changes() {
        let changes = DiffAlgorithm::Chars.apply("abcdef", "abXYef", DiffFlags::default());
        assert_eq!(
            changed(&changes),
            vec![
                ("ab", false, false),
                ("cd", false, true),
                ("XY", true, false),
                ("ef", false, false),
            ]
        );
    }

    #[test]
    fn test_chars_ignore_case_and_unsupported_flag_ignored() {
        let flags = DiffFlags {
            ignore_case: true,
            ignore_whitespace: true,
        };
        let changes = DiffAlgorithm::Chars.apply("AbC", "abc", flags);
        assert_eq!(changed(&changes), vec![("abc", false, false)]);

        let changes = DiffAlgorithm::Chars.apply("a b", "ab", flags);
        assert!(changes.iter().any(Change::is_change));
    }

    #[test]
    fn test_lines_ignores_flags() {
        let flags = DiffFlags {
            ignore_case: true,
            ignore_whitespace: true,
        };
        let changes = DiffAlgorithm::Lines.apply("A\n", "a\n", flags);
        assert!(changes.iter().any(Change::is_change));
    }

    #[test]
    fn test_changes_reconstruct_both_sides() {
        let old = "the quick brown fox\njumps over\nthe lazy dog\n";
        let new = "the quick red fox\njumps over\na lazy dog!\n";
        for algorithm in [
            DiffAlgorithm::Lines,
            DiffAlgorithm::Words,
            DiffAlgorithm::Chars,
            DiffAlgorithm::Css,
        ] {
            let changes = algorithm.apply(old, new, DiffFlags::default());
            assert_eq!(rebuild(&changes, false), old, "{}", algorithm);
            assert_eq!(rebuild(&changes, true), new, "{}", algorithm);
        }
    }

    #[test]
    fn test_patch_drops_header() {
        let changes = DiffAlgorithm::Patch.apply("a\nb\nc\n", "a\nB\nc\n", DiffFlags::default());
        assert!(changes[0].value.starts_with("@@"));
        assert!(!changes[0].is_change());
        assert_eq!(
            changed(&changes[1..]),
            vec![
                (" a\n", false, false),
                ("-b\n", false, true),
                ("+B\n", true, false),
                (" c\n", false, false),
            ]
        );
    }

    #[test]
    fn test_patch_identical_is_empty() {
        assert!(DiffAlgorithm::Patch
            .apply("same\n", "same\n", DiffFlags::default())
            .is_empty());
    }

    #[test]
    fn test_css_tokens() {
        let tokens: Vec<&str> = css_tokens("a{color: red;}").iter().map(|t| t.text).collect();
        assert_eq!(tokens, vec!["a", "{", "color", ":", " ", "red", ";", "}"]);

        let changes = DiffAlgorithm::Css.apply("a{color:red}", "a{color:blue}", DiffFlags::default());
        assert_eq!(
            changed(&changes),
            vec![
                ("a{color:", false, false),
                ("red", false, true),
                ("blue", true, false),
                ("}", false, false),
            ]
        );
    }

    #[test]
    fn test_json_canonical_ignores_key_order() {
        let changes = DiffAlgorithm::Json.apply(
            r#"{"b": 1, "a": [1, 2]}"#,
            r#"{"a":[1,2],"b":1}"#,
            DiffFlags::default(),
        );
        assert_eq!(changes.len(), 1);
        assert!(!changes[0].is_change());
        assert_eq!(changes[0].value, "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": 1\n}\n");
    }

    #[test]
    fn test_json_falls_back_to_lines_on_invalid_input() {
        let changes = DiffAlgorithm::Json.apply("{oops\n", "{oops\n", DiffFlags::default());
        assert_eq!(changed(&changes), vec![("{oops\n", false, false)]);
    }

    #[test]
    fn test_algorithm_metadata() {
        assert_eq!("WORDS".parse::<DiffAlgorithm>().unwrap(), DiffAlgorithm::Words);
        assert!("nope".parse::<DiffAlgorithm>().is_err());
        assert_eq!(DiffAlgorithm::Css.name(), "CSS");
        assert!(DiffAlgorithm::Patch.supported_modifiers().is_empty());
        assert!(DiffAlgorithm::Words.supports(DiffModifier::IgnoreWhitespace));
        assert!(!DiffAlgorithm::Chars.supports(DiffModifier::IgnoreWhitespace));
    }

    #[test]
    fn test_prepare_text() {
        let settings = DiffSettings {
            normalize_eol: true,
            apply_formatter: true,
            ..Default::default()
        };
        let engine = TextDiffEngine::new(settings);
        assert_eq!(engine.prepare_text("a.txt", "x\r\ny\rz"), "x\ny\nz");
        assert_eq!(engine.prepare_text("a.css", "a{b:c}"), "a {\n    b:c\n}\n");
        assert_eq!(engine.prepare_text("a.css", "a{"), "a{");

        let plain = TextDiffEngine::default();
        assert!(matches!(plain.prepare_text("a.txt", "x\r\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_compare_text_picks_preferred_algorithm() {
        let engine = TextDiffEngine::default();
        let result = engine.compare_text("a.json", "{}", "{}", None).unwrap();
        assert_eq!(result.algorithm, DiffAlgorithm::Json);
        assert!(result.is_identical());

        let result = engine.compare_text("a.txt", "a", "b", None).unwrap();
        assert_eq!(result.algorithm, DiffAlgorithm::Patch);
        assert!(!result.is_identical());
    }

    #[test]
    fn test_compare_text_rejects_unavailable_algorithm() {
        let engine = TextDiffEngine::default();
        assert!(matches!(
            engine.compare_text("a.txt", "a", "b", Some(DiffAlgorithm::Json)),
            Err(ZipDifferError::Comparison(_))
        ));
        assert!(matches!(
            engine.compare_text("a.png", "a", "b", None),
            Err(ZipDifferError::Comparison(_))
        ));
    }

    #[test]
    fn test_normalize_eol_setting_hides_crlf() {
        let engine = TextDiffEngine::new(DiffSettings {
            normalize_eol: true,
            ..Default::default()
        });
        let result = engine
            .compare_text("readme.md", "Hello\n", "Hello\r\n", Some(DiffAlgorithm::Lines))
            .unwrap();
        assert!(result.is_identical());
    }
}
