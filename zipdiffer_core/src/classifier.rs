//! Decides how much two versions of a file differ.

use crate::archive::File;
use crate::format_registry::FormatRegistry;
use zipdiffer_common::DifferenceType;

pub const NOTE_MISSING_LEFT: &str = "File missing in left archive";
pub const NOTE_MISSING_RIGHT: &str = "File missing in right archive";
pub const NOTE_MISSING_BOTH: &str = "File missing in both archives";
pub const NOTE_WHITESPACE_ONLY: &str = "Only whitespace differences";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub difference_type: DifferenceType,
    pub notes: Option<String>,
}

impl Classification {
    fn new(difference_type: DifferenceType) -> Self {
        Self {
            difference_type,
            notes: None,
        }
    }

    fn with_note(difference_type: DifferenceType, note: &str) -> Self {
        Self {
            difference_type,
            notes: Some(note.to_string()),
        }
    }
}

/// Classify a file pair.
///
/// Identical bytes are `None`. For text formats (decided by the left file's
/// extension) contents that only differ in whitespace are `WhitespacesOnly`;
/// everything else, including undecodable text, is `Different`.
pub fn classify(left: Option<&File>, right: Option<&File>, registry: &FormatRegistry) -> Classification {
    let (left, right) = match (left, right) {
        (Some(left), Some(right)) => (left, right),
        (None, Some(_)) => return Classification::with_note(DifferenceType::Different, NOTE_MISSING_LEFT),
        (Some(_), None) => return Classification::with_note(DifferenceType::Different, NOTE_MISSING_RIGHT),
        (None, None) => return Classification::with_note(DifferenceType::Different, NOTE_MISSING_BOTH),
    };

    let same_size = left.size() == right.size();
    if same_size && left.data() == right.data() {
        return Classification::new(DifferenceType::None);
    }

    if !registry.is_text(left.name()) {
        return Classification::new(DifferenceType::Different);
    }

    match (std::str::from_utf8(left.data()), std::str::from_utf8(right.data())) {
        (Ok(left_text), Ok(right_text)) if equal_ignoring_whitespace(left_text, right_text) => {
            Classification::with_note(DifferenceType::WhitespacesOnly, NOTE_WHITESPACE_ONLY)
        }
        _ => Classification::new(DifferenceType::Different),
    }
}

/// Whitespace as text editors see it; a byte order mark counts too
fn is_blank(c: &char) -> bool {
    c.is_whitespace() || *c == '\u{feff}'
}

fn equal_ignoring_whitespace(left: &str, right: &str) -> bool {
    left.chars()
        .filter(|c| !is_blank(c))
        .eq(right.chars().filter(|c| !is_blank(c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{Archive, ArchiveOrigin, RawEntry};

    fn pair(name: &str, left: &[u8], right: &[u8]) -> (Archive, Archive) {
        let build = |data: &[u8]| {
            Archive::from_entries(
                "test.zip",
                0,
                ArchiveOrigin::Memory,
                vec![RawEntry::file(name, data)],
            )
            .unwrap()
        };
        (build(left), build(right))
    }

    fn classify_pair(name: &str, left: &[u8], right: &[u8]) -> Classification {
        let (l, r) = pair(name, left, right);
        classify(
            l.get_file_by_path(name, true),
            r.get_file_by_path(name, true),
            FormatRegistry::global(),
        )
    }

    #[test]
    fn test_identical_bytes() {
        let result = classify_pair("a.bin", b"\x00\x01", b"\x00\x01");
        assert_eq!(result.difference_type, DifferenceType::None);
        assert_eq!(result.notes, None);
    }

    #[test]
    fn test_whitespace_only_text() {
        let result = classify_pair("a.txt", b"a b\nc", b"a  b\r\nc");
        assert_eq!(result.difference_type, DifferenceType::WhitespacesOnly);
        assert_eq!(result.notes.as_deref(), Some(NOTE_WHITESPACE_ONLY));

        let result = classify_pair("readme.md", b"Hello\n", b"Hello\r\n");
        assert_eq!(result.difference_type, DifferenceType::WhitespacesOnly);
    }

    #[test]
    fn test_spaces_and_tabs_depend_on_format() {
        let result = classify_pair("notes.txt", b"a b\nc", b"a  b\n\tc");
        assert_eq!(result.difference_type, DifferenceType::WhitespacesOnly);
        assert_eq!(result.notes.as_deref(), Some(NOTE_WHITESPACE_ONLY));

        let result = classify_pair("image.png", b"a b\nc", b"a  b\n\tc");
        assert_eq!(result.difference_type, DifferenceType::Different);
        assert_eq!(result.notes, None);

        let result = classify_pair("notes.txt", b"a b\nc", b"a  b\n\td");
        assert_eq!(result.difference_type, DifferenceType::Different);
    }

    #[test]
    fn test_byte_order_mark_counts_as_whitespace() {
        let result = classify_pair("a.txt", "\u{feff}hello\n".as_bytes(), b"hello\n");
        assert_eq!(result.difference_type, DifferenceType::WhitespacesOnly);
    }

    #[test]
    fn test_whitespace_only_same_size() {
        let result = classify_pair("a.txt", b"a b", b"ab ");
        assert_eq!(result.difference_type, DifferenceType::WhitespacesOnly);
    }

    #[test]
    fn test_text_content_change() {
        let result = classify_pair("a.txt", b"abc", b"abd");
        assert_eq!(result.difference_type, DifferenceType::Different);
        assert_eq!(result.notes, None);
    }

    #[test]
    fn test_binary_whitespace_is_different() {
        let result = classify_pair("a.bin", b"a b", b"ab");
        assert_eq!(result.difference_type, DifferenceType::Different);
        let result = classify_pair("logo.png", b"a b", b"ab ");
        assert_eq!(result.difference_type, DifferenceType::Different);
    }

    #[test]
    fn test_invalid_utf8_text_is_different() {
        let result = classify_pair("a.txt", b"\xff a", b"\xff  a");
        assert_eq!(result.difference_type, DifferenceType::Different);
    }

    #[test]
    fn test_missing_sides() {
        let (left, _) = pair("a.txt", b"x", b"x");
        let file = left.get_file_by_path("a.txt", true);
        let registry = FormatRegistry::global();

        let result = classify(None, file, registry);
        assert_eq!(result.difference_type, DifferenceType::Different);
        assert_eq!(result.notes.as_deref(), Some(NOTE_MISSING_LEFT));

        let result = classify(file, None, registry);
        assert_eq!(result.notes.as_deref(), Some(NOTE_MISSING_RIGHT));

        let result = classify(None, None, registry);
        assert_eq!(result.difference_type, DifferenceType::Different);
        assert_eq!(result.notes.as_deref(), Some(NOTE_MISSING_BOTH));
    }
}
