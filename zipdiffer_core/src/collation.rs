//! Natural, case-insensitive ordering of entry names.
//!
//! Digit runs compare by numeric value (`file2 < file10`). Other characters
//! compare by class first (whitespace, then punctuation and symbols, then
//! digits, then letters) and by lowercase form within a class, so
//! `file.txt` sorts before `file1.txt`.

use std::cmp::Ordering;

fn class_rank(c: char) -> u8 {
    if c.is_whitespace() {
        0
    } else if c.is_ascii_digit() {
        2
    } else if c.is_alphanumeric() {
        3
    } else {
        1
    }
}

/// Split a leading run of ASCII digits off `s`
fn split_digits(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s.split_at(end)
}

fn compare_numbers(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

/// Compare two names the way entries are sorted inside a directory
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut left, mut right) = (a, b);

    loop {
        let (l, r) = match (left.chars().next(), right.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => (l, r),
        };

        if l.is_ascii_digit() && r.is_ascii_digit() {
            let (l_digits, l_rest) = split_digits(left);
            let (r_digits, r_rest) = split_digits(right);
            let ordering = compare_numbers(l_digits, r_digits);
            if ordering != Ordering::Equal {
                return ordering;
            }
            left = l_rest;
            right = r_rest;
            continue;
        }

        let ordering = class_rank(l)
            .cmp(&class_rank(r))
            .then_with(|| l.to_lowercase().cmp(r.to_lowercase()));
        if ordering != Ordering::Equal {
            return ordering;
        }
        left = &left[l.len_utf8()..];
        right = &right[r.len_utf8()..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        names.sort_by(|a, b| natural_cmp(a, b));
        names
    }

    #[test]
    fn test_numeric_suffixes_sort_by_value() {
        assert_eq!(sorted(&["f10", "f2", "F1"]), vec!["F1", "f2", "f10"]);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(natural_cmp("Readme.md", "readme.md"), Ordering::Equal);
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(natural_cmp("Zebra", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_leading_zeros_compare_numerically() {
        assert_eq!(natural_cmp("v007", "v7"), Ordering::Equal);
        assert_eq!(natural_cmp("v008", "v10"), Ordering::Less);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("file", "file1"), Ordering::Less);
        assert_eq!(natural_cmp("file.txt", "file.txt.bak"), Ordering::Less);
    }

    #[test]
    fn test_digits_before_letters() {
        assert_eq!(sorted(&["b", "10", "a", "2"]), vec!["2", "10", "a", "b"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_names() {
        assert_eq!(sorted(&["B", "a", "b"]), vec!["a", "B", "b"]);
    }

    #[test]
    fn test_punctuation_before_digits_before_letters() {
        assert_eq!(natural_cmp("file.txt", "file1.txt"), Ordering::Less);
        assert_eq!(natural_cmp("file-2", "file10"), Ordering::Less);
        assert_eq!(natural_cmp("file_a", "filea"), Ordering::Less);
        assert_eq!(natural_cmp("a b", "a-b"), Ordering::Less);
        assert_eq!(
            sorted(&["file1.txt", "file10", "file.txt", "file2.txt", "file-2"]),
            vec!["file-2", "file.txt", "file1.txt", "file2.txt", "file10"]
        );
    }

    #[test]
    fn test_non_ascii_letters_sort_after_digits() {
        assert_eq!(natural_cmp("Éclair", "éclair"), Ordering::Equal);
        assert_eq!(natural_cmp("9", "é"), Ordering::Less);
    }

    #[test]
    fn test_huge_numbers_do_not_overflow() {
        assert_eq!(
            natural_cmp("part99999999999999999999999", "part100000000000000000000000"),
            Ordering::Less
        );
    }
}
