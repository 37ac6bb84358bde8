//! Reconciles two archive trees into one diff tree.
//!
//! Children are paired by name at every directory level. Entries found on
//! one side only are reported as missing on the other, and whole one-sided
//! directories are expanded so that every descendant shows up. The diff
//! borrows both archives and is never updated after construction.

use crate::archive::{child_path, Archive, Directory, File};
use crate::classifier::classify;
use crate::format_registry::FormatRegistry;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};
use zipdiffer_common::{DifferenceType, TreeDiffOptions};

#[derive(Debug, Clone)]
pub struct DiffFile<'a> {
    name: &'a str,
    path: String,
    left: Option<&'a File>,
    right: Option<&'a File>,
    notes: String,
    difference_type: DifferenceType,
}

impl<'a> DiffFile<'a> {
    /// Name of the left file, or of the right one when the left is missing
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn left(&self) -> Option<&'a File> {
        self.left
    }

    pub fn right(&self) -> Option<&'a File> {
        self.right
    }

    /// Empty when there is nothing to say
    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn difference_type(&self) -> DifferenceType {
        self.difference_type
    }

    pub fn is_different(&self) -> bool {
        self.difference_type.is_different()
    }
}

#[derive(Debug, Clone)]
pub struct DiffDirectory<'a> {
    name: &'a str,
    path: String,
    left: Option<&'a Directory>,
    right: Option<&'a Directory>,
    notes: String,
    subdirs: Vec<DiffDirectory<'a>>,
    files: Vec<DiffFile<'a>>,
    difference_type: DifferenceType,
}

impl<'a> DiffDirectory<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn left(&self) -> Option<&'a Directory> {
        self.left
    }

    pub fn right(&self) -> Option<&'a Directory> {
        self.right
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn subdirs(&self) -> &[DiffDirectory<'a>] {
        &self.subdirs
    }

    pub fn files(&self) -> &[DiffFile<'a>] {
        &self.files
    }

    /// Maximum severity of all children, or `Different` when one side of
    /// the directory itself is missing
    pub fn difference_type(&self) -> DifferenceType {
        self.difference_type
    }

    pub fn is_different(&self) -> bool {
        self.difference_type.is_different()
    }

    pub fn subdir(&self, name: &str, case_sensitive: bool) -> Option<&DiffDirectory<'a>> {
        self.subdirs.iter().find(|d| d.name == name).or_else(|| {
            if case_sensitive {
                return None;
            }
            let lowercase = name.to_lowercase();
            self.subdirs.iter().find(|d| d.name.to_lowercase() == lowercase)
        })
    }

    pub fn file(&self, name: &str, case_sensitive: bool) -> Option<&DiffFile<'a>> {
        self.files.iter().find(|f| f.name == name).or_else(|| {
            if case_sensitive {
                return None;
            }
            let lowercase = name.to_lowercase();
            self.files.iter().find(|f| f.name.to_lowercase() == lowercase)
        })
    }

    pub fn get_directory_by_path(
        &self,
        path: &str,
        case_sensitive: bool,
    ) -> Option<&DiffDirectory<'a>> {
        path.split('/')
            .filter(|component| !component.is_empty())
            .try_fold(self, |dir, name| dir.subdir(name, case_sensitive))
    }

    pub fn get_file_by_path(&self, path: &str, case_sensitive: bool) -> Option<&DiffFile<'a>> {
        let trimmed = path.trim_matches('/');
        let (dir_path, name) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));
        if name.is_empty() {
            return None;
        }
        self.get_directory_by_path(dir_path, case_sensitive)?
            .file(name, case_sensitive)
    }
}

/// Borrowed view of one node of the diff tree
#[derive(Debug, Clone, Copy)]
pub enum DiffEntryRef<'d, 'a> {
    Directory(&'d DiffDirectory<'a>),
    File(&'d DiffFile<'a>),
}

impl<'d, 'a> DiffEntryRef<'d, 'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            DiffEntryRef::Directory(d) => d.name(),
            DiffEntryRef::File(f) => f.name(),
        }
    }

    pub fn path(&self) -> &'d str {
        match *self {
            DiffEntryRef::Directory(d) => d.path(),
            DiffEntryRef::File(f) => f.path(),
        }
    }

    pub fn notes(&self) -> &'d str {
        match *self {
            DiffEntryRef::Directory(d) => d.notes(),
            DiffEntryRef::File(f) => f.notes(),
        }
    }

    pub fn difference_type(&self) -> DifferenceType {
        match *self {
            DiffEntryRef::Directory(d) => d.difference_type(),
            DiffEntryRef::File(f) => f.difference_type(),
        }
    }

    pub fn has_left(&self) -> bool {
        match *self {
            DiffEntryRef::Directory(d) => d.left().is_some(),
            DiffEntryRef::File(f) => f.left().is_some(),
        }
    }

    pub fn has_right(&self) -> bool {
        match *self {
            DiffEntryRef::Directory(d) => d.right().is_some(),
            DiffEntryRef::File(f) => f.right().is_some(),
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, DiffEntryRef::Directory(_))
    }

    /// Number of path components; the root is at depth 0
    pub fn depth(&self) -> usize {
        self.path().split('/').filter(|c| !c.is_empty()).count()
    }
}

/// Pre-order traversal; subdirectories come before files at every level
pub struct DiffIter<'d, 'a> {
    stack: Vec<DiffEntryRef<'d, 'a>>,
}

impl<'d, 'a> Iterator for DiffIter<'d, 'a> {
    type Item = DiffEntryRef<'d, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.stack.pop()?;
        if let DiffEntryRef::Directory(dir) = entry {
            self.stack
                .extend(dir.files.iter().rev().map(DiffEntryRef::File));
            self.stack
                .extend(dir.subdirs.iter().rev().map(DiffEntryRef::Directory));
        }
        Some(entry)
    }
}

/// File counts per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub identical: usize,
    pub whitespace_only: usize,
    pub different: usize,
    pub left_only: usize,
    pub right_only: usize,
}

impl DiffSummary {
    pub fn total(&self) -> usize {
        self.identical + self.whitespace_only + self.different + self.left_only + self.right_only
    }
}

/// The diff of two archives
#[derive(Debug, Clone)]
pub struct DiffArchive<'a> {
    left: &'a Archive,
    right: &'a Archive,
    root: DiffDirectory<'a>,
}

impl<'a> DiffArchive<'a> {
    pub fn left(&self) -> &'a Archive {
        self.left
    }

    pub fn right(&self) -> &'a Archive {
        self.right
    }

    pub fn root(&self) -> &DiffDirectory<'a> {
        &self.root
    }

    pub fn difference_type(&self) -> DifferenceType {
        self.root.difference_type()
    }

    pub fn is_different(&self) -> bool {
        self.root.is_different()
    }

    pub fn get_directory_by_path(
        &self,
        path: &str,
        case_sensitive: bool,
    ) -> Option<&DiffDirectory<'a>> {
        self.root.get_directory_by_path(path, case_sensitive)
    }

    pub fn get_file_by_path(&self, path: &str, case_sensitive: bool) -> Option<&DiffFile<'a>> {
        self.root.get_file_by_path(path, case_sensitive)
    }

    /// Every node, the root included
    pub fn iter(&self) -> DiffIter<'_, 'a> {
        DiffIter {
            stack: vec![DiffEntryRef::Directory(&self.root)],
        }
    }

    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for entry in self.iter() {
            let DiffEntryRef::File(file) = entry else {
                continue;
            };
            match (file.left(), file.right(), file.difference_type()) {
                (Some(_), None, _) => summary.left_only += 1,
                (None, Some(_), _) => summary.right_only += 1,
                (_, _, DifferenceType::None) => summary.identical += 1,
                (_, _, DifferenceType::WhitespacesOnly) => summary.whitespace_only += 1,
                (_, _, DifferenceType::Different) => summary.different += 1,
            }
        }
        summary
    }
}

/// Builds [`DiffArchive`]s
#[derive(Debug, Clone)]
pub struct TreeDiffer<'r> {
    registry: &'r FormatRegistry,
    options: TreeDiffOptions,
}

impl TreeDiffer<'static> {
    pub fn new() -> Self {
        Self::with_registry(FormatRegistry::global())
    }
}

impl Default for TreeDiffer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> TreeDiffer<'r> {
    pub fn with_registry(registry: &'r FormatRegistry) -> Self {
        Self {
            registry,
            options: TreeDiffOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TreeDiffOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TreeDiffOptions {
        &self.options
    }

    pub fn diff<'a>(&self, left: &'a Archive, right: &'a Archive) -> DiffArchive<'a> {
        let root = self.diff_directory(None, Some(left.root()), Some(right.root()));
        info!(
            "Compared {} with {}: {}",
            left.original_filename(),
            right.original_filename(),
            root.difference_type
        );
        DiffArchive { left, right, root }
    }

    fn diff_directory<'a>(
        &self,
        parent_path: Option<&str>,
        left: Option<&'a Directory>,
        right: Option<&'a Directory>,
    ) -> DiffDirectory<'a> {
        let name = entry_name(left.map(Directory::name), right.map(Directory::name));
        let path = match parent_path {
            Some(parent_path) => child_path(parent_path, name),
            None => "/".to_string(),
        };

        let mut subdirs = Vec::new();
        let mut files = Vec::new();

        match (left, right) {
            (Some(l), Some(r)) => {
                let dir_pairs = if parent_path.is_none()
                    && self.options.unwrap_single_root
                    && is_single_root(l)
                    && is_single_root(r)
                {
                    debug!("Unwrapping single root directories");
                    vec![(l.subdirs().first(), r.subdirs().first())]
                } else {
                    pair_children(
                        l.subdirs(),
                        r.subdirs(),
                        Directory::name,
                        self.options.case_insensitive_pairing,
                    )
                };
                for (ls, rs) in dir_pairs {
                    subdirs.push(self.diff_directory(Some(&path), ls, rs));
                }
                for (lf, rf) in pair_children(
                    l.files(),
                    r.files(),
                    File::name,
                    self.options.case_insensitive_pairing,
                ) {
                    files.push(self.diff_file(&path, lf, rf));
                }
            }
            (Some(one), None) | (None, Some(one)) => {
                let on_left = left.is_some();
                for subdir in one.subdirs() {
                    subdirs.push(self.diff_directory(
                        Some(&path),
                        on_left.then_some(subdir),
                        (!on_left).then_some(subdir),
                    ));
                }
                for file in one.files() {
                    files.push(self.diff_file(
                        &path,
                        on_left.then_some(file),
                        (!on_left).then_some(file),
                    ));
                }
            }
            (None, None) => {}
        }

        let difference_type = if left.is_none() || right.is_none() {
            DifferenceType::Different
        } else {
            subdirs
                .iter()
                .map(|d| d.difference_type)
                .chain(files.iter().map(|f| f.difference_type))
                .max()
                .unwrap_or(DifferenceType::None)
        };

        DiffDirectory {
            name,
            path,
            left,
            right,
            notes: directory_notes(left, right),
            subdirs,
            files,
            difference_type,
        }
    }

    fn diff_file<'a>(
        &self,
        parent_path: &str,
        left: Option<&'a File>,
        right: Option<&'a File>,
    ) -> DiffFile<'a> {
        let name = entry_name(left.map(File::name), right.map(File::name));
        let path = child_path(parent_path, name);
        let classification = classify(left, right, self.registry);
        debug!("{}: {}", path, classification.difference_type);

        let notes = match (left, right) {
            (Some(l), Some(r)) if l.name() != r.name() => {
                format!("File name changed from \"{}\" to \"{}\"", l.name(), r.name())
            }
            _ => classification.notes.unwrap_or_default(),
        };

        DiffFile {
            name,
            path,
            left,
            right,
            notes,
            difference_type: classification.difference_type,
        }
    }
}

/// Diff two archives with the built-in registry and default options
pub fn diff_archives<'a>(left: &'a Archive, right: &'a Archive) -> DiffArchive<'a> {
    TreeDiffer::new().diff(left, right)
}

fn entry_name<'a>(left: Option<&'a str>, right: Option<&'a str>) -> &'a str {
    left.or(right).unwrap_or("?")
}

fn is_single_root(dir: &Directory) -> bool {
    dir.files().is_empty() && dir.subdirs().len() == 1
}

fn directory_notes(left: Option<&Directory>, right: Option<&Directory>) -> String {
    match (left, right) {
        (None, None) => "Directory missing in both archives".to_string(),
        (None, Some(_)) => "Directory missing in left archive".to_string(),
        (Some(_), None) => "Directory missing in right archive".to_string(),
        (Some(l), Some(r)) if l.name() != r.name() => {
            format!("Directory name changed from \"{}\" to \"{}\"", l.name(), r.name())
        }
        _ => String::new(),
    }
}

type Pair<'a, T> = (Option<&'a T>, Option<&'a T>);

/// Pair left children with right children by name. Output keeps the left
/// order, followed by the unpaired right children in their own order.
fn pair_children<'a, T>(
    left: &'a [T],
    right: &'a [T],
    name_of: impl Fn(&T) -> &str,
    case_insensitive: bool,
) -> Vec<Pair<'a, T>> {
    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::with_capacity(right.len());
    for (index, item) in right.iter().enumerate() {
        by_name.entry(name_of(item)).or_default().push(index);
    }

    let mut consumed = vec![false; right.len()];
    let mut matches: Vec<Option<usize>> = Vec::with_capacity(left.len());
    for item in left {
        let found = by_name
            .get(name_of(item))
            .and_then(|candidates| candidates.iter().copied().find(|&i| !consumed[i]));
        if let Some(index) = found {
            consumed[index] = true;
        }
        matches.push(found);
    }

    if case_insensitive {
        for (item, found) in left.iter().zip(matches.iter_mut()) {
            if found.is_some() {
                continue;
            }
            let lowercase = name_of(item).to_lowercase();
            *found = (0..right.len())
                .find(|&j| !consumed[j] && name_of(&right[j]).to_lowercase() == lowercase);
            if let Some(index) = *found {
                consumed[index] = true;
            }
        }
    }

    let mut pairs: Vec<Pair<'a, T>> = left
        .iter()
        .zip(matches)
        .map(|(item, found)| (Some(item), found.map(|j| &right[j])))
        .collect();
    pairs.extend(
        right
            .iter()
            .zip(consumed)
            .filter(|(_, used)| !used)
            .map(|(item, _)| (None, Some(item))),
    );
    pairs
}
