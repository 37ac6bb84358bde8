//! In-memory model of an extracted archive.
//!
//! An [`Archive`] owns a tree of [`Directory`] and [`File`] nodes built from
//! the flat entry list an archive reader produces. Every node records its
//! `/`-rooted path when it is created, so no node needs a reference to its
//! parent.

use crate::collation::natural_cmp;
use std::path::PathBuf;
use tracing::{debug, info};
use zipdiffer_common::{Blake3Hash, ZipDifferError};

/// One entry as produced by an archive reader, in archive-native order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub path: String,
    pub is_directory: bool,
    pub data: Option<Vec<u8>>,
}

impl RawEntry {
    pub fn file(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
            data: Some(data.into()),
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
            data: None,
        }
    }
}

/// Where an archive was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOrigin {
    LocalFile(PathBuf),
    Url(String),
    Memory,
}

pub(crate) fn child_path(parent_path: &str, name: &str) -> String {
    format!("{}/{}", parent_path.trim_end_matches('/'), name)
}

fn path_components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|component| !component.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: String,
    path: String,
    data: Vec<u8>,
}

impl File {
    fn new(name: &str, parent_path: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            path: child_path(parent_path, name),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Text after the last `.` of the name, if any
    pub fn extension(&self) -> Option<&str> {
        crate::format_registry::extension_of(&self.name)
    }

    pub fn content_hash(&self) -> Blake3Hash {
        blake3::hash(&self.data).into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    name: String,
    path: String,
    subdirs: Vec<Directory>,
    files: Vec<File>,
}

impl Directory {
    fn root() -> Self {
        Self {
            name: String::new(),
            path: "/".to_string(),
            subdirs: Vec::new(),
            files: Vec::new(),
        }
    }

    fn new(name: &str, parent_path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: child_path(parent_path, name),
            subdirs: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Empty for the root of an archive
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn subdirs(&self) -> &[Directory] {
        &self.subdirs
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    /// Number of directories below this one, at any depth
    pub fn total_subdirs(&self) -> usize {
        self.subdirs
            .iter()
            .fold(self.subdirs.len(), |total, subdir| total + subdir.total_subdirs())
    }

    /// Number of files in this directory and below
    pub fn total_files(&self) -> usize {
        self.subdirs
            .iter()
            .fold(self.files.len(), |total, subdir| total + subdir.total_files())
    }

    /// Uncompressed size of every file in this directory and below
    pub fn total_size(&self) -> u64 {
        let own: u64 = self.files.iter().map(File::size).sum();
        self.subdirs
            .iter()
            .fold(own, |total, subdir| total + subdir.total_size())
    }

    /// Direct child directory by name; an exact match wins over a
    /// case-insensitive one
    pub fn subdir(&self, name: &str, case_sensitive: bool) -> Option<&Directory> {
        find_named(&self.subdirs, name, case_sensitive, |d| d.name.as_str())
    }

    /// Direct child file by name; an exact match wins over a case-insensitive
    /// one
    pub fn file(&self, name: &str, case_sensitive: bool) -> Option<&File> {
        find_named(&self.files, name, case_sensitive, |f| f.name.as_str())
    }

    /// Resolve a `/`-separated path relative to this directory. Leading and
    /// trailing slashes are ignored; an empty path is this directory.
    pub fn get_directory_by_path(&self, path: &str, case_sensitive: bool) -> Option<&Directory> {
        path_components(path).try_fold(self, |dir, name| dir.subdir(name, case_sensitive))
    }

    pub fn get_file_by_path(&self, path: &str, case_sensitive: bool) -> Option<&File> {
        let trimmed = path.trim_matches('/');
        let (dir_path, name) = match trimmed.rsplit_once('/') {
            Some((dir_path, name)) => (dir_path, name),
            None => ("", trimmed),
        };
        if name.is_empty() {
            return None;
        }
        self.get_directory_by_path(dir_path, case_sensitive)?
            .file(name, case_sensitive)
    }

    fn subdir_or_create(&mut self, name: &str) -> &mut Directory {
        let index = match self.subdirs.iter().position(|d| d.name == name) {
            Some(index) => index,
            None => {
                let subdir = Directory::new(name, &self.path);
                self.subdirs.push(subdir);
                self.subdirs.len() - 1
            }
        };
        &mut self.subdirs[index]
    }

    /// Walk `path`, creating every missing directory on the way. Creation
    /// matches existing names exactly.
    fn directory_or_create(&mut self, path: &str) -> &mut Directory {
        let mut dir = self;
        for name in path_components(path) {
            dir = dir.subdir_or_create(name);
        }
        dir
    }

    fn sort_recursive(&mut self) {
        self.subdirs.sort_by(|a, b| natural_cmp(&a.name, &b.name));
        self.files.sort_by(|a, b| natural_cmp(&a.name, &b.name));
        for subdir in &mut self.subdirs {
            subdir.sort_recursive();
        }
    }
}

fn find_named<'a, T>(
    items: &'a [T],
    name: &str,
    case_sensitive: bool,
    name_of: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    items.iter().find(|item| name_of(item) == name).or_else(|| {
        if case_sensitive {
            return None;
        }
        let lowercase = name.to_lowercase();
        items
            .iter()
            .find(|item| name_of(item).to_lowercase() == lowercase)
    })
}

/// A fully loaded archive: the root directory plus where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    root: Directory,
    original_filename: String,
    compressed_byte_length: u64,
    origin: ArchiveOrigin,
}

impl Archive {
    /// Build the tree from raw entries. Any malformed entry aborts the whole
    /// construction; no partially built archive is returned.
    pub fn from_entries<I>(
        original_filename: impl Into<String>,
        compressed_byte_length: u64,
        origin: ArchiveOrigin,
        entries: I,
    ) -> Result<Self, ZipDifferError>
    where
        I: IntoIterator<Item = RawEntry>,
    {
        let original_filename = original_filename.into();
        let mut root = Directory::root();

        for entry in entries {
            add_entry(&mut root, entry)?;
        }
        root.sort_recursive();

        info!(
            "Loaded {}: {} files in {} directories",
            original_filename,
            root.total_files(),
            root.total_subdirs()
        );

        Ok(Self {
            root,
            original_filename,
            compressed_byte_length,
            origin,
        })
    }

    /// An archive without any entry
    pub fn empty(original_filename: impl Into<String>) -> Self {
        Self {
            root: Directory::root(),
            original_filename: original_filename.into(),
            compressed_byte_length: 0,
            origin: ArchiveOrigin::Memory,
        }
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub fn compressed_byte_length(&self) -> u64 {
        self.compressed_byte_length
    }

    pub fn origin(&self) -> &ArchiveOrigin {
        &self.origin
    }

    pub fn get_directory_by_path(&self, path: &str, case_sensitive: bool) -> Option<&Directory> {
        self.root.get_directory_by_path(path, case_sensitive)
    }

    pub fn get_file_by_path(&self, path: &str, case_sensitive: bool) -> Option<&File> {
        self.root.get_file_by_path(path, case_sensitive)
    }

    pub fn total_subdirs(&self) -> usize {
        self.root.total_subdirs()
    }

    pub fn total_files(&self) -> usize {
        self.root.total_files()
    }

    pub fn total_size(&self) -> u64 {
        self.root.total_size()
    }
}

fn add_entry(root: &mut Directory, entry: RawEntry) -> Result<(), ZipDifferError> {
    let path = entry.path.trim_matches('/');

    if path.is_empty() {
        if !entry.is_directory {
            return Err(ZipDifferError::MalformedArchive(
                "root of archive contains a file".to_string(),
            ));
        }
        return Ok(());
    }

    if entry.is_directory {
        debug!("Directory entry {}", path);
        root.directory_or_create(path);
        return Ok(());
    }

    let data = entry.data.ok_or_else(|| {
        ZipDifferError::MalformedArchive(format!("file entry {} has no data", path))
    })?;
    let (dir_path, name) = path.rsplit_once('/').unwrap_or(("", path));
    let dir = root.directory_or_create(dir_path);
    debug!("File entry {} ({} bytes)", path, data.len());
    dir.files.push(File::new(name, &dir.path, data));
    Ok(())
}
