//! Extracts archive files into [`RawEntry`] lists and loads them as
//! [`Archive`]s.

use crate::archive::{Archive, ArchiveOrigin, RawEntry};
use flate2::read::GzDecoder;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info};
use zip::ZipArchive;
use zipdiffer_common::ZipDifferError;

/// Container formats that can be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

/// Extensions of formats that are ZIP files underneath
const ZIP_EXTENSIONS: &[&str] = &[
    ".zip", ".jar", ".war", ".ear", ".apk", ".epub", ".docx", ".xlsx", ".pptx", ".odt", ".ods",
    ".odp", ".nupkg", ".vsix", ".whl", ".xpi",
];

impl ArchiveKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if lower.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else if ZIP_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            Some(ArchiveKind::Zip)
        } else {
            None
        }
    }

    /// Guess the format from the leading bytes
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"PK\x03\x04") || data.starts_with(b"PK\x05\x06") {
            Some(ArchiveKind::Zip)
        } else if data.starts_with(&[0x1f, 0x8b]) {
            Some(ArchiveKind::TarGz)
        } else if data.get(257..262) == Some(b"ustar".as_slice()) {
            Some(ArchiveKind::Tar)
        } else {
            None
        }
    }

    pub fn detect(filename: &str, data: &[u8]) -> Option<Self> {
        Self::from_filename(filename).or_else(|| Self::sniff(data))
    }

    pub fn name(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Tar => "tar",
            ArchiveKind::TarGz => "tar.gz",
        }
    }
}

fn malformed(context: &str, e: impl std::fmt::Display) -> ZipDifferError {
    ZipDifferError::MalformedArchive(format!("{}: {}", context, e))
}

/// Read every entry of an archive in archive order
pub fn read_entries(kind: ArchiveKind, data: &[u8]) -> Result<Vec<RawEntry>, ZipDifferError> {
    match kind {
        ArchiveKind::Zip => read_zip_entries(data),
        ArchiveKind::Tar => read_tar_entries(data),
        ArchiveKind::TarGz => read_tar_entries(GzDecoder::new(data)),
    }
}

fn read_zip_entries(data: &[u8]) -> Result<Vec<RawEntry>, ZipDifferError> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| malformed("invalid zip archive", e))?;
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| malformed("invalid zip entry", e))?;
        let path = file.name().to_string();

        if file.is_dir() {
            entries.push(RawEntry::directory(path));
            continue;
        }

        // Declared sizes are not trusted
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| malformed(&format!("cannot extract {}", path), e))?;
        debug!("zip entry {} ({} bytes)", path, contents.len());
        entries.push(RawEntry::file(path, contents));
    }

    Ok(entries)
}

/// Tar paths are often written as `./dir/file`
fn normalize_tar_path(path: &str) -> &str {
    let mut path = path;
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    if path == "." {
        ""
    } else {
        path
    }
}

fn read_tar_entries<R: Read>(reader: R) -> Result<Vec<RawEntry>, ZipDifferError> {
    let mut archive = tar::Archive::new(reader);
    let mut entries = Vec::new();

    for entry in archive
        .entries()
        .map_err(|e| malformed("invalid tar archive", e))?
    {
        let mut entry = entry.map_err(|e| malformed("invalid tar entry", e))?;
        let raw_path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let path = normalize_tar_path(&raw_path).to_string();
        let entry_type = entry.header().entry_type();

        if entry_type.is_dir() {
            entries.push(RawEntry::directory(path));
        } else if entry_type.is_file() {
            let mut contents = Vec::new();
            entry
                .read_to_end(&mut contents)
                .map_err(|e| malformed(&format!("cannot extract {}", path), e))?;
            debug!("tar entry {} ({} bytes)", path, contents.len());
            entries.push(RawEntry::file(path, contents));
        } else {
            debug!("Skipping tar entry {} of type {:?}", path, entry_type);
        }
    }

    Ok(entries)
}

/// Detect the format of `data`, extract it and build the tree
pub fn load_archive(
    filename: &str,
    data: &[u8],
    origin: ArchiveOrigin,
) -> Result<Archive, ZipDifferError> {
    let kind = ArchiveKind::detect(filename, data).ok_or_else(|| {
        ZipDifferError::UnsupportedArchive(format!("{} is not a zip or tar archive", filename))
    })?;
    info!("Reading {} as {}", filename, kind.name());
    let entries = read_entries(kind, data)?;
    Archive::from_entries(filename, data.len() as u64, origin, entries)
}

pub fn load_archive_file(path: &Path) -> Result<Archive, ZipDifferError> {
    let data = fs::read(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    load_archive(&filename, &data, ArchiveOrigin::LocalFile(path.to_path_buf()))
}

/// Load both archives in parallel
pub fn load_pair(left: &Path, right: &Path) -> Result<(Archive, Archive), ZipDifferError> {
    let (left, right) = rayon::join(|| load_archive_file(left), || load_archive_file(right));
    Ok((left?, right?))
}
