pub mod archive;
#[cfg(feature = "archives")]
pub mod archive_reader;
pub mod classifier;
pub mod collation;
pub mod differ;
#[cfg(feature = "remote")]
pub mod downloader;
pub mod format_registry;
pub mod formatter;
pub mod text_diff;
pub mod url_state;

pub use archive::{Archive, ArchiveOrigin, Directory, File, RawEntry};
#[cfg(feature = "archives")]
pub use archive_reader::{load_archive, load_archive_file, load_pair, ArchiveKind};
pub use classifier::{classify, Classification};
pub use collation::natural_cmp;
pub use differ::{
    diff_archives, DiffArchive, DiffDirectory, DiffEntryRef, DiffFile, DiffSummary, TreeDiffer,
};
#[cfg(feature = "remote")]
pub use downloader::{download, download_archive, DownloadProgress, DownloadResponse};
pub use format_registry::{ExtensionInfo, FormatRegistry, HighlightLanguage};
pub use formatter::Formatter;
pub use text_diff::{Change, DiffAlgorithm, DiffFlags, DiffModifier, TextComparison, TextDiffEngine};
pub use url_state::{read_source, write_source, SourceRef};
