use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;
use zipdiffer_common::{
    format_size, load_config, parse_bool, save_config, Credentials, DiffSettings, DifferenceType,
    DownloadOptions, FileFormat, Redirect, SettingKey,
};
use zipdiffer_core::{
    download_archive, load_archive_file, load_pair, read_source, write_source, Archive, Change,
    DiffAlgorithm, DiffArchive, DiffEntryRef, DiffSummary, ExtensionInfo, FormatRegistry, SourceRef,
    TextDiffEngine, TreeDiffer,
};

#[derive(Parser)]
#[command(name = "zipdiffer")]
#[command(version)]
#[command(about = "Compare the contents of two zip or tar archives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two archives and print the difference tree
    Compare {
        /// Left archive (path or http(s) URL)
        #[arg(required_unless_present = "link")]
        left: Option<String>,

        /// Right archive (path or http(s) URL)
        #[arg(required_unless_present = "link")]
        right: Option<String>,

        /// Read both sources from a link created with `zipdiffer link`
        #[arg(long, conflicts_with_all = ["left", "right"])]
        link: Option<String>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Show only differences (hide identical entries)
        #[arg(short = 'd', long)]
        diff_only: bool,

        /// Disable ANSI colors in output
        #[arg(long)]
        no_color: bool,

        /// Pair the single top-level directories even when their names differ
        #[arg(long)]
        unwrap_root: bool,

        /// Pair entries whose names only differ in case
        #[arg(long)]
        case_insensitive: bool,
    },

    /// Show the text diff of one file of both archives
    Show {
        left: String,
        right: String,

        /// Path of the file inside the archives
        path: String,

        /// Diff algorithm (patch, lines, words, chars, css, json)
        #[arg(short, long)]
        algorithm: Option<String>,

        #[arg(long)]
        ignore_case: bool,

        #[arg(long)]
        ignore_whitespace: bool,

        /// Convert CRLF and CR line endings to LF first
        #[arg(long)]
        normalize_eol: bool,

        /// Run the file type's formatter on both sides first
        #[arg(long)]
        format: bool,

        #[arg(long)]
        no_color: bool,
    },

    /// Print size and entry counts of an archive
    Info {
        /// Archive path or http(s) URL
        archive: String,
    },

    /// Manage the persisted diff settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Describe a file extension, or list every known extension
    Formats { extension: Option<String> },

    /// Store archive URLs in the query string of a page URL
    Link {
        /// Page URL the sources are written into
        page: String,

        #[arg(long)]
        left: Option<String>,

        #[arg(long)]
        right: Option<String>,

        /// File extension to assume when the server sends no filename
        #[arg(long)]
        ext: Option<String>,

        /// Fail instead of following redirects
        #[arg(long)]
        no_redirect: bool,

        /// When to send credentials (same-origin, omit, include)
        #[arg(long)]
        credentials: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print every setting with its current value
    List,
    /// Change a setting, e.g. `set diff.ignoreCase true`
    Set { key: String, value: String },
    /// Restore the defaults
    Reset,
}

fn main() {
    // Logs go to stderr so JSON output stays clean on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare {
            left,
            right,
            link,
            json,
            diff_only,
            no_color,
            unwrap_root,
            case_insensitive,
        } => run_compare(CompareArgs {
            left,
            right,
            link,
            json,
            diff_only,
            no_color,
            unwrap_root,
            case_insensitive,
        }),
        Commands::Show {
            left,
            right,
            path,
            algorithm,
            ignore_case,
            ignore_whitespace,
            normalize_eol,
            format,
            no_color,
        } => {
            let overrides = DiffSettings {
                ignore_case,
                ignore_whitespace,
                normalize_eol,
                apply_formatter: format,
            };
            run_show(&left, &right, &path, algorithm.as_deref(), overrides, no_color)
                .map(|()| false)
        }
        Commands::Info { archive } => run_info(&archive).map(|()| false),
        Commands::Settings { action } => run_settings(action).map(|()| false),
        Commands::Formats { extension } => run_formats(extension.as_deref()).map(|()| false),
        Commands::Link {
            page,
            left,
            right,
            ext,
            no_redirect,
            credentials,
        } => run_link(&page, left, right, ext, no_redirect, credentials.as_deref())
            .map(|()| false),
    };

    match result {
        Ok(false) => {}
        Ok(true) => std::process::exit(2),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

/// Where an archive comes from
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Local(PathBuf),
    Remote(Url),
}

impl Source {
    fn parse(value: &str) -> Self {
        match Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Source::Remote(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Source::Local(path),
                Err(()) => Source::Local(PathBuf::from(value)),
            },
            _ => Source::Local(PathBuf::from(value)),
        }
    }

    fn from_url(url: Url) -> Self {
        if url.scheme() == "file" {
            if let Ok(path) = url.to_file_path() {
                return Source::Local(path);
            }
        }
        Source::Remote(url)
    }

    fn describe(&self) -> String {
        match self {
            Source::Local(path) => path.display().to_string(),
            Source::Remote(url) => url.to_string(),
        }
    }
}

struct ArchiveSource {
    source: Source,
    options: DownloadOptions,
}

fn load_sources(left: &ArchiveSource, right: &ArchiveSource) -> anyhow::Result<(Archive, Archive)> {
    if let (Source::Local(l), Source::Local(r)) = (&left.source, &right.source) {
        return load_pair(l, r).context("Failed to load archives");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let progress = MultiProgress::new();

    runtime.block_on(async {
        let (l, r) = tokio::join!(
            load_source(left, &progress),
            load_source(right, &progress)
        );
        Ok::<_, anyhow::Error>((l?, r?))
    })
}

fn load_single(target: &ArchiveSource) -> anyhow::Result<Archive> {
    if let Source::Local(path) = &target.source {
        return load_archive_file(path)
            .with_context(|| format!("Failed to load {}", path.display()));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(load_source(target, &MultiProgress::new()))
}

async fn load_source(target: &ArchiveSource, progress: &MultiProgress) -> anyhow::Result<Archive> {
    match &target.source {
        Source::Local(path) => load_archive_file(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        Source::Remote(url) => {
            let bar = progress.add(ProgressBar::new_spinner());
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner} {msg} [{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec})",
                )?
                .progress_chars("=> "),
            );
            bar.set_message(url.to_string());

            let result = download_archive(
                url,
                &target.options,
                |p| {
                    if let Some(total) = p.total {
                        bar.set_length(total);
                    }
                    bar.set_position(p.downloaded);
                },
                None,
            )
            .await;
            bar.finish_and_clear();
            result.with_context(|| format!("Failed to load {}", url))
        }
    }
}

struct CompareArgs {
    left: Option<String>,
    right: Option<String>,
    link: Option<String>,
    json: bool,
    diff_only: bool,
    no_color: bool,
    unwrap_root: bool,
    case_insensitive: bool,
}

/// Returns whether the archives differ
fn run_compare(args: CompareArgs) -> anyhow::Result<bool> {
    let loaded = load_config(false)?;
    let config = loaded.config;

    let (left, right) = match &args.link {
        Some(link) => {
            let page = Url::parse(link).context("Invalid link")?;
            let side = |prefix: &str| -> anyhow::Result<ArchiveSource> {
                let source = read_source(&page, prefix)
                    .ok_or_else(|| anyhow!("Link has no {} archive", prefix))?;
                Ok(ArchiveSource {
                    source: Source::from_url(source.url),
                    options: source.options,
                })
            };
            (side("left")?, side("right")?)
        }
        None => {
            let side = |value: Option<&String>| -> anyhow::Result<ArchiveSource> {
                let value = value.ok_or_else(|| anyhow!("Two archives are required"))?;
                Ok(ArchiveSource {
                    source: Source::parse(value),
                    options: config.download.clone(),
                })
            };
            (side(args.left.as_ref())?, side(args.right.as_ref())?)
        }
    };

    info!("Comparing:");
    info!("  Left:  {}", left.source.describe());
    info!("  Right: {}", right.source.describe());

    let (left_archive, right_archive) = load_sources(&left, &right)?;

    let mut options = config.tree;
    options.unwrap_single_root |= args.unwrap_root;
    options.case_insensitive_pairing |= args.case_insensitive;
    let diff = TreeDiffer::new()
        .with_options(options)
        .diff(&left_archive, &right_archive);

    if args.json {
        let report = build_json_report(&diff, args.diff_only);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let use_color = !args.no_color && std::io::stdout().is_terminal();
        print!("{}", render_tree(&diff, args.diff_only, use_color));
        print!("{}", render_summary(&diff.summary(), use_color));
    }

    Ok(diff.is_different())
}

/// Outcome of one diff entry as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryStatus {
    Identical,
    WhitespaceOnly,
    Different,
    LeftOnly,
    RightOnly,
}

impl EntryStatus {
    fn of(entry: &DiffEntryRef<'_, '_>) -> Self {
        match (entry.has_left(), entry.has_right(), entry.difference_type()) {
            (true, false, _) => EntryStatus::LeftOnly,
            (false, true, _) => EntryStatus::RightOnly,
            (_, _, DifferenceType::None) => EntryStatus::Identical,
            (_, _, DifferenceType::WhitespacesOnly) => EntryStatus::WhitespaceOnly,
            (_, _, DifferenceType::Different) => EntryStatus::Different,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            EntryStatus::Identical => "==",
            EntryStatus::WhitespaceOnly => "~~",
            EntryStatus::Different => "!=",
            EntryStatus::LeftOnly => "<<",
            EntryStatus::RightOnly => ">>",
        }
    }

    fn color(self) -> &'static str {
        match self {
            EntryStatus::Identical => "\x1b[32m",      // Green
            EntryStatus::WhitespaceOnly => "\x1b[36m", // Cyan
            EntryStatus::Different => "\x1b[31m",      // Red
            EntryStatus::LeftOnly => "\x1b[33m",       // Yellow
            EntryStatus::RightOnly => "\x1b[34m",      // Blue
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Identical => "identical",
            EntryStatus::WhitespaceOnly => "whitespace-only",
            EntryStatus::Different => "different",
            EntryStatus::LeftOnly => "left-only",
            EntryStatus::RightOnly => "right-only",
        }
    }
}

const RESET: &str = "\x1b[0m";

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, RESET)
    } else {
        text.to_string()
    }
}

fn render_tree(diff: &DiffArchive<'_>, diff_only: bool, use_color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} <> {}\n",
        diff.left().original_filename(),
        diff.right().original_filename()
    ));

    // The root is described by the header line
    for entry in diff.iter().skip(1) {
        if diff_only && !entry.difference_type().is_different() {
            continue;
        }
        let status = EntryStatus::of(&entry);
        let indent = "  ".repeat(entry.depth().saturating_sub(1));
        let suffix = if entry.is_directory() { "/" } else { "" };

        out.push_str(&format!(
            "{} {}{}{}",
            paint(status.marker(), status.color(), use_color),
            indent,
            entry.name(),
            suffix
        ));
        if !entry.notes().is_empty() {
            out.push_str(&format!("  ({})", entry.notes()));
        }
        out.push('\n');
    }
    out
}

fn render_summary(summary: &DiffSummary, use_color: bool) -> String {
    let mark = |status: EntryStatus| {
        paint(&format!("({})", status.marker()), status.color(), use_color)
    };

    let mut out = format!("\n{}\n", "=".repeat(60));
    out.push_str("Summary:\n");
    out.push_str(&format!("  Total files:      {}\n", summary.total()));
    out.push_str(&format!(
        "  Identical:        {} {}\n",
        summary.identical,
        mark(EntryStatus::Identical)
    ));
    out.push_str(&format!(
        "  Whitespace only:  {} {}\n",
        summary.whitespace_only,
        mark(EntryStatus::WhitespaceOnly)
    ));
    out.push_str(&format!(
        "  Different:        {} {}\n",
        summary.different,
        mark(EntryStatus::Different)
    ));
    out.push_str(&format!(
        "  Left only:        {} {}\n",
        summary.left_only,
        mark(EntryStatus::LeftOnly)
    ));
    out.push_str(&format!(
        "  Right only:       {} {}\n",
        summary.right_only,
        mark(EntryStatus::RightOnly)
    ));
    out.push_str(&format!("{}\n", "=".repeat(60)));
    out
}

#[derive(Serialize)]
struct JsonReport {
    left: JsonArchive,
    right: JsonArchive,
    difference_type: &'static str,
    summary: DiffSummary,
    entries: Vec<JsonEntry>,
}

#[derive(Serialize)]
struct JsonArchive {
    filename: String,
    compressed_size: u64,
    total_files: usize,
    total_size: u64,
}

#[derive(Serialize)]
struct JsonEntry {
    path: String,
    kind: &'static str,
    status: &'static str,
    difference_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    left: Option<JsonFileSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right: Option<JsonFileSide>,
}

#[derive(Serialize)]
struct JsonFileSide {
    size: u64,
    blake3: String,
}

fn json_archive(archive: &Archive) -> JsonArchive {
    JsonArchive {
        filename: archive.original_filename().to_string(),
        compressed_size: archive.compressed_byte_length(),
        total_files: archive.total_files(),
        total_size: archive.total_size(),
    }
}

fn json_side(file: &zipdiffer_core::File) -> JsonFileSide {
    JsonFileSide {
        size: file.size(),
        blake3: file.content_hash().to_hex(),
    }
}

fn build_json_report(diff: &DiffArchive<'_>, diff_only: bool) -> JsonReport {
    let entries = diff
        .iter()
        .skip(1)
        .filter(|entry| !diff_only || entry.difference_type().is_different())
        .map(|entry| {
            let (left, right) = match entry {
                DiffEntryRef::File(file) => (file.left().map(json_side), file.right().map(json_side)),
                DiffEntryRef::Directory(_) => (None, None),
            };
            JsonEntry {
                path: entry.path().to_string(),
                kind: if entry.is_directory() { "directory" } else { "file" },
                status: EntryStatus::of(&entry).as_str(),
                difference_type: entry.difference_type().as_str(),
                notes: Some(entry.notes().to_string()).filter(|notes| !notes.is_empty()),
                left,
                right,
            }
        })
        .collect();

    JsonReport {
        left: json_archive(diff.left()),
        right: json_archive(diff.right()),
        difference_type: diff.difference_type().as_str(),
        summary: diff.summary(),
        entries,
    }
}

fn run_show(
    left: &str,
    right: &str,
    path: &str,
    algorithm: Option<&str>,
    overrides: DiffSettings,
    no_color: bool,
) -> anyhow::Result<()> {
    let config = load_config(false)?.config;

    let mut settings = config.settings;
    for key in SettingKey::ALL {
        if overrides.get(key) {
            settings.set(key, true);
        }
    }

    let source_of = |value: &str| ArchiveSource {
        source: Source::parse(value),
        options: config.download.clone(),
    };
    let (left_archive, right_archive) = load_sources(&source_of(left), &source_of(right))?;
    let diff = TreeDiffer::new()
        .with_options(config.tree)
        .diff(&left_archive, &right_archive);

    let file = diff
        .get_file_by_path(path, false)
        .ok_or_else(|| anyhow!("No file {} in either archive", path))?;
    let algorithm = algorithm
        .map(|name| name.parse::<DiffAlgorithm>())
        .transpose()?;

    let engine = TextDiffEngine::new(settings);
    let comparison = engine.compare_files(file, algorithm)?;
    info!("{} diff of {}", comparison.algorithm, file.path());

    if comparison.is_identical() {
        println!("No differences");
        return Ok(());
    }

    let use_color = !no_color && std::io::stdout().is_terminal();
    print!("{}", render_changes(comparison.algorithm, &comparison.changes, use_color));
    Ok(())
}

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";

fn render_changes(algorithm: DiffAlgorithm, changes: &[Change], use_color: bool) -> String {
    let mut out = String::new();
    match algorithm {
        DiffAlgorithm::Patch => {
            for change in changes {
                let color = if change.added {
                    Some(GREEN)
                } else if change.removed {
                    Some(RED)
                } else if change.value.starts_with("@@") {
                    Some(CYAN)
                } else {
                    None
                };
                let line = change.value.trim_end_matches('\n');
                match color {
                    Some(color) => out.push_str(&paint(line, color, use_color)),
                    None => out.push_str(line),
                }
                out.push('\n');
            }
        }
        DiffAlgorithm::Lines | DiffAlgorithm::Json => {
            for change in changes {
                let (prefix, color) = if change.added {
                    ("+", GREEN)
                } else if change.removed {
                    ("-", RED)
                } else {
                    (" ", "")
                };
                for line in change.value.split_inclusive('\n') {
                    let line = format!("{}{}", prefix, line.trim_end_matches('\n'));
                    if change.is_change() {
                        out.push_str(&paint(&line, color, use_color));
                    } else {
                        out.push_str(&line);
                    }
                    out.push('\n');
                }
            }
        }
        DiffAlgorithm::Words | DiffAlgorithm::Chars | DiffAlgorithm::Css => {
            for change in changes {
                if change.added {
                    if use_color {
                        out.push_str(&paint(&change.value, GREEN, true));
                    } else {
                        out.push_str(&format!("{{+{}+}}", change.value));
                    }
                } else if change.removed {
                    if use_color {
                        out.push_str(&paint(&change.value, RED, true));
                    } else {
                        out.push_str(&format!("[-{}-]", change.value));
                    }
                } else {
                    out.push_str(&change.value);
                }
            }
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    out
}

fn run_info(archive: &str) -> anyhow::Result<()> {
    let config = load_config(false)?.config;
    let archive = load_single(&ArchiveSource {
        source: Source::parse(archive),
        options: config.download,
    })?;
    print!("{}", render_info(&archive));
    Ok(())
}

fn render_info(archive: &Archive) -> String {
    let size = |bytes: u64| format_size(i64::try_from(bytes).unwrap_or(i64::MAX));
    format!(
        "Filename:         {}\n\
         Compressed size:  {}\n\
         Files:            {}\n\
         Directories:      {}\n\
         Total size:       {}\n",
        archive.original_filename(),
        size(archive.compressed_byte_length()),
        archive.total_files(),
        archive.total_subdirs(),
        size(archive.total_size()),
    )
}

fn run_settings(action: SettingsAction) -> anyhow::Result<()> {
    let loaded = load_config(false)?;
    let mut config = loaded.config;

    match action {
        SettingsAction::List => {
            for key in SettingKey::ALL {
                println!("{} = {}", key, config.settings.get(key));
            }
            return Ok(());
        }
        SettingsAction::Set { key, value } => {
            let key = SettingKey::parse(&key).ok_or_else(|| {
                let known: Vec<&str> = SettingKey::ALL.iter().map(|k| k.as_str()).collect();
                anyhow!("Unknown setting {} (expected one of {})", key, known.join(", "))
            })?;
            if parse_bool(&value).is_none() {
                warn!("{} is not a boolean, resetting {} to its default", value, key);
            }
            config.settings.set_from_str(key, &value);
            println!("{} = {}", key, config.settings.get(key));
        }
        SettingsAction::Reset => {
            config.settings = DiffSettings::default();
            println!("Settings restored to defaults");
        }
    }

    save_config(&loaded.path, &config)
        .with_context(|| format!("Failed to write {}", loaded.path.display()))?;
    info!("Saved configuration to {}", loaded.path.display());
    Ok(())
}

fn run_formats(extension: Option<&str>) -> anyhow::Result<()> {
    let registry = FormatRegistry::global();
    match extension {
        Some(extension) => {
            let text = describe_extension(registry, extension)
                .ok_or_else(|| anyhow!("Unknown extension: {}", extension))?;
            print!("{}", text);
        }
        None => {
            for (extension, aliases) in registry.extensions() {
                let formats: Vec<&str> = registry
                    .lookup(extension)
                    .map(ExtensionInfo::formats)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|format| match format {
                        FileFormat::Text => "text",
                        FileFormat::Image => "image",
                    })
                    .collect();
                let formats = if formats.is_empty() {
                    "-".to_string()
                } else {
                    formats.join(",")
                };
                if aliases.is_empty() {
                    println!("{:<10} {}", extension, formats);
                } else {
                    println!("{:<10} {:<11} aliases: {}", extension, formats, aliases.join(", "));
                }
            }
        }
    }
    Ok(())
}

fn describe_extension(registry: &FormatRegistry, extension: &str) -> Option<String> {
    let info = registry.lookup(extension)?;
    let canonical = registry.canonical(extension)?;
    let aliases = registry
        .extensions()
        .into_iter()
        .find(|(ext, _)| *ext == canonical)
        .map(|(_, aliases)| aliases.join(", "))
        .unwrap_or_default();

    let mut out = format!("Extension:    {}\n", canonical);
    if !aliases.is_empty() {
        out.push_str(&format!("Aliases:      {}\n", aliases));
    }
    if let Some(image) = &info.image {
        out.push_str(&format!("Image:        {}\n", image.mime_type));
    }
    if let Some(text) = &info.text {
        out.push_str(&format!("Highlighting: {}\n", text.highlight_language));
        if let Some(formatter) = text.formatter {
            out.push_str(&format!("Formatter:    {}\n", formatter));
        }
        let algorithms: Vec<&str> = text.diff_algorithms.iter().map(|a| a.id()).collect();
        out.push_str(&format!("Algorithms:   {}\n", algorithms.join(", ")));
    }
    if info.image.is_none() && info.text.is_none() {
        out.push_str("No viewer\n");
    }
    Some(out)
}

fn run_link(
    page: &str,
    left: Option<String>,
    right: Option<String>,
    ext: Option<String>,
    no_redirect: bool,
    credentials: Option<&str>,
) -> anyhow::Result<()> {
    let page = Url::parse(page).context("Invalid page URL")?;
    let credentials = match credentials {
        Some(value) => Credentials::parse(value)
            .ok_or_else(|| anyhow!("Unknown credentials mode: {}", value))?,
        None => Credentials::default(),
    };
    let options = DownloadOptions {
        file_extension: ext,
        redirect: if no_redirect {
            Redirect::Error
        } else {
            Redirect::Follow
        },
        credentials,
    };

    if left.is_none() && right.is_none() {
        bail!("Nothing to link: pass --left and/or --right");
    }

    let mut result = page.clone();
    for (prefix, value) in [("left", left), ("right", right)] {
        if let Some(value) = value {
            let url = page
                .join(&value)
                .with_context(|| format!("Invalid {} URL: {}", prefix, value))?;
            let source = SourceRef {
                url,
                options: options.clone(),
            };
            result = write_source(&result, prefix, Some(&source));
        }
    }

    println!("{}", result);
    Ok(())
}
