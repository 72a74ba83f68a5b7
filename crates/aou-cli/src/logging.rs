//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr, to a single `--log-file`, or to a `--log-dir` holding
//! one rotating file per crate (`aou_ingest.log`, `aou_transform.log`, ...).
//!
//! # Log Levels
//!
//! - `error`: fatal errors
//! - `warn`: non-fatal issues
//! - `info`: stage progress and summary counts
//! - `debug`: per-page and per-output details
//! - `trace`: participant-level detail (identifiers need `--log-data`)

use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{Metadata, warn};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when participant-level logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Size at which a per-crate log file is rotated.
pub const DEFAULT_MAX_LOG_BYTES: u64 = 32 * 1024 * 1024;

/// Rotated files kept per crate (`name.log.1` .. `name.log.16`).
pub const DEFAULT_LOG_BACKUPS: usize = 16;

/// Tag for events whose target names no crate.
pub const DEFAULT_LOG_TAG: &str = "aou_refresh";

/// Returns true if participant identifiers may be logged.
pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Relaxed)
}

/// Returns the input value when `--log-data` is set, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace the default filter.
    pub use_env_filter: bool,
    pub with_timestamps: bool,
    pub with_target: bool,
    pub with_spans: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Single log file; ignored when `log_dir` is set.
    pub log_file: Option<PathBuf>,
    /// Directory for rotating per-crate log files.
    pub log_dir: Option<PathBuf>,
    pub log_data: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::INFO,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_spans: true,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
            log_dir: None,
            log_data: false,
        }
    }
}

/// Initialize the global tracing subscriber with the given configuration.
///
/// # Errors
///
/// Returns an error if the log file or directory cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if let Some(dir) = &config.log_dir {
        init_logging_with_writer(config, LogRegistry::new(dir)?);
    } else if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        init_logging_with_writer(config, SharedFileWriter::new(file));
    } else {
        init_logging_with_writer(config, io::stderr);
    }
    Ok(())
}

/// Initialize logging with a custom writer.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Release);
    let filter = build_env_filter(config.level_filter, config.use_env_filter);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(config.with_target)
                .with_span_events(if config.with_spans {
                    fmt::format::FmtSpan::CLOSE
                } else {
                    fmt::format::FmtSpan::NONE
                });

            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);

            if config.with_timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .init();
            }
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);

            if config.with_timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .init();
            }
        }
    }
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<File>>,
}

impl SharedFileWriter {
    fn new(file: File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

/// A log file that rolls over to numbered backups once it reaches a size.
pub struct RotatingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    backups: usize,
}

impl RotatingFile {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            written,
            max_bytes,
            backups,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backups == 0 {
            self.file = File::create(&self.path)?;
            self.written = 0;
            return Ok(());
        }
        for index in (1..self.backups).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

type SharedRotatingFile = Arc<Mutex<RotatingFile>>;

struct RegistryInner {
    dir: PathBuf,
    max_bytes: u64,
    backups: usize,
    files: Mutex<HashMap<String, SharedRotatingFile>>,
    unopened: Mutex<HashSet<String>>,
}

/// Per-tag rotating log files under one directory.
///
/// Each tag gets `<dir>/<tag>.log`, opened on first use and shared after.
/// As a [`MakeWriter`] the tag is the crate an event comes from.
#[derive(Clone)]
pub struct LogRegistry {
    inner: Arc<RegistryInner>,
}

impl LogRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        Self::with_limits(dir, DEFAULT_MAX_LOG_BYTES, DEFAULT_LOG_BACKUPS)
    }

    pub fn with_limits(dir: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            inner: Arc::new(RegistryInner {
                dir,
                max_bytes,
                backups,
                files: Mutex::new(HashMap::new()),
                unopened: Mutex::new(HashSet::new()),
            }),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn path_for(&self, tag: &str) -> PathBuf {
        self.inner.dir.join(format!("{tag}.log"))
    }

    /// The shared file for `tag`, opening it on first use.
    pub fn file_for(&self, tag: &str) -> io::Result<SharedRotatingFile> {
        let mut files = self
            .inner
            .files
            .lock()
            .map_err(|_| io::Error::other("log registry lock poisoned"))?;
        if let Some(file) = files.get(tag) {
            return Ok(Arc::clone(file));
        }
        let file = RotatingFile::open(self.path_for(tag), self.inner.max_bytes, self.inner.backups)?;
        let file = Arc::new(Mutex::new(file));
        files.insert(tag.to_string(), Arc::clone(&file));
        Ok(file)
    }

    /// Writer for `tag`, falling back to stderr when its file cannot be
    /// opened. The first failure per tag is logged.
    pub fn writer(&self, tag: &str) -> TaggedWriter {
        match self.file_for(tag) {
            Ok(file) => TaggedWriter { file: Some(file) },
            Err(err) => {
                if self.first_open_failure(tag) {
                    warn!(
                        path = %self.path_for(tag).display(),
                        error = %err,
                        "failed to open log file; logging to stderr"
                    );
                }
                TaggedWriter { file: None }
            }
        }
    }

    /// True only the first time `tag` fails to open, which also stops the
    /// warning above from recursing through this writer.
    fn first_open_failure(&self, tag: &str) -> bool {
        self.inner
            .unopened
            .lock()
            .map(|mut unopened| unopened.insert(tag.to_string()))
            .unwrap_or(false)
    }
}

/// Crate part of an event target: `aou_ingest::paging` is `aou_ingest`.
pub fn log_tag(target: &str) -> &str {
    match target.split("::").next() {
        Some(tag) if !tag.is_empty() => tag,
        _ => DEFAULT_LOG_TAG,
    }
}

/// Writer for one tag; falls back to stderr if its file could not be opened.
pub struct TaggedWriter {
    file: Option<SharedRotatingFile>,
}

impl Write for TaggedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.file {
            Some(file) => file
                .lock()
                .map_err(|_| io::Error::other("log file lock poisoned"))?
                .write(buf),
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.file {
            Some(file) => file
                .lock()
                .map_err(|_| io::Error::other("log file lock poisoned"))?
                .flush(),
            None => io::stderr().flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogRegistry {
    type Writer = TaggedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(DEFAULT_LOG_TAG)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.writer(log_tag(meta.target()))
    }
}

/// Build an `EnvFilter` for our crates at `level`, optionally from `RUST_LOG`.
fn build_env_filter(level: LevelFilter, use_env: bool) -> EnvFilter {
    let default_filter = || {
        // External crates (reqwest, hyper) stay at warn.
        EnvFilter::new(format!(
            "warn,aou_refresh={level},aou_cli={level},aou_ingest={level},\
             aou_load={level},aou_model={level},aou_transform={level}"
        ))
    };
    if use_env {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter())
    } else {
        default_filter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_redacted_by_default() {
        assert_eq!(redact_value("P123456789"), REDACTED_VALUE);
    }

    #[test]
    fn tags_come_from_crate_names() {
        assert_eq!(log_tag("aou_ingest::paging"), "aou_ingest");
        assert_eq!(log_tag("aou_refresh"), "aou_refresh");
        assert_eq!(log_tag(""), DEFAULT_LOG_TAG);
    }

    #[test]
    fn rotates_into_numbered_backups() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LogRegistry::with_limits(dir.path(), 64, 2).unwrap();

        let mut writer = registry.writer("aou_load");
        for line in 0..10 {
            let text = format!("log line number {line:02} with some padding\n");
            writer.write_all(text.as_bytes()).unwrap();
        }
        writer.flush().unwrap();

        let path = registry.path_for("aou_load");
        let backup = |index: usize| PathBuf::from(format!("{}.{index}", path.display()));
        assert!(path.exists());
        assert!(backup(1).exists());
        assert!(backup(2).exists());
        assert!(!backup(3).exists());

        let current = fs::read_to_string(&path).unwrap();
        assert!(current.contains("line number 09"));
        assert!(current.len() <= 64);
    }

    #[test]
    fn registry_shares_files_per_tag() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LogRegistry::new(dir.path()).unwrap();

        let first = registry.file_for("aou_ingest").unwrap();
        let second = registry.file_for("aou_ingest").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let mut writer = registry.make_writer();
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();
        let text = fs::read_to_string(dir.path().join("aou_refresh.log")).unwrap();
        assert_eq!(text, "hello\n");
    }

    #[test]
    fn unopenable_log_falls_back_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LogRegistry::new(dir.path()).unwrap();
        fs::create_dir(registry.path_for("aou_load")).unwrap();

        let mut writer = registry.writer("aou_load");
        assert!(writer.file.is_none());
        writer.write_all(b"still logged\n").unwrap();
        writer.flush().unwrap();

        assert!(registry.writer("aou_load").file.is_none());
        assert!(!registry.first_open_failure("aou_load"));
        assert!(registry.first_open_failure("aou_transform"));
    }
}
