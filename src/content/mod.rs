//! Content Provider
//!
//! Exposes the bundled content package (a zip archive) as if it were a plain
//! filesystem. Two identifier schemes are served:
//! - `file://...`    → the local filesystem, untouched
//! - `content://...` → entries of the package, extracted on demand
//!
//! Every failure is logged and reported as `None`/`false`; nothing here
//! escalates past the provider.
//!
//! Extracted entries are written to a staging file and renamed into place
//! under a name derived from the SHA-256 of their bytes, so a returned path
//! always holds a complete file and is never rewritten while the provider
//! lives. Dropping the provider deletes everything it wrote.

pub mod config;
pub mod params;
pub mod uri;

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use sha2::{Digest, Sha256};
use zip::result::ZipError;
use zip::ZipArchive;

pub use config::ContentConfig;
pub use uri::{ContentUri, Scheme};

/// Prefix of the extracted package copy inside the data directory
const PACKAGE_PREFIX: &str = "package";

/// Chunk size used when streaming entries to disk
const COPY_CHUNK: usize = 1024;

/// Counter for unique staging file names
static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Counter for provider instance tags
static PROVIDER_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Content error types
#[derive(Debug, Clone, PartialEq)]
pub enum ContentError {
    /// Identifier scheme is neither `file` nor `content`
    BadScheme(String),
    /// Identifier could not be parsed
    MalformedUri(String),
    /// Package could not be opened or read
    Archive(String),
    /// Package has no entry with this name
    EntryNotFound(String),
    /// I/O error
    Io(String),
    /// Config file could not be parsed
    Config(String),
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentError::BadScheme(scheme) => write!(f, "bad URI scheme: {}", scheme),
            ContentError::MalformedUri(uri) => write!(f, "malformed URI: {}", uri),
            ContentError::Archive(msg) => write!(f, "package error: {}", msg),
            ContentError::EntryNotFound(name) => write!(f, "unable to find entry: {}", name),
            ContentError::Io(msg) => write!(f, "I/O error: {}", msg),
            ContentError::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for ContentError {}

impl From<std::io::Error> for ContentError {
    fn from(e: std::io::Error) -> Self {
        ContentError::Io(e.to_string())
    }
}

impl From<ZipError> for ContentError {
    fn from(e: ZipError) -> Self {
        ContentError::Archive(e.to_string())
    }
}

/// Copy `input` into a freshly created file at `output_path`
///
/// Reads in fixed-size chunks until end of stream and writes through a
/// buffered writer, which is flushed before returning. Returns the number of
/// bytes written.
pub fn write_stream_to_file<R: Read + ?Sized>(
    input: &mut R,
    output_path: &Path,
) -> std::io::Result<u64> {
    let mut output = BufWriter::new(File::create(output_path)?);
    let mut buffer = [0u8; COPY_CHUNK];
    let mut total = 0u64;
    loop {
        let bytes_read = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        output.write_all(&buffer[..bytes_read])?;
        total += bytes_read as u64;
    }
    output.flush()?;
    Ok(total)
}

/// Reader adapter that hashes everything passing through it
struct HashingReader<'a, R: Read> {
    inner: &'a mut R,
    hasher: Sha256,
}

impl<R: Read> Read for HashingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Access to the content package and the local filesystem
#[derive(Debug)]
pub struct ContentProvider {
    /// Extracted copy of the bundled package
    package_path: PathBuf,
    /// Directory holding every temporary file this provider writes
    data_dir: PathBuf,
    /// Directory name all package entries live under
    archive_root: String,
    /// `<pid>-<n>`, unique per provider; every file it writes carries it
    tag: String,
    /// Extracted entry files owned by this provider
    extracted: Mutex<HashSet<PathBuf>>,
}

impl ContentProvider {
    /// Extract the bundled package named by `config` into the data directory
    ///
    /// Failures are logged and swallowed: the provider is still returned and
    /// later package operations report their own errors.
    pub fn initialize(config: &ContentConfig) -> Self {
        let data_dir = config.resolved_data_dir();
        match File::open(&config.package_path) {
            Ok(mut bundle) => {
                Self::initialize_from_reader(&mut bundle, data_dir, &config.archive_root)
            }
            Err(e) => {
                log::error!(
                    "content::initialize: failed opening content package {}: {}",
                    config.package_path.display(),
                    e
                );
                Self::empty(data_dir, &config.archive_root)
            }
        }
    }

    /// Extract a package from any reader into `data_dir`
    pub fn initialize_from_reader<R: Read + ?Sized>(
        bundle: &mut R,
        data_dir: impl Into<PathBuf>,
        archive_root: &str,
    ) -> Self {
        let provider = Self::empty(data_dir.into(), archive_root);
        let result = std::fs::create_dir_all(&provider.data_dir)
            .and_then(|_| write_stream_to_file(bundle, &provider.package_path));
        match result {
            Ok(bytes) => log::info!(
                "content::initialize: extracted {} byte package to {}",
                bytes,
                provider.package_path.display()
            ),
            Err(e) => log::error!("content::initialize: failed extracting content package: {}", e),
        }
        provider
    }

    fn empty(data_dir: PathBuf, archive_root: &str) -> Self {
        let tag = format!(
            "{}-{}",
            std::process::id(),
            PROVIDER_COUNTER.fetch_add(1, Ordering::SeqCst)
        );
        Self {
            package_path: data_dir.join(format!("{}-{}.tmp", PACKAGE_PREFIX, tag)),
            data_dir,
            archive_root: archive_root.to_string(),
            tag,
            extracted: Mutex::new(HashSet::new()),
        }
    }

    /// Path of the extracted package copy
    pub fn package_path(&self) -> &Path {
        &self.package_path
    }

    pub fn archive_root(&self) -> &str {
        &self.archive_root
    }

    /// Does the identifier name an existing file, directory or package entry?
    pub fn exists(&self, uri: &ContentUri) -> bool {
        match &uri.scheme {
            Scheme::File => Path::new(&uri.path).exists(),
            Scheme::Content => match self.list(uri) {
                Some(mut entries) => {
                    entries.sort();
                    entries.binary_search(&uri.path).is_ok()
                }
                None => false,
            },
            Scheme::Other(scheme) => {
                log::error!("content::exists: bad URI scheme: {}", scheme);
                false
            }
        }
    }

    /// List a directory, or every entry of the package
    ///
    /// For `content` identifiers the whole package is listed (in archive
    /// order) with the archive root stripped from each name.
    pub fn list(&self, uri: &ContentUri) -> Option<Vec<String>> {
        match &uri.scheme {
            Scheme::File => match std::fs::read_dir(&uri.path) {
                Ok(entries) => Some(
                    entries
                        .filter_map(|e| e.ok())
                        .map(|e| e.file_name().to_string_lossy().into_owned())
                        .collect(),
                ),
                Err(e) => {
                    log::debug!("content::list: {} is not a readable directory: {}", uri.path, e);
                    None
                }
            },
            Scheme::Content => match self.entry_names() {
                Ok(names) => Some(names),
                Err(e) => {
                    log::error!("content::list: unable to open package file: {}", e);
                    None
                }
            },
            Scheme::Other(scheme) => {
                log::error!("content::list: bad URI scheme: {}", scheme);
                None
            }
        }
    }

    /// Resolve an identifier to a readable local file
    ///
    /// `file` identifiers come back unchanged. `content` identifiers are
    /// extracted from the package first.
    pub fn temporary_file_path(&self, uri: &ContentUri) -> Option<PathBuf> {
        match self.resolve(uri) {
            Ok(path) => Some(path),
            Err(e) => {
                log::error!("content::temporary_file_path: {} ({})", e, uri);
                None
            }
        }
    }

    /// Resolve an identifier and read it as UTF-8 text
    pub fn read_to_string(&self, uri: &ContentUri) -> Option<String> {
        let path = self.temporary_file_path(uri)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) => {
                log::error!("content::read_to_string: {} ({})", e, path.display());
                None
            }
        }
    }

    fn resolve(&self, uri: &ContentUri) -> Result<PathBuf, ContentError> {
        match &uri.scheme {
            Scheme::File => Ok(PathBuf::from(&uri.path)),
            Scheme::Content => {
                let entry_name = format!("{}{}", self.archive_root, uri.path);
                let mut archive = self.open_archive()?;
                let mut entry = match archive.by_name(&entry_name) {
                    Ok(entry) => entry,
                    Err(ZipError::FileNotFound) => {
                        return Err(ContentError::EntryNotFound(entry_name))
                    }
                    Err(e) => return Err(e.into()),
                };
                self.extract(&mut entry)
            }
            Scheme::Other(scheme) => Err(ContentError::BadScheme(scheme.clone())),
        }
    }

    /// Stream an entry to a staging file, then rename it to its content-hashed path
    fn extract<R: Read>(&self, entry: &mut R) -> Result<PathBuf, ContentError> {
        let staging = self.data_dir.join(format!(
            "staging-{}-{}.tmp",
            std::process::id(),
            STAGING_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));

        let mut reader = HashingReader {
            inner: entry,
            hasher: Sha256::new(),
        };
        if let Err(e) = write_stream_to_file(&mut reader, &staging) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }

        let digest = reader.hasher.finalize();
        let path = self
            .data_dir
            .join(format!("entry-{}-{}.tmp", self.tag, hex(&digest)));
        if let Err(e) = std::fs::rename(&staging, &path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }

        self.extracted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.clone());
        Ok(path)
    }

    fn open_archive(&self) -> Result<ZipArchive<File>, ContentError> {
        let file = File::open(&self.package_path)?;
        Ok(ZipArchive::new(file)?)
    }

    fn entry_names(&self) -> Result<Vec<String>, ContentError> {
        let mut archive = self.open_archive()?;
        let mut names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            let name = entry.name();
            let name = name.strip_prefix(self.archive_root.as_str()).unwrap_or(name);
            names.push(name.to_string());
        }
        Ok(names)
    }

    /// Number of extracted entry files currently on disk
    pub fn extracted_count(&self) -> usize {
        self.extracted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Drop for ContentProvider {
    fn drop(&mut self) {
        let extracted = std::mem::take(
            self.extracted
                .get_mut()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for path in extracted.iter().chain(std::iter::once(&self.package_path)) {
            match std::fs::remove_file(path) {
                Ok(()) => log::trace!("content: removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("content: failed removing {}: {}", path.display(), e),
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Process-wide provider
// ─────────────────────────────────────────────────────────────────────────────

lazy_static::lazy_static! {
    static ref PROVIDER: Mutex<Option<ContentProvider>> = Mutex::new(None);
}

/// Install the process-wide provider, returning the one it replaces
pub fn install(provider: ContentProvider) -> Option<ContentProvider> {
    PROVIDER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .replace(provider)
}

/// Run `f` against the process-wide provider, if one is installed
pub fn with_provider<T>(f: impl FnOnce(&ContentProvider) -> T) -> Option<T> {
    let guard = PROVIDER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.as_ref().map(f)
}

/// Drop the process-wide provider, deleting its temporary files
pub fn shutdown() {
    let provider = PROVIDER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take();
    drop(provider);
}
