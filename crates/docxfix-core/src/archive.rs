//! ZIP unpacking and packing.
//!
//! Unpacking checks every entry against the extraction directory before
//! anything is written for it. Packing walks a directory in sorted order and
//! stores regular files only.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;
use tracing::warn;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::ConversionError;
use crate::ProcessConfig;
use crate::Result;
use crate::error::zip_to_io;
use crate::paths::packed_archive_path;
use crate::paths::resolve_within;
use crate::paths::zip_entry_name;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Statistics for one unpacked archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackReport {
    /// Number of file entries written.
    pub files: usize,
    /// Number of directory entries created.
    pub directories: usize,
    /// Total uncompressed bytes written.
    pub bytes: u64,
}

/// Statistics for one packed archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackReport {
    /// Number of file entries added.
    pub files: usize,
    /// Total uncompressed bytes added.
    pub bytes: u64,
    /// Number of symlinks left out of the archive.
    pub symlinks_skipped: usize,
}

/// Unpacks ZIP archives into directories and packs directories back into
/// ZIP archives.
///
/// # Examples
///
/// ```no_run
/// use docxfix_core::ArchiveManager;
/// use docxfix_core::ProcessConfig;
/// use std::path::Path;
///
/// let manager = ArchiveManager::new(&ProcessConfig::default());
/// manager.unpack(Path::new("bundle.zip"), Path::new("bundle"))?;
/// let packed = manager.pack(Path::new("bundle"))?;
/// assert_eq!(packed, Path::new("bundle.zip"));
/// # Ok::<(), docxfix_core::ConversionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveManager {
    archive_extension: String,
    compression_level: Option<u8>,
    preserve_permissions: bool,
}

impl Default for ArchiveManager {
    fn default() -> Self {
        Self::new(&ProcessConfig::default())
    }
}

impl ArchiveManager {
    /// Creates a manager using the archive settings of `config`.
    #[must_use]
    pub fn new(config: &ProcessConfig) -> Self {
        Self {
            archive_extension: config.archive_extension.clone(),
            compression_level: config.compression_level,
            preserve_permissions: config.preserve_permissions,
        }
    }

    /// Extracts every entry of `archive` into `dest`.
    ///
    /// `dest` is created if it does not exist. Entries already written stay
    /// on disk when a later entry fails.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::PathTraversal`] if an entry resolves outside
    ///   `dest` (or to `dest` itself). Nothing is written for that entry and
    ///   the remaining entries are not extracted.
    /// - [`ConversionError::Unpack`] if the archive cannot be read or an
    ///   entry cannot be written.
    pub fn unpack(&self, archive: &Path, dest: &Path) -> Result<UnpackReport> {
        let unpack_error = |source: io::Error| ConversionError::Unpack {
            archive: archive.to_path_buf(),
            source,
        };

        let file = File::open(archive).map_err(unpack_error)?;
        let mut zip = ZipArchive::new(BufReader::new(file))
            .map_err(|e| unpack_error(zip_to_io(e)))?;
        fs::create_dir_all(dest).map_err(unpack_error)?;

        let mut report = UnpackReport::default();
        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).map_err(|e| unpack_error(zip_to_io(e)))?;
            let name = entry.name().to_string();

            let Some(target) = resolve_within(dest, &name) else {
                return Err(ConversionError::PathTraversal {
                    entry: PathBuf::from(name),
                    dest: dest.to_path_buf(),
                });
            };

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(unpack_error)?;
                report.directories += 1;
                debug!(entry = %name, "created directory");
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(unpack_error)?;
            }
            let bytes = write_entry(&mut entry, &target, &mut buffer).map_err(unpack_error)?;

            #[cfg(unix)]
            if self.preserve_permissions
                && let Some(mode) = entry.unix_mode()
                && mode & 0o777 != 0
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))
                    .map_err(unpack_error)?;
            }

            report.files += 1;
            report.bytes += bytes;
            debug!(entry = %name, bytes, "extracted file");
        }

        Ok(report)
    }

    /// Packs `source_dir` into a sibling archive named after the directory
    /// plus the archive extension, and returns that path.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Pack`] if the directory cannot be walked or
    /// the archive cannot be written. A partial archive may remain on disk.
    pub fn pack(&self, source_dir: &Path) -> Result<PathBuf> {
        let output = packed_archive_path(source_dir, &self.archive_extension);
        self.pack_to(source_dir, &output)?;
        Ok(output)
    }

    /// Packs `source_dir` into the archive at `output`, replacing any file
    /// already there.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Pack`] if the directory cannot be walked or
    /// the archive cannot be written.
    pub fn pack_to(&self, source_dir: &Path, output: &Path) -> Result<PackReport> {
        let pack_error = |source: io::Error| ConversionError::Pack {
            dir: source_dir.to_path_buf(),
            source,
        };

        let file = File::create(output).map_err(pack_error)?;
        let mut writer = BufWriter::new(file);
        let report = self.pack_into(source_dir, &mut writer)?;
        let file = writer
            .into_inner()
            .map_err(|e| pack_error(e.into_error()))?;
        file.sync_all().map_err(pack_error)?;

        info!(
            dir = %source_dir.display(),
            archive = %output.display(),
            files = report.files,
            "packed archive"
        );
        Ok(report)
    }

    /// Packs `source_dir` into any seekable sink.
    ///
    /// Entries are named by their `/`-separated path relative to
    /// `source_dir` and added in lexical order. Directories get no entries of
    /// their own; symlinks are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Pack`] if the directory cannot be walked or
    /// writing to `writer` fails.
    pub fn pack_into<W: Write + Seek>(&self, source_dir: &Path, writer: W) -> Result<PackReport> {
        self.write_archive(source_dir, writer)
            .map_err(|source| ConversionError::Pack {
                dir: source_dir.to_path_buf(),
                source,
            })
    }

    fn file_options(&self) -> SimpleFileOptions {
        match self.compression_level {
            Some(0) => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
            level => SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(level.unwrap_or(6)))),
        }
    }

    fn write_archive<W: Write + Seek>(&self, source_dir: &Path, writer: W) -> io::Result<PackReport> {
        let mut zip = ZipWriter::new(writer);
        let options = self.file_options();
        let mut report = PackReport::default();
        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];

        let walker = WalkDir::new(source_dir)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            let file_type = entry.file_type();

            if file_type.is_symlink() {
                warn!(path = %entry.path().display(), "skipping symlink");
                report.symlinks_skipped += 1;
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(source_dir)
                .map_err(io::Error::other)?;
            let name = zip_entry_name(relative).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("path is not valid UTF-8: {}", relative.display()),
                )
            })?;

            let mut file = File::open(entry.path())?;
            let file_options = if self.preserve_permissions {
                entry_options(options, &file.metadata()?)
            } else {
                options
            };

            zip.start_file(name.as_str(), file_options)
                .map_err(zip_to_io)?;
            let bytes = copy_with_buffer(&mut file, &mut zip, &mut buffer)?;

            report.files += 1;
            report.bytes += bytes;
            debug!(entry = %name, bytes, "added file");
        }

        zip.finish().map_err(zip_to_io)?;
        Ok(report)
    }
}

#[cfg(unix)]
fn entry_options(options: SimpleFileOptions, metadata: &fs::Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    options.unix_permissions(metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn entry_options(options: SimpleFileOptions, _metadata: &fs::Metadata) -> SimpleFileOptions {
    options
}

fn write_entry<R: Read>(reader: &mut R, target: &Path, buffer: &mut [u8]) -> io::Result<u64> {
    let mut writer = BufWriter::new(File::create(target)?);
    let bytes = copy_with_buffer(reader, &mut writer, buffer)?;
    writer.flush()?;
    Ok(bytes)
}

fn copy_with_buffer<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut [u8],
) -> io::Result<u64> {
    let mut total = 0u64;
    loop {
        let read = reader.read(buffer)?;
        if read == 0 {
            return Ok(total);
        }
        writer.write_all(&buffer[..read])?;
        total += read as u64;
    }
}
