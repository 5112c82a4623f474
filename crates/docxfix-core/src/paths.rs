//! Lexical path helpers.
//!
//! Nothing in this module touches the filesystem. Containment checks work on
//! cleaned paths only, so symlinks already present inside an extraction
//! directory are not resolved.

use std::ffi::OsString;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::config::ExtensionRule;

/// Lexically normalizes a path.
///
/// Removes `.` components and resolves `..` against the preceding
/// component. A `..` at the root (or at the start of a relative path that
/// has nothing left to pop) is dropped.
///
/// # Examples
///
/// ```
/// use docxfix_core::paths::clean;
/// use std::path::Path;
///
/// assert_eq!(clean(Path::new("/a/./b/../c")), Path::new("/a/c"));
/// assert_eq!(clean(Path::new("/a/../../etc")), Path::new("/etc"));
/// ```
#[must_use]
pub fn clean(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
        }
    }

    normalized
}

/// Joins an archive entry name onto `dest` and checks that the result stays
/// strictly inside `dest`.
///
/// Returns the cleaned destination path, or `None` if the entry escapes
/// `dest` or resolves to `dest` itself.
///
/// # Examples
///
/// ```
/// use docxfix_core::paths::resolve_within;
/// use std::path::Path;
///
/// let dest = Path::new("/tmp/out");
/// assert_eq!(
///     resolve_within(dest, "docs/a.txt"),
///     Some(Path::new("/tmp/out/docs/a.txt").to_path_buf())
/// );
/// assert_eq!(resolve_within(dest, "../a.txt"), None);
/// assert_eq!(resolve_within(dest, "docs/../../a.txt"), None);
/// ```
#[must_use]
pub fn resolve_within(dest: &Path, entry_name: &str) -> Option<PathBuf> {
    let root = clean(dest);
    let resolved = clean(&root.join(entry_name));

    if resolved != root && resolved.starts_with(&root) {
        Some(resolved)
    } else {
        None
    }
}

/// Returns the extension used to classify a file name.
///
/// An empty string means the name has no extension under `rule`.
///
/// # Examples
///
/// ```
/// use docxfix_core::config::ExtensionRule;
/// use docxfix_core::paths::classification_extension;
///
/// assert_eq!(classification_extension("a.tar.zip", ExtensionRule::FirstDot), "tar");
/// assert_eq!(classification_extension("a.tar.zip", ExtensionRule::LastDot), "zip");
/// assert_eq!(classification_extension("README", ExtensionRule::FirstDot), "");
/// ```
#[must_use]
pub fn classification_extension(file_name: &str, rule: ExtensionRule) -> &str {
    match rule {
        ExtensionRule::FirstDot => file_name.split('.').nth(1).unwrap_or_default(),
        ExtensionRule::LastDot => Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default(),
    }
}

/// Extraction directory for the legacy layout: the archive path with its
/// first `.` removed.
///
/// The dot may sit in a parent directory name rather than in the file name,
/// in which case the directory lands somewhere unexpected. Non-UTF-8 paths
/// are converted lossily.
///
/// # Examples
///
/// ```
/// use docxfix_core::paths::legacy_extraction_dir;
/// use std::path::Path;
///
/// assert_eq!(
///     legacy_extraction_dir(Path::new("/data/report.zip")),
///     Path::new("/data/reportzip")
/// );
/// assert_eq!(
///     legacy_extraction_dir(Path::new("/data/v1.2/report.zip")),
///     Path::new("/data/v12/report.zip")
/// );
/// ```
#[must_use]
pub fn legacy_extraction_dir(archive: &Path) -> PathBuf {
    PathBuf::from(archive.to_string_lossy().replacen('.', "", 1))
}

/// Path of the archive packed from `dir`: the directory path plus
/// `.{extension}`.
#[must_use]
pub fn packed_archive_path(dir: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(dir.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Converts a relative path into a ZIP entry name.
///
/// ZIP entry names use `/` as the separator on every platform. Returns
/// `None` for non-UTF-8 paths.
#[must_use]
pub fn zip_entry_name(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}
