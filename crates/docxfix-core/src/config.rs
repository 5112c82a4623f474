//! Processing configuration.

/// How a file name is turned into the extension used for classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtensionRule {
    /// The text between the first `.` and the next `.` (or the end of the
    /// name). `a.tar.zip` classifies as `tar`.
    #[default]
    FirstDot,
    /// The text after the last `.`, as returned by `Path::extension`.
    /// `a.tar.zip` classifies as `zip`.
    LastDot,
}

/// Where an archive is unpacked and how its replacement is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionLayout {
    /// Unpack into the archive path with its first `.` removed, pack into
    /// that directory name plus the archive suffix, then remove the
    /// directory and the original archive.
    ///
    /// `/data/report.zip` is unpacked into `/data/reportzip` and repacked
    /// as `/data/reportzip.zip`.
    #[default]
    Legacy,
    /// Unpack into a hidden temporary directory next to the archive, pack
    /// into a temporary file next to it and rename that file over the
    /// original archive. The temporary directory is removed even when a
    /// step fails.
    Staged,
}

/// Configuration for [`Processor`](crate::Processor).
///
/// # Examples
///
/// ```
/// use docxfix_core::ProcessConfig;
/// use docxfix_core::config::{ExtensionRule, ExtractionLayout};
///
/// let config = ProcessConfig::default()
///     .with_extension_rule(ExtensionRule::LastDot)
///     .with_extraction_layout(ExtractionLayout::Staged)
///     .with_compression_level(9);
/// assert_eq!(config.compression_level, Some(9));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Extension of document files, without the dot.
    ///
    /// Default: `"docx"`.
    pub document_extension: String,

    /// Extension of archive files, without the dot. Also used as the suffix
    /// of packed archives.
    ///
    /// Default: `"zip"`.
    pub archive_extension: String,

    /// Classification rule.
    ///
    /// Default: [`ExtensionRule::FirstDot`].
    pub extension_rule: ExtensionRule,

    /// Archive round trip layout.
    ///
    /// Default: [`ExtractionLayout::Legacy`].
    pub extraction_layout: ExtractionLayout,

    /// Deflate level (1-9) for packed archives. `Some(0)` stores entries
    /// uncompressed.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,

    /// Apply the Unix permission bits recorded in archive entries when
    /// unpacking.
    ///
    /// Default: `true`.
    pub preserve_permissions: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            document_extension: "docx".to_string(),
            archive_extension: "zip".to_string(),
            extension_rule: ExtensionRule::default(),
            extraction_layout: ExtractionLayout::default(),
            compression_level: Some(6),
            preserve_permissions: true,
        }
    }
}

impl ProcessConfig {
    /// Creates a new `ProcessConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the classification rule.
    #[must_use]
    pub fn with_extension_rule(mut self, rule: ExtensionRule) -> Self {
        self.extension_rule = rule;
        self
    }

    /// Sets the archive round trip layout.
    #[must_use]
    pub fn with_extraction_layout(mut self, layout: ExtractionLayout) -> Self {
        self.extraction_layout = layout;
        self
    }

    /// Sets the compression level, clamped to 0-9.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level.min(9));
        self
    }

    /// Sets whether archive entry permissions are applied on unpack.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Sets the document extension.
    #[must_use]
    pub fn with_document_extension(mut self, extension: impl Into<String>) -> Self {
        self.document_extension = extension.into();
        self
    }

    /// Sets the archive extension.
    #[must_use]
    pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
        self.archive_extension = extension.into();
        self
    }
}
