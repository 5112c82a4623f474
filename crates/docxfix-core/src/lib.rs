//! In-place cleanup of `.docx` documents, including documents nested in ZIP
//! archives.
//!
//! `docxfix-core` rewrites the main document part of Word packages: dividing
//! line pictures become a plain `---` run, and underlines inside hyperlinks
//! are removed. Directories are processed recursively, and ZIP archives are
//! unpacked, processed and packed again.
//!
//! # Examples
//!
//! ```no_run
//! use docxfix_core::NoopObserver;
//! use docxfix_core::ProcessConfig;
//! use docxfix_core::Processor;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let processor = Processor::new(ProcessConfig::default());
//! let report = processor.process(Path::new("/data/letters"), &mut NoopObserver)?;
//! println!("Converted {} documents", report.documents_converted());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod docx;
pub mod error;
pub mod paths;
pub mod report;
pub mod transform;

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use archive::ArchiveManager;
pub use config::ProcessConfig;
pub use dispatch::FileKind;
pub use dispatch::Processor;
pub use document::DocumentConverter;
pub use error::ConversionError;
pub use error::Result;
pub use error::Rollback;
pub use report::NoopObserver;
pub use report::ProcessObserver;
pub use report::ProcessReport;
pub use transform::transform;
