//! Source documents, span tracking, and line/column resolution.
//!
//! The [`SourceDb`] owns the text of every document handed to an analysis
//! session. Syntax nodes and diagnostics refer back into it through
//! [`FileId`] + [`Span`], and [`ResolvedSpan`] turns those byte offsets into
//! the `path:line:col` form shown to users and attached to rule failures.

#![warn(missing_docs)]

pub mod file_id;
pub mod resolved_span;
pub mod source_db;
pub mod source_file;
pub mod span;

pub use file_id::FileId;
pub use resolved_span::ResolvedSpan;
pub use source_db::SourceDb;
pub use source_file::SourceFile;
pub use span::Span;
