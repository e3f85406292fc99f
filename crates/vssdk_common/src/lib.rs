//! Shared foundational types used across the VSSDK analyzer workspace.
//!
//! This crate provides interned identifiers for symbol names, content hashing
//! for source files, cooperative cancellation, and the internal error type
//! used by every analysis and rewrite stage.

#![warn(missing_docs)]

pub mod cancel;
pub mod hash;
pub mod ident;
pub mod result;

pub use cancel::{CancellationToken, Cancelled};
pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use result::{InternalError, VssdkResult};
