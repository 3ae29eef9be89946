//! Quietreel Storage Library
//!
//! Short-lived staging storage for inbound uploads and transcoder output.
//!
//! # File name format
//!
//! Every staged file lives directly in the staging directory and is named
//! `{namespace prefix}{unix millis}-{sequence}-{sanitized base name}`. Upload and
//! output files use distinct prefixes so the two namespaces never overlap.
//!
//! Names are reserved with an exclusive create, and every reservation is handed out
//! as a [`StagedFile`] guard that removes the file when released or dropped.

pub(crate) mod keys;
pub mod local;
pub mod staged;
pub mod traits;

pub use keys::Namespace;
pub use local::LocalStaging;
pub use staged::{release_path, StagedFile};
pub use traits::{StagingStore, StorageError, StorageResult};
