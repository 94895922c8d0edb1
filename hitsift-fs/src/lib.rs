//! Filesystem abstraction for hitsift.
//!
//! The CLI reads hit logs and rule files and writes suggestion documents
//! through the [`Filesystem`] trait so loaders and writers can be tested
//! against [`MockFilesystem`].

mod filesystem;

pub use filesystem::{Filesystem, FsError, MockFilesystem, RealFilesystem};
