//! Scan source boundary.
//!
//! The on-disk scan format (ODIM HDF5 in production) is decoded by an
//! external collaborator behind the [`ScanDecoder`] trait. This crate owns
//! everything on this side of that boundary: typed attribute decoding,
//! scan assembly with invariant checks, and stores that group decoded scans
//! into volumes and answer elevation queries with tolerance matching.

pub mod attrs;
pub mod builder;
pub mod directory;
pub mod store;

pub use attrs::{AttrValue, Attributes};
pub use builder::build_scan;
pub use directory::{DirectoryStore, FlatBinaryDecoder, ScanDecoder};
pub use store::{volume_timestamp, MemoryStore, ScanStore};
