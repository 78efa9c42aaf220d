//! ZIP archive reading.
//!
//! Wheels and `.zip` source distributions are plain ZIP containers. This
//! module lists their members and reads individual members into memory,
//! which is all dependency extraction needs.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures from raw bytes
//! - [`reader`]: Member lookup and decompression
//!
//! The EOCD record is read first (from the end of the file), then the
//! Central Directory. Member order is the Central Directory order, which is
//! the order used for every first-match lookup.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED and DEFLATE compression methods
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support

mod error;
mod parser;
mod reader;
mod structures;

pub use error::ZipError;
pub use reader::ZipReader;
pub use structures::*;
