//! zippy — read-only ZIP archive reader for a virtual-filesystem back-end
//!
//! Opens an archive over any `Read + Seek` byte source, exposes its entries
//! through a case-insensitive directory tree, follows symlinks, and hands
//! back a streaming reader for file payloads (stored or deflated, plain,
//! traditionally encrypted, or WinZip-AES encrypted).
//!
//! # Examples
//! ```no_run
//! use zippy::Archive;
//!
//! let file = std::fs::File::open("archive.zip").unwrap();
//! let mut archive = Archive::open(Box::new(file), false).unwrap();
//! let stat = archive.stat("README.txt").unwrap();
//! let mut reader = archive.open_read("README.txt").unwrap();
//! let mut buf = vec![0u8; stat.size as usize];
//! let mut filled = 0;
//! while filled < buf.len() {
//!     let n = reader.read(&mut buf[filled..]).unwrap();
//!     if n == 0 {
//!         break;
//!     }
//!     filled += n;
//! }
//! ```
mod archive;
mod crypto;
mod entry;
mod error;
mod format;
mod io;
mod reader;
mod resolver;
mod tree;

pub use archive::{Archive, Stat, DEFAULT_PASSWORD};
pub use entry::FileType;
pub use error::{Error, Result};
pub use io::ByteSource;
pub use reader::OpenFile;
