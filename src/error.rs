//! Error kinds surfaced by the archive reader.
use std::fmt;

/// All failure modes the reader can report.
///
/// Each public operation sets exactly one of these on failure; there is no
/// combined/aggregate error. See the variant docs for the precise trigger.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Any write/append/remove/mkdir, or `open` with `for_writing`.
    #[error("archive is read-only")]
    ReadOnly,

    /// Lookup miss.
    #[error("not found: {0}")]
    NotFound(String),

    /// Seek beyond `uncompressed_size`.
    #[error("seek past end of file")]
    PastEof,

    /// Signature mismatch, inconsistent extra-field sizes, a duplicate
    /// non-placeholder entry, a non-zero disk number, an impossible field
    /// combination, and so on. Carries a short human-readable reason.
    #[error("corrupt archive: {0}")]
    Corrupt(String),

    /// The EOCD record could not be found within the scan budget, or the
    /// entry demands a compression method or extra field variant this
    /// reader does not implement.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Traditional verifier mismatch, AES verifier mismatch, a password
    /// supplied for a non-encrypted entry, or a missing password for an
    /// encrypted one.
    #[error("bad password")]
    BadPassword,

    /// Re-entry into an entry already in the `resolving` state.
    #[error("symlink loop")]
    SymlinkLoop,

    /// The byte source's `read`/`seek` failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An allocation failed. The byte source's own OOM reporting, if any,
    /// surfaces as [`Error::Io`] instead; this variant is for allocations
    /// made directly by this crate (entry table, buffers).
    #[error("out of memory")]
    OutOfMemory,
}

impl Error {
    pub fn corrupt(reason: impl fmt::Display) -> Self {
        Error::Corrupt(reason.to_string())
    }

    pub fn unsupported(reason: impl fmt::Display) -> Self {
        Error::Unsupported(reason.to_string())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound(path.into())
    }
}

/// Composes with `Read`/`Seek` signatures at the `Reader`/`ByteSource`
/// boundary, the same way the rest of the Rust ZIP-reading ecosystem maps a
/// crate-local error back onto `std::io::Error` for trait objects that must
/// stay `std::io`-shaped.
impl From<Error> for std::io::Error {
    fn from(e: Error) -> std::io::Error {
        match e {
            Error::Io(e) => e,
            Error::PastEof => std::io::Error::new(std::io::ErrorKind::UnexpectedEof, e),
            Error::NotFound(_) => std::io::Error::new(std::io::ErrorKind::NotFound, e),
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
