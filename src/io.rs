//! Byte-source adapter (C1): little-endian primitive reads and the
//! `ByteSource` capability the archive façade is built on.
use std::io::{Read, Seek, SeekFrom};

use crate::error::{Error, Result};

/// The random-access, finite, read-only transport an [`crate::Archive`] is
/// opened over. Offsets are absolute byte positions from the start of the
/// underlying stream; `length` is the total size in bytes.
///
/// A blanket impl covers any `Read + Seek`, so `std::fs::File` and
/// `std::io::Cursor<Vec<u8>>` both satisfy this out of the box; `duplicate`
/// falls back to re-seeking a fresh clone for types that are `Clone`.
pub trait ByteSource: Read + Seek {
    /// Produce an independently-seekable handle onto the same bytes,
    /// positioned at the start. Used by `Archive::close`'s duplicate
    /// byte-source handles and by `OpenFile::duplicate`.
    fn duplicate(&self) -> Result<Box<dyn ByteSource>>;

    /// Total size in bytes, or `None` if unknown.
    fn length(&self) -> Result<u64>;
}

impl ByteSource for std::io::Cursor<Vec<u8>> {
    fn duplicate(&self) -> Result<Box<dyn ByteSource>> {
        Ok(Box::new(std::io::Cursor::new(self.get_ref().clone())))
    }

    fn length(&self) -> Result<u64> {
        Ok(self.get_ref().len() as u64)
    }
}

impl ByteSource for std::fs::File {
    fn duplicate(&self) -> Result<Box<dyn ByteSource>> {
        Ok(Box::new(self.try_clone()?))
    }

    fn length(&self) -> Result<u64> {
        Ok(self.metadata()?.len())
    }
}

pub(crate) fn read_u8<R: Read + ?Sized>(r: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_u16_le<R: Read + ?Sized>(r: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_u32_le<R: Read + ?Sized>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_u64_le<R: Read + ?Sized>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Reads exactly `n` bytes, failing with [`Error::Io`] on a short read.
pub(crate) fn read_all<R: Read + ?Sized>(r: &mut R, n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub(crate) fn seek_to<R: Seek + ?Sized>(r: &mut R, pos: u64) -> Result<()> {
    r.seek(SeekFrom::Start(pos))?;
    Ok(())
}

pub(crate) fn tell<R: Seek + ?Sized>(r: &mut R) -> Result<u64> {
    Ok(r.stream_position().map_err(Error::Io)?)
}
