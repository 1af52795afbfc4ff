//! Central-directory parser (C4): one record per archive entry.
use std::io::Read;

use tracing::warn;

use super::extra_field::ExtraFields;
use super::{CENTRAL_HEADER_SIGNATURE, ZIP64_EXTRA_ID};
use crate::error::{Error, Result};
use crate::io::{read_u16_le, read_u32_le, read_u64_le};

/// Host types (upper byte of `version_made_by`) that are *not* Unix. Anything
/// else is treated as a Unix-family creator for symlink-mode detection.
const NON_UNIX_HOSTS: [u8; 10] = [0, 1, 2, 4, 6, 11, 13, 14, 15, 18];

const UNIX_MODE_MASK: u32 = 0o170000;
const UNIX_MODE_SYMLINK: u32 = 0o120000;

#[derive(Debug, Clone)]
pub struct CentralDirectoryRecord {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub general_purpose_bits: u16,
    pub compression_method: u16,
    pub dos_mod_time: (u16, u16),
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub file_name: Vec<u8>,
    pub comment: Vec<u8>,
    pub extras: ExtraFields,
    pub disk_number: u32,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    pub local_header_offset: u64,
}

/// What the central-directory record alone says an entry is, before local
/// header parsing / symlink following run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawKind {
    Directory,
    Symlink,
    File,
}

impl CentralDirectoryRecord {
    pub(crate) fn parse<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut signature = [0u8; 4];
        r.read_exact(&mut signature)?;
        if signature != CENTRAL_HEADER_SIGNATURE {
            return Err(Error::corrupt("invalid central directory record signature"));
        }
        let version_made_by = read_u16_le(r)?;
        let version_needed = read_u16_le(r)?;
        let general_purpose_bits = read_u16_le(r)?;
        let compression_method = read_u16_le(r)?;
        let dos_time = read_u16_le(r)?;
        let dos_date = read_u16_le(r)?;
        let crc32 = read_u32_le(r)?;
        let mut compressed_size: u64 = read_u32_le(r)?.into();
        let mut uncompressed_size: u64 = read_u32_le(r)?.into();
        let fname_len = read_u16_le(r)?;
        let extra_len = read_u16_le(r)?;
        let comment_len = read_u16_le(r)?;
        let mut disk_number: u32 = read_u16_le(r)?.into();
        let internal_attributes = read_u16_le(r)?;
        let external_attributes = read_u32_le(r)?;
        let mut local_header_offset: u64 = read_u32_le(r)?.into();

        let mut file_name = vec![0u8; fname_len.into()];
        r.read_exact(&mut file_name)?;
        let extras = ExtraFields::new(r, extra_len.into())?;
        let mut comment = vec![0u8; comment_len.into()];
        r.read_exact(&mut comment)?;

        if let Some(mut z64) = extras.field_data(ZIP64_EXTRA_ID) {
            for val in [&mut uncompressed_size, &mut compressed_size, &mut local_header_offset] {
                if *val == 0xffff_ffff {
                    match read_u64_le(&mut z64) {
                        Ok(v) => *val = v,
                        Err(_) => {
                            warn!("Zip64 extra field truncated");
                            break;
                        }
                    }
                }
            }
            if disk_number == 0xffff {
                match read_u32_le(&mut z64) {
                    Ok(v) => disk_number = v,
                    Err(_) => warn!("Zip64 extra field truncated (disk number)"),
                }
            }
        }

        if version_made_by >> 8 == 0 {
            // DOS-family creator: normalize path separators.
            for b in file_name.iter_mut() {
                if *b == b'\\' {
                    *b = b'/';
                }
            }
        }

        Ok(Self {
            version_made_by,
            version_needed,
            general_purpose_bits,
            compression_method,
            dos_mod_time: (dos_date, dos_time),
            crc32,
            compressed_size,
            uncompressed_size,
            file_name,
            comment,
            extras,
            disk_number,
            internal_attributes,
            external_attributes,
            local_header_offset,
        })
    }

    pub(crate) fn name_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.file_name)
    }

    /// Classification per §4.4: directory by trailing slash, else symlink by
    /// Unix host + symlink mode bits + non-empty payload, else file.
    pub(crate) fn raw_kind(&self) -> RawKind {
        if self.file_name.last() == Some(&b'/') {
            return RawKind::Directory;
        }
        let host = (self.version_made_by >> 8) as u8;
        let is_unix_host = !NON_UNIX_HOSTS.contains(&host);
        let unix_mode = self.external_attributes >> 16;
        let is_symlink_mode = unix_mode & UNIX_MODE_MASK == UNIX_MODE_SYMLINK;
        if is_unix_host && is_symlink_mode && self.uncompressed_size > 0 {
            RawKind::Symlink
        } else {
            RawKind::File
        }
    }

    /// Name with the trailing slash stripped for directories.
    pub(crate) fn normalized_name(&self) -> String {
        let name = self.name_lossy();
        match self.raw_kind() {
            RawKind::Directory => name.trim_end_matches('/').to_string(),
            _ => name.into_owned(),
        }
    }
}
