//! Local file header parsing and local/central cross-validation (part of C6).
use std::io::{Read, Seek, SeekFrom};

use super::extra_field::ExtraFields;
use super::{CentralDirectoryRecord, GP_HAS_DATA_DESCRIPTOR, LOCAL_HEADER_SIGNATURE, ZIP64_EXTRA_ID};
use crate::error::{Error, Result};
use crate::io::{read_u16_le, read_u32_le, read_u64_le};

#[derive(Debug, Clone)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub general_purpose_bits: u16,
    pub compression_method: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub file_name: Vec<u8>,
    pub extras: ExtraFields,
    /// Absolute offset of the first payload byte, once parsing completes.
    pub data_offset: u64,
}

impl LocalFileHeader {
    /// Parses the local header at `offset` (already adjusted for any
    /// self-extractor prefix) and cross-validates it against the
    /// central-directory record, tolerating the usual "streamed" sentinels
    /// (zero, for general-purpose bit 3 producers, or `0xFFFFFFFF`, the
    /// Zip64 marker).
    pub(crate) fn parse<R: Read + Seek + ?Sized>(
        r: &mut R,
        offset: u64,
        central: &CentralDirectoryRecord,
    ) -> Result<Self> {
        r.seek(SeekFrom::Start(offset))?;
        let mut signature = [0u8; 4];
        r.read_exact(&mut signature)?;
        if signature != LOCAL_HEADER_SIGNATURE {
            return Err(Error::corrupt("invalid local file header signature"));
        }
        let version_needed = read_u16_le(r)?;
        let general_purpose_bits = read_u16_le(r)?;
        let compression_method = read_u16_le(r)?;
        let _dos_time = read_u16_le(r)?;
        let _dos_date = read_u16_le(r)?;
        let crc32 = read_u32_le(r)?;
        let mut compressed_size: u64 = read_u32_le(r)?.into();
        let mut uncompressed_size: u64 = read_u32_le(r)?.into();
        let fname_len = read_u16_le(r)?;
        let extra_len = read_u16_le(r)?;

        let mut file_name = vec![0u8; fname_len.into()];
        r.read_exact(&mut file_name)?;
        let extras = ExtraFields::new(r, extra_len.into())?;

        if let Some(mut z64) = extras.field_data(ZIP64_EXTRA_ID) {
            for val in [&mut uncompressed_size, &mut compressed_size] {
                if *val == 0xffff_ffff {
                    if let Ok(v) = read_u64_le(&mut z64) {
                        *val = v;
                    } else {
                        break;
                    }
                }
            }
        }

        let data_offset = r.stream_position()?;

        let is_aes = central.compression_method == super::WZAES_COMPRESSION_METHOD;
        let tolerant_eq = |local: u64, central: u64| {
            local == central || local == 0 || local == 0xffff_ffff
        };
        if version_needed != central.version_needed && central.version_needed != 0 {
            // version_needed frequently diverges harmlessly between headers;
            // not treated as corruption per the reference behavior.
        }
        if !is_aes {
            if !tolerant_eq(compressed_size, central.compressed_size)
                || !tolerant_eq(uncompressed_size, central.uncompressed_size)
                || !tolerant_eq(crc32.into(), central.crc32.into())
            {
                return Err(Error::corrupt("local header disagrees with central directory"));
            }
        }

        Ok(Self {
            version_needed,
            general_purpose_bits,
            compression_method,
            crc32,
            compressed_size: central.compressed_size,
            uncompressed_size: central.uncompressed_size,
            file_name,
            extras,
            data_offset,
        })
    }

    pub(crate) fn has_data_descriptor(&self) -> bool {
        self.general_purpose_bits & GP_HAS_DATA_DESCRIPTOR != 0
    }
}
