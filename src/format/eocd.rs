//! Central-directory locator (C3): EOCD, Zip64 locator/record, and the
//! self-extractor prefix adjustment.
use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, trace, warn};

use super::{EOCD_SIGNATURE, Z64_EOCD_LOCATOR_SIGNATURE, Z64_EOCD_SIGNATURE};
use crate::error::{Error, Result};
use crate::io::{read_u16_le, read_u32_le, read_u64_le};

/// Maximum trailing comment length plus the fixed EOCD record size.
const MAX_EOCD_SCAN: u64 = 65535 + 22;
/// Bound on the brute-force Zip64 EOCD recovery scan.
const ZIP64_RECOVERY_SCAN: u64 = 256 * 1024;

/// Correction applied to every stored offset when the archive carries an
/// arbitrary prefix (e.g. a self-extractor stub).
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SfxAdjustment(i64);

impl SfxAdjustment {
    pub(crate) fn adjust(&self, value: u64) -> u64 {
        value.checked_add_signed(self.0).unwrap_or(value)
    }
}

#[derive(Debug)]
pub struct EndOfCentralDirectory {
    pub(crate) disk_number: u16,
    pub(crate) cd_first_disk: u16,
    pub(crate) entries_this_disk: u16,
    pub(crate) entries_total: u16,
    pub(crate) cd_size: u32,
    pub(crate) cd_offset_on_first_disk: u32,
    pub comment: Vec<u8>,
    adjustment: SfxAdjustment,
}

impl EndOfCentralDirectory {
    fn parse<R: Read>(mut r: R, at_offset: u64) -> Result<Self> {
        let mut ret = Self {
            disk_number: read_u16_le(&mut r)?,
            cd_first_disk: read_u16_le(&mut r)?,
            entries_this_disk: read_u16_le(&mut r)?,
            entries_total: read_u16_le(&mut r)?,
            cd_size: read_u32_le(&mut r)?,
            cd_offset_on_first_disk: read_u32_le(&mut r)?,
            comment: Vec::new(),
            adjustment: SfxAdjustment::default(),
        };
        if ret.cd_offset_on_first_disk != 0xffff_ffff {
            if let Some(adjusted) = at_offset.checked_sub(u64::from(ret.cd_size)) {
                if u64::from(ret.cd_offset_on_first_disk) != adjusted {
                    ret.adjustment = SfxAdjustment(
                        adjusted.wrapping_sub(u64::from(ret.cd_offset_on_first_disk)) as i64,
                    );
                    debug!("self-extractor prefix adjustment: {:?} bytes", ret.adjustment);
                }
            }
        }
        let comment_len = read_u16_le(&mut r)?;
        if comment_len > 0 {
            r.by_ref().take(comment_len.into()).read_to_end(&mut ret.comment)?;
            if ret.comment.len() != usize::from(comment_len) {
                warn!("archive comment is truncated");
            }
        }
        Ok(ret)
    }
}

#[derive(Debug)]
struct Zip64EocdLocator {
    first_disk: u32,
    offset: u64,
}

impl Zip64EocdLocator {
    fn parse<R: Read>(mut r: R) -> Result<Option<Self>> {
        let mut signature = [0u8; 4];
        if r.read(&mut signature)? != 4 {
            return Ok(None);
        }
        if signature != Z64_EOCD_LOCATOR_SIGNATURE {
            return Ok(None);
        }
        Ok(Some(Self {
            first_disk: read_u32_le(&mut r)?,
            offset: read_u64_le(&mut r)?,
        }))
    }
}

#[derive(Debug)]
pub(crate) struct Zip64Eocd {
    pub(crate) disk_number: u32,
    pub(crate) cd_first_disk: u32,
    pub(crate) entries_total: u64,
    pub(crate) cd_size: u64,
    pub(crate) cd_offset_on_first_disk: u64,
}

impl Zip64Eocd {
    fn parse_at<R: Read + Seek + ?Sized>(r: &mut R, offset: u64) -> Result<Self> {
        r.seek(SeekFrom::Start(offset))?;
        let mut signature = [0u8; 4];
        r.read_exact(&mut signature)?;
        if signature != Z64_EOCD_SIGNATURE {
            return Err(Error::corrupt("invalid Zip64 end of central directory signature"));
        }
        let record_size = read_u64_le(r)?;
        if record_size < 44 {
            return Err(Error::corrupt("Zip64 end of central directory record too short"));
        }
        Ok(Self {
            disk_number: {
                let _ver_made_by = read_u16_le(r)?;
                let _ver_to_extract = read_u16_le(r)?;
                read_u32_le(r)?
            },
            cd_first_disk: read_u32_le(r)?,
            entries_total: {
                let _entries_this_disk = read_u64_le(r)?;
                read_u64_le(r)?
            },
            cd_size: read_u64_le(r)?,
            cd_offset_on_first_disk: read_u64_le(r)?,
        })
    }
}

pub(crate) struct LocatedDirectory {
    pub(crate) eocd: EndOfCentralDirectory,
    pub(crate) zip64: Option<Zip64Eocd>,
    pub(crate) adjustment: SfxAdjustment,
}

impl LocatedDirectory {
    /// Entry count, widened by the Zip64 record when present.
    pub(crate) fn entries_total(&self) -> u64 {
        self.zip64
            .as_ref()
            .map(|z| z.entries_total)
            .unwrap_or(self.eocd.entries_total.into())
    }

    /// Absolute, prefix-adjusted offset of the first central-directory record.
    pub(crate) fn cd_start(&self) -> u64 {
        let raw = self
            .zip64
            .as_ref()
            .map(|z| z.cd_offset_on_first_disk)
            .unwrap_or(self.eocd.cd_offset_on_first_disk.into());
        self.adjustment.adjust(raw)
    }

    pub(crate) fn adjust(&self, offset: u64) -> u64 {
        self.adjustment.adjust(offset)
    }
}

/// Scans backward from EOF for the EOCD signature, then resolves the Zip64
/// locator/record chain per the recovery order in the module docs.
pub(crate) fn locate<R: Read + Seek + ?Sized>(r: &mut R) -> Result<LocatedDirectory> {
    let file_size = r.seek(SeekFrom::End(0))?;
    let scan_len = file_size.min(MAX_EOCD_SCAN);
    let scan_start = file_size - scan_len;
    r.seek(SeekFrom::Start(scan_start))?;
    let mut buf = vec![0u8; scan_len as usize];
    r.read_exact(&mut buf)?;

    for found_at in memchr::memmem::rfind_iter(&buf, &EOCD_SIGNATURE) {
        let found_off = scan_start + found_at as u64;
        let mut body = &buf[found_at + 4..];
        let eocd = match EndOfCentralDirectory::parse(&mut body, found_off) {
            Ok(eocd) => eocd,
            Err(_) => continue,
        };
        trace!("EOCD candidate @{:#x}", found_off);

        let locator = if found_off >= 20 {
            if found_at >= 20 {
                Zip64EocdLocator::parse(&buf[found_at - 20..found_at])?
            } else {
                r.seek(SeekFrom::Start(found_off - 20))?;
                Zip64EocdLocator::parse(&mut *r)?
            }
        } else {
            None
        };

        let (zip64, adjustment) = match locator {
            None => {
                if eocd.cd_first_disk != eocd.disk_number {
                    return Err(Error::corrupt("central directory spans multiple disks"));
                }
                (None, eocd.adjustment)
            }
            Some(loc) => {
                let (z64, z64_pos) = resolve_zip64_eocd(r, &loc, found_off)?;
                if z64.disk_number != loc.first_disk {
                    return Err(Error::corrupt(
                        "Zip64 end of central directory and its locator disagree on disk number",
                    ));
                }
                if z64.cd_first_disk != z64.disk_number {
                    return Err(Error::corrupt("Zip64 central directory spans multiple disks"));
                }
                let adjustment = if z64_pos != loc.offset {
                    let adj = SfxAdjustment(z64_pos.wrapping_sub(loc.offset) as i64);
                    debug!("self-extractor prefix adjustment (zip64): {:?} bytes", adj);
                    adj
                } else {
                    SfxAdjustment::default()
                };
                (Some(z64), adjustment)
            }
        };

        return Ok(LocatedDirectory { eocd, zip64, adjustment });
    }

    Err(Error::unsupported("end of central directory not found within scan budget"))
}

/// Recovers the true Zip64 EOCD position when the locator's stored offset is
/// untrusted (self-extractor prefix): try the stored offset, then the two
/// fixed fallback positions, then a bounded backward brute-force scan.
fn resolve_zip64_eocd<R: Read + Seek + ?Sized>(
    r: &mut R,
    loc: &Zip64EocdLocator,
    eocd_pos: u64,
) -> Result<(Zip64Eocd, u64)> {
    if let Ok(z64) = Zip64Eocd::parse_at(r, loc.offset) {
        return Ok((z64, loc.offset));
    }
    for candidate in [eocd_pos.checked_sub(56), eocd_pos.checked_sub(84)] {
        if let Some(candidate) = candidate {
            if let Ok(z64) = Zip64Eocd::parse_at(r, candidate) {
                return Ok((z64, candidate));
            }
        }
    }
    let scan_end = eocd_pos.saturating_sub(84);
    let scan_start = scan_end.saturating_sub(ZIP64_RECOVERY_SCAN);
    if scan_end > scan_start {
        r.seek(SeekFrom::Start(scan_start))?;
        let mut buf = vec![0u8; (scan_end - scan_start) as usize];
        r.read_exact(&mut buf)?;
        for found_at in memchr::memmem::rfind_iter(&buf, &Z64_EOCD_SIGNATURE) {
            let candidate = scan_start + found_at as u64;
            if let Ok(z64) = Zip64Eocd::parse_at(r, candidate) {
                return Ok((z64, candidate));
            }
        }
    }
    Err(Error::corrupt("Zip64 end of central directory could not be located"))
}
