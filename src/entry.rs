//! The `Entry` data model (§3): one name in the archive, plus the tree/hash
//! links that give it a place in the directory and bucket structures.
use crate::format::central_directory::{CentralDirectoryRecord, RawKind};

/// Index into [`crate::Archive`]'s entry arena. Entries reference each other
/// (`children`/`sibling`/`hash_next`/`symlink_target`) by this index rather
/// than by pointer or `Rc`, since the archive is each entry's single owner
/// for its whole lifetime and the graph can contain symlink cycles.
pub type EntryId = usize;

/// Lifecycle state of an entry, per the resolver's state machine (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    UnresolvedFile,
    UnresolvedSymlink,
    /// A symlink currently being followed; re-entering an entry in this
    /// state is a cycle.
    Resolving,
    Resolved,
    Directory,
    BrokenFile,
    BrokenSymlink,
}

impl Kind {
    pub(crate) fn from_raw(raw: RawKind) -> Self {
        match raw {
            RawKind::Directory => Kind::Directory,
            RawKind::Symlink => Kind::UnresolvedSymlink,
            RawKind::File => Kind::UnresolvedFile,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Kind::Directory)
    }
}

/// The three file types `stat` can report (§4.8, testable property 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Directory,
    Symlink,
    Regular,
}

/// WinZip AES parameters captured off the entry's extra field.
#[derive(Debug, Clone)]
pub struct AesParams {
    /// 128, 192 or 256.
    pub strength: u16,
    pub salt: Vec<u8>,
    pub verifier: [u8; 2],
    /// The compression method actually used once AES is peeled off.
    pub actual_method: u16,
}

#[derive(Debug)]
pub struct Entry {
    pub name: String,
    pub kind: Kind,
    pub symlink_target: Option<EntryId>,
    /// Absolute byte offset into the byte source. Before resolution, the
    /// local file header; after, the first payload byte.
    pub data_offset: u64,

    pub version_made_by: u16,
    pub version_needed: u16,
    pub general_purpose_bits: u16,
    /// 0 = stored, 8 = deflate, 99 = AES-wrapped (see `aes_params` for the
    /// real inner method).
    pub compression_method: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub dos_mod_time: (u16, u16),
    pub last_mod_time: Option<i64>,
    pub aes_params: Option<AesParams>,

    pub(crate) children: Option<EntryId>,
    pub(crate) sibling: Option<EntryId>,
    pub(crate) hash_next: Option<EntryId>,
}

/// Which cipher, if any, protects an entry's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionKind {
    None,
    Traditional,
    Aes { strength: u16 },
}

impl Entry {
    /// A synthetic directory with no backing central-directory record:
    /// either the archive root, or a fabricated ancestor directory.
    pub(crate) fn placeholder_directory(name: String) -> Self {
        Self {
            name,
            kind: Kind::Directory,
            symlink_target: None,
            data_offset: 0,
            version_made_by: 0,
            version_needed: 0,
            general_purpose_bits: 0,
            compression_method: 0,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            dos_mod_time: (0, 0),
            last_mod_time: None,
            aes_params: None,
            children: None,
            sibling: None,
            hash_next: None,
        }
    }

    /// A placeholder is recognizable by its default `last_mod_time` — the
    /// same signal a fabricated ancestor directory carries (§4.5).
    pub(crate) fn is_placeholder(&self) -> bool {
        matches!(self.kind, Kind::Directory) && self.last_mod_time.is_none()
    }

    /// The file type `stat` reports: directory, symlink (resolved or not,
    /// including a broken one), or regular file.
    pub fn file_type(&self) -> FileType {
        match self.kind {
            Kind::Directory => FileType::Directory,
            Kind::UnresolvedSymlink | Kind::Resolving | Kind::BrokenSymlink => FileType::Symlink,
            Kind::Resolved if self.symlink_target.is_some() => FileType::Symlink,
            _ => FileType::Regular,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.aes_params.is_some() || self.general_purpose_bits & crate::format::GP_IS_ENCRYPTED != 0
    }

    pub fn encryption_kind(&self) -> EncryptionKind {
        match &self.aes_params {
            Some(aes) => EncryptionKind::Aes { strength: aes.strength },
            None if self.general_purpose_bits & crate::format::GP_IS_ENCRYPTED != 0 => {
                EncryptionKind::Traditional
            }
            None => EncryptionKind::None,
        }
    }

    pub(crate) fn from_central_record(name: String, record: &CentralDirectoryRecord) -> Self {
        let raw = record.raw_kind();
        let last_mod_time =
            crate::format::date_time::dos_to_epoch(record.dos_mod_time.0, record.dos_mod_time.1);
        let aes_params = if record.compression_method == crate::format::WZAES_COMPRESSION_METHOD {
            record
                .extras
                .field_data(crate::format::WZAES_EXTRA_ID)
                .and_then(|data| parse_aes_extra(data))
        } else {
            None
        };
        let compression_method = aes_params
            .as_ref()
            .map(|p| p.actual_method)
            .unwrap_or(record.compression_method);
        Self {
            name,
            kind: Kind::from_raw(raw),
            symlink_target: None,
            data_offset: record.local_header_offset,
            version_made_by: record.version_made_by,
            version_needed: record.version_needed,
            general_purpose_bits: record.general_purpose_bits,
            compression_method,
            crc32: record.crc32,
            compressed_size: record.compressed_size,
            uncompressed_size: if raw == RawKind::Directory { 0 } else { record.uncompressed_size },
            dos_mod_time: record.dos_mod_time,
            last_mod_time,
            aes_params,
            children: None,
            sibling: None,
            hash_next: None,
        }
    }

    /// Overwrites a fabricated placeholder's metadata from a real record
    /// that was later found to name the same path (§4.5's duplicate rule).
    pub(crate) fn overwrite_from_record(&mut self, record: &CentralDirectoryRecord) {
        let last_mod_time =
            crate::format::date_time::dos_to_epoch(record.dos_mod_time.0, record.dos_mod_time.1);
        self.kind = Kind::from_raw(record.raw_kind());
        self.data_offset = record.local_header_offset;
        self.version_made_by = record.version_made_by;
        self.version_needed = record.version_needed;
        self.general_purpose_bits = record.general_purpose_bits;
        self.compression_method = record.compression_method;
        self.crc32 = record.crc32;
        self.compressed_size = record.compressed_size;
        self.uncompressed_size = record.uncompressed_size;
        self.dos_mod_time = record.dos_mod_time;
        self.last_mod_time = last_mod_time;
    }
}

fn parse_aes_extra(mut data: &[u8]) -> Option<AesParams> {
    use crate::io::read_u16_le;
    let vendor_version = read_u16_le(&mut data).ok()?;
    let vendor_id = read_u16_le(&mut data).ok()?;
    let strength_tag = crate::io::read_u8(&mut data).ok()?;
    let actual_method = read_u16_le(&mut data).ok()?;
    if !(1..=2).contains(&vendor_version) || vendor_id != 0x4541 {
        return None;
    }
    let strength = match strength_tag {
        1 => 128,
        2 => 192,
        3 => 256,
        _ => return None,
    };
    Some(AesParams {
        strength,
        salt: Vec::new(),
        verifier: [0, 0],
        actual_method,
    })
}
