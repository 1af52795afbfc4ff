//! Wire format: signatures, the EOCD/Zip64 locator chain, central-directory
//! and local-header records, extra fields and DOS date/time decoding.
pub(crate) mod central_directory;
pub(crate) mod date_time;
pub(crate) mod eocd;
pub(crate) mod extra_field;
pub(crate) mod local;

pub(crate) const EOCD_SIGNATURE: [u8; 4] = *b"PK\x05\x06";
pub(crate) const Z64_EOCD_LOCATOR_SIGNATURE: [u8; 4] = *b"PK\x06\x07";
pub(crate) const Z64_EOCD_SIGNATURE: [u8; 4] = *b"PK\x06\x06";
pub(crate) const CENTRAL_HEADER_SIGNATURE: [u8; 4] = *b"PK\x01\x02";
pub(crate) const LOCAL_HEADER_SIGNATURE: [u8; 4] = *b"PK\x03\x04";
pub(crate) const DATA_DESCRIPTOR_SIGNATURE: [u8; 4] = *b"PK\x07\x08";

pub(crate) const GP_IS_ENCRYPTED: u16 = 1 << 0;
pub(crate) const GP_HAS_DATA_DESCRIPTOR: u16 = 1 << 3;
#[allow(dead_code)]
pub(crate) const GP_IS_STRONG_ENCRYPTED: u16 = 1 << 6;

pub(crate) const ZIP64_EXTRA_ID: u16 = 0x0001;
pub(crate) const WZAES_EXTRA_ID: u16 = 0x9901;
pub(crate) const WZAES_COMPRESSION_METHOD: u16 = 99;

pub use central_directory::CentralDirectoryRecord;
pub use eocd::EndOfCentralDirectory;
pub use local::LocalFileHeader;
