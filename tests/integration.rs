//! End-to-end scenarios and boundary cases, built from hand-assembled
//! in-memory ZIP byte buffers — this crate ships no binary test fixture.
use std::io::{Cursor, Write};

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use flate2::write::DeflateEncoder;
use flate2::Compression;

use zippy::{Archive, Error, FileType, DEFAULT_PASSWORD};

const EOCD_SIG: [u8; 4] = *b"PK\x05\x06";
const CENTRAL_SIG: [u8; 4] = *b"PK\x01\x02";
const LOCAL_SIG: [u8; 4] = *b"PK\x03\x04";
const Z64_EOCD_SIG: [u8; 4] = *b"PK\x06\x06";
const Z64_EOCD_LOCATOR_SIG: [u8; 4] = *b"PK\x06\x07";

const ZIP64_EXTRA_ID: u16 = 0x0001;
const WZAES_EXTRA_ID: u16 = 0x9901;
const WZAES_METHOD: u16 = 99;
const GP_ENCRYPTED: u16 = 1 << 0;

const DOS_TIME: u16 = ((10u32 << 11) | (30 << 5)) as u16;
const DOS_DATE: u16 = (((2021 - 1980u32) << 9) | (3 << 5) | 15) as u16;

/// One entry to place in a hand-built archive.
struct RawEntry {
    name: &'static str,
    version_made_by: u16,
    gp_bits: u16,
    method: u16,
    crc32: u32,
    compressed: Vec<u8>,
    uncompressed_size: u64,
    external_attributes: u32,
    central_extra: Vec<u8>,
    /// On-disk u32 (compressed, uncompressed) pair for the *central* record
    /// only; `None` means the real (truncated) lengths. Used to force the
    /// Zip64 `0xffffffff` sentinel while the local header keeps real values.
    central_field_override: Option<(u32, u32)>,
}

impl RawEntry {
    fn plain(name: &'static str, method: u16, compressed: Vec<u8>, uncompressed_size: u64) -> Self {
        Self {
            name,
            version_made_by: 0x0000,
            gp_bits: 0,
            method,
            crc32: 0,
            compressed,
            uncompressed_size,
            external_attributes: 0,
            central_extra: Vec::new(),
            central_field_override: None,
        }
    }

    fn symlink(name: &'static str, target: &str) -> Self {
        Self {
            name,
            version_made_by: 0x0314, // host 3 (Unix), version 20
            gp_bits: 0,
            method: 0,
            crc32: 0,
            compressed: target.as_bytes().to_vec(),
            uncompressed_size: target.len() as u64,
            external_attributes: 0o120755u32 << 16,
            central_extra: Vec::new(),
            central_field_override: None,
        }
    }
}

fn deflate(plain: &[u8]) -> Vec<u8> {
    let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
    enc.write_all(plain).unwrap();
    enc.finish().unwrap()
}

/// Minimal traditional PKWARE stream cipher, duplicated here (test-only)
/// since the production implementation is crate-private. Same key update
/// and keystream formulas as `crypto::TraditionalKeys`.
struct PkKeys {
    k0: u32,
    k1: u32,
    k2: u32,
}

fn crc32_step(crc: u32, b: u8) -> u32 {
    let mut c = crc ^ u32::from(b);
    for _ in 0..8 {
        c = if c & 1 != 0 { 0xedb88320 ^ (c >> 1) } else { c >> 1 };
    }
    c
}

impl PkKeys {
    fn new(password: &[u8]) -> Self {
        let mut keys = Self { k0: 0x1234_5678, k1: 0x2345_6789, k2: 0x3456_7890 };
        for &b in password {
            keys.update(b);
        }
        keys
    }

    fn update(&mut self, plaintext_byte: u8) {
        self.k0 = crc32_step(self.k0, plaintext_byte);
        self.k1 = self.k1.wrapping_add(self.k0 & 0xff);
        self.k1 = self.k1.wrapping_mul(134775813).wrapping_add(1);
        self.k2 = crc32_step(self.k2, (self.k1 >> 24) as u8);
    }

    fn keystream_byte(&self) -> u8 {
        let tmp = (self.k2 | 2) as u16;
        ((tmp.wrapping_mul(tmp ^ 1)) >> 8) as u8
    }

    fn encrypt_byte(&mut self, p: u8) -> u8 {
        let c = p ^ self.keystream_byte();
        self.update(p);
        c
    }
}

/// Builds a 12-byte encryption header plus traditionally-encrypted
/// ciphertext. `verifier` is the final header byte; the archive side
/// re-derives it as the CRC-32 high byte when bit 3 is unset.
fn traditional_encrypt(password: &[u8], verifier: u8, plain: &[u8]) -> Vec<u8> {
    let mut keys = PkKeys::new(password);
    let mut header = [0xA5u8; 12];
    header[11] = verifier;
    let mut out = Vec::with_capacity(12 + plain.len());
    for b in header {
        out.push(keys.encrypt_byte(b));
    }
    for &b in plain {
        out.push(keys.encrypt_byte(b));
    }
    out
}

/// Derives an AES-256 key via PBKDF2-HMAC-SHA1 and returns
/// `salt ++ verifier ++ ciphertext ++ zeroed-auth-tag`, the on-disk layout
/// `WZAES` entries use (the 10-byte auth tag is never checked by this
/// reader, per spec).
fn aes256_encrypt(password: &[u8], salt: &[u8; 16], plain: &[u8]) -> Vec<u8> {
    let key_len = 32usize;
    let derived_len = key_len * 2 + 2;
    let mut derived = vec![0u8; derived_len];
    pbkdf2::pbkdf2_hmac::<sha1::Sha1>(password, salt, 1000, &mut derived);
    let verifier = [derived[derived_len - 2], derived[derived_len - 1]];
    let key = &derived[0..key_len];
    let iv = 1u128.to_le_bytes();
    let mut cipher = ctr::Ctr128LE::<Aes256>::new(key.into(), iv.as_slice().into());
    let mut ciphertext = plain.to_vec();
    cipher.apply_keystream(&mut ciphertext);

    let mut out = Vec::with_capacity(16 + 2 + ciphertext.len() + 10);
    out.extend_from_slice(salt);
    out.extend_from_slice(&verifier);
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&[0u8; 10]);
    out
}

fn wzaes_extra(actual_method: u16) -> Vec<u8> {
    let mut extra = Vec::new();
    extra.extend_from_slice(&WZAES_EXTRA_ID.to_le_bytes());
    extra.extend_from_slice(&7u16.to_le_bytes());
    extra.extend_from_slice(&2u16.to_le_bytes()); // vendor version AE-2
    extra.extend_from_slice(b"AE"); // vendor id, read back as 0x4541
    extra.push(3); // strength tag: 256-bit
    extra.extend_from_slice(&actual_method.to_le_bytes());
    extra
}

fn zip64_extra(uncompressed_size: u64, compressed_size: u64) -> Vec<u8> {
    let mut extra = Vec::new();
    extra.extend_from_slice(&ZIP64_EXTRA_ID.to_le_bytes());
    extra.extend_from_slice(&16u16.to_le_bytes());
    extra.extend_from_slice(&uncompressed_size.to_le_bytes());
    extra.extend_from_slice(&compressed_size.to_le_bytes());
    extra
}

/// Assembles local headers + payload, central directory, and EOCD into one
/// archive buffer. `prefix` is prepended unmodified (simulating a
/// self-extractor stub) without adjusting any recorded offset, exercising
/// the locator's self-extractor correction.
fn build_zip(entries: &[RawEntry], comment: &[u8], prefix: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    let mut local_offsets = Vec::with_capacity(entries.len());

    for e in entries {
        local_offsets.push(body.len() as u32);
        let real_compressed = e.compressed.len() as u32;
        let real_uncompressed = e.uncompressed_size as u32;

        body.extend_from_slice(&LOCAL_SIG);
        body.extend_from_slice(&20u16.to_le_bytes());
        body.extend_from_slice(&e.gp_bits.to_le_bytes());
        body.extend_from_slice(&e.method.to_le_bytes());
        body.extend_from_slice(&DOS_TIME.to_le_bytes());
        body.extend_from_slice(&DOS_DATE.to_le_bytes());
        body.extend_from_slice(&e.crc32.to_le_bytes());
        body.extend_from_slice(&real_compressed.to_le_bytes());
        body.extend_from_slice(&real_uncompressed.to_le_bytes());
        body.extend_from_slice(&(e.name.len() as u16).to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes()); // local extra length
        body.extend_from_slice(e.name.as_bytes());
        body.extend_from_slice(&e.compressed);
    }

    let cd_start = body.len() as u32;
    for (e, &offset) in entries.iter().zip(&local_offsets) {
        let (c_compressed, c_uncompressed) = e
            .central_field_override
            .unwrap_or((e.compressed.len() as u32, e.uncompressed_size as u32));

        body.extend_from_slice(&CENTRAL_SIG);
        body.extend_from_slice(&e.version_made_by.to_le_bytes());
        body.extend_from_slice(&20u16.to_le_bytes());
        body.extend_from_slice(&e.gp_bits.to_le_bytes());
        body.extend_from_slice(&e.method.to_le_bytes());
        body.extend_from_slice(&DOS_TIME.to_le_bytes());
        body.extend_from_slice(&DOS_DATE.to_le_bytes());
        body.extend_from_slice(&e.crc32.to_le_bytes());
        body.extend_from_slice(&c_compressed.to_le_bytes());
        body.extend_from_slice(&c_uncompressed.to_le_bytes());
        body.extend_from_slice(&(e.name.len() as u16).to_le_bytes());
        body.extend_from_slice(&(e.central_extra.len() as u16).to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes()); // comment length
        body.extend_from_slice(&0u16.to_le_bytes()); // disk number
        body.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
        body.extend_from_slice(&e.external_attributes.to_le_bytes());
        body.extend_from_slice(&offset.to_le_bytes());
        body.extend_from_slice(e.name.as_bytes());
        body.extend_from_slice(&e.central_extra);
    }
    let cd_size = body.len() as u32 - cd_start;

    body.extend_from_slice(&EOCD_SIG);
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    body.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    body.extend_from_slice(&cd_size.to_le_bytes());
    body.extend_from_slice(&cd_start.to_le_bytes());
    body.extend_from_slice(&(comment.len() as u16).to_le_bytes());
    body.extend_from_slice(comment);

    let mut out = Vec::with_capacity(prefix.len() + body.len());
    out.extend_from_slice(prefix);
    out.extend_from_slice(&body);
    out
}

fn open(bytes: Vec<u8>) -> Archive {
    Archive::open(Box::new(Cursor::new(bytes)), false).expect("archive opens")
}

fn read_all(archive: &mut Archive, path: &str) -> Vec<u8> {
    let mut reader = archive.open_read(path).expect("open_read succeeds");
    let mut out = Vec::new();
    let mut chunk = [0u8; 64];
    loop {
        let n = reader.read(&mut chunk).expect("read succeeds");
        if n == 0 {
            break;
        }
        out.extend_from_slice(&chunk[..n]);
    }
    out
}

#[test]
fn stored_round_trip() {
    let content = b"hello world".to_vec();
    let entries = [RawEntry::plain("hello.txt", 0, content.clone(), content.len() as u64)];
    let mut archive = open(build_zip(&entries, &[], &[]));

    let stat = archive.stat("hello.txt").unwrap();
    assert_eq!(stat.file_type, FileType::Regular);
    assert_eq!(stat.size, content.len() as u64);
    assert!(!stat.is_encrypted);

    assert_eq!(read_all(&mut archive, "hello.txt"), content);
}

#[test]
fn deflated_entry_survives_backward_seek() {
    let plain = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(5);
    let compressed = deflate(&plain);
    let entries = [RawEntry::plain("lorem.txt", 8, compressed, plain.len() as u64)];
    let mut archive = open(build_zip(&entries, &[], &[]));

    let mut reader = archive.open_read("lorem.txt").unwrap();
    let mut first_half = vec![0u8; plain.len() / 2];
    let mut filled = 0;
    while filled < first_half.len() {
        let n = reader.read(&mut first_half[filled..]).unwrap();
        assert!(n > 0);
        filled += n;
    }
    assert_eq!(&first_half[..], &plain[..first_half.len()]);

    reader.seek(0).unwrap();
    let mut from_start = vec![0u8; first_half.len()];
    filled = 0;
    while filled < from_start.len() {
        let n = reader.read(&mut from_start[filled..]).unwrap();
        assert!(n > 0);
        filled += n;
    }
    assert_eq!(from_start, first_half);
}

#[test]
fn traditional_encrypted_entry_opens_with_suffixed_password() {
    let plain = b"top secret data".to_vec();
    let ciphertext = traditional_encrypt(b"hunter2", 0, &plain);
    let entries = [RawEntry {
        gp_bits: GP_ENCRYPTED,
        ..RawEntry::plain("secret.txt", 0, ciphertext, plain.len() as u64)
    }];
    let mut archive = open(build_zip(&entries, &[], &[]));

    let stat = archive.stat("secret.txt").unwrap();
    assert!(stat.is_encrypted);
    assert_eq!(read_all(&mut archive, "secret.txt$hunter2"), plain);

    // wrong password fails with BadPassword, not a silent garbage read
    let err = archive.open_read("secret.txt$wrongpass").unwrap_err();
    assert!(matches!(err, Error::BadPassword));

    // the bare name, with no password suffix at all, never reaches the
    // cipher — a password is required to reach an encrypted entry at all
    let err = archive.open_read("secret.txt").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn password_suffix_on_a_non_encrypted_entry_is_rejected() {
    let secret_plain = b"top secret data".to_vec();
    let ciphertext = traditional_encrypt(b"hunter2", 0, &secret_plain);
    let plain = b"nothing to hide here".to_vec();
    let entries = [
        RawEntry {
            gp_bits: GP_ENCRYPTED,
            ..RawEntry::plain("secret.txt", 0, ciphertext, secret_plain.len() as u64)
        },
        RawEntry::plain("plain.txt", 0, plain.clone(), plain.len() as u64),
    ];
    let mut archive = open(build_zip(&entries, &[], &[]));

    assert_eq!(read_all(&mut archive, "plain.txt"), plain);

    // the archive has an encrypted entry, so a miss on the literal path
    // falls back to splitting on `$` — but `plain.txt` isn't encrypted,
    // so a supplied password is rejected rather than silently ignored
    let err = archive.open_read("plain.txt$whatever").unwrap_err();
    assert!(matches!(err, Error::BadPassword));
}

#[test]
fn aes256_entries_always_use_the_built_in_password() {
    let plain = b"malware sample, zipped the usual way".to_vec();
    let salt = [9u8; 16];
    let payload = aes256_encrypt(DEFAULT_PASSWORD.as_bytes(), &salt, &plain);
    let entries = [RawEntry {
        gp_bits: GP_ENCRYPTED,
        central_extra: wzaes_extra(0),
        ..RawEntry::plain("sample.bin", WZAES_METHOD, payload, plain.len() as u64)
    }];
    let mut archive = open(build_zip(&entries, &[], &[]));

    let stat = archive.stat("sample.bin").unwrap();
    assert!(stat.is_encrypted);
    // bare name: the built-in password is tried automatically
    assert_eq!(read_all(&mut archive, "sample.bin"), plain);
    // any supplied suffix is ignored for AES — the built-in password is
    // still what gets tried, and it still succeeds
    assert_eq!(read_all(&mut archive, "sample.bin$ignored-suffix"), plain);
}

#[test]
fn aes256_entry_encrypted_with_a_non_default_password_is_unreachable() {
    let plain = b"vault contents, 256-bit protected".to_vec();
    let salt = [7u8; 16];
    let payload = aes256_encrypt(b"vaultpass", &salt, &plain);
    let entries = [RawEntry {
        gp_bits: GP_ENCRYPTED,
        central_extra: wzaes_extra(0),
        ..RawEntry::plain("vault.bin", WZAES_METHOD, payload, plain.len() as u64)
    }];
    let mut archive = open(build_zip(&entries, &[], &[]));

    // the suffix is parsed but never reaches AES's key derivation, so the
    // built-in password is tried against a payload encrypted with a
    // different one and the verifier check fails
    let err = archive.open_read("vault.bin$vaultpass").unwrap_err();
    assert!(matches!(err, Error::BadPassword));
}

#[test]
fn self_extractor_prefix_is_transparent() {
    let content = b"payload behind an sfx stub".to_vec();
    let entries = [RawEntry::plain("data.bin", 0, content.clone(), content.len() as u64)];
    let stub = vec![0x4du8, 0x5a, 0x90, 0x00].repeat(64); // arbitrary non-zip prefix bytes
    let mut archive = open(build_zip(&entries, &[], &stub));

    assert_eq!(read_all(&mut archive, "data.bin"), content);
}

#[test]
fn symlink_chain_resolves_to_final_target() {
    let content = b"target content".to_vec();
    let entries = [
        RawEntry::plain("real.txt", 0, content.clone(), content.len() as u64),
        RawEntry::symlink("link1", "real.txt"),
        RawEntry::symlink("link2", "link1"),
    ];
    let mut archive = open(build_zip(&entries, &[], &[]));

    let stat = archive.stat("link2").unwrap();
    assert_eq!(stat.file_type, FileType::Regular);
    assert_eq!(read_all(&mut archive, "link2"), content);
}

#[test]
fn eocd_at_max_comment_boundary_succeeds() {
    let comment = vec![b'.'; 65535];
    let bytes = build_zip(&[], &comment, &[]);
    let archive = Archive::open(Box::new(Cursor::new(bytes)), false).unwrap();
    assert_eq!(archive.comment().len(), 65535);
}

#[test]
fn eocd_one_byte_past_scan_budget_is_unsupported() {
    let comment = vec![b'.'; 65535];
    let mut bytes = build_zip(&[], &comment, &[]);
    bytes.push(0); // pushes the EOCD signature one byte outside the scan window
    let err = Archive::open(Box::new(Cursor::new(bytes)), false).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}

#[test]
fn zero_size_entry_reads_as_immediate_eof() {
    let entries = [RawEntry::plain("empty.txt", 0, Vec::new(), 0)];
    let mut archive = open(build_zip(&entries, &[], &[]));

    let stat = archive.stat("empty.txt").unwrap();
    assert_eq!(stat.size, 0);

    let mut reader = archive.open_read("empty.txt").unwrap();
    let mut buf = [0u8; 16];
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
}

#[test]
fn zip64_widened_entry_reads_full_content() {
    let content = b"zip64-widened entry content, larger than a toy file".to_vec();
    let entries = [RawEntry {
        central_extra: zip64_extra(content.len() as u64, content.len() as u64),
        central_field_override: Some((0xffff_ffff, 0xffff_ffff)),
        ..RawEntry::plain("big.bin", 0, content.clone(), content.len() as u64)
    }];
    let mut archive = open(build_zip(&entries, &[], &[]));

    let stat = archive.stat("big.bin").unwrap();
    assert_eq!(stat.size, content.len() as u64);
    assert_eq!(read_all(&mut archive, "big.bin"), content);
}

#[test]
fn zip64_eocd_behind_a_self_extractor_prefix_resolves_offsets() {
    // A genuine Zip64 end-of-central-directory record plus its locator, with
    // every offset written the way a real archiver would (relative to the
    // zip data itself, oblivious to a stub prepended ahead of it).
    let content = b"zip64 eocd archive content, located behind a self-extractor stub".to_vec();
    let name = b"data.bin";

    let mut body = Vec::new();
    let local_offset = body.len() as u32;
    body.extend_from_slice(&LOCAL_SIG);
    body.extend_from_slice(&45u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&DOS_TIME.to_le_bytes());
    body.extend_from_slice(&DOS_DATE.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&(content.len() as u32).to_le_bytes());
    body.extend_from_slice(&(content.len() as u32).to_le_bytes());
    body.extend_from_slice(&(name.len() as u16).to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(name);
    body.extend_from_slice(&content);

    let cd_start = body.len() as u32;
    body.extend_from_slice(&CENTRAL_SIG);
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&45u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&DOS_TIME.to_le_bytes());
    body.extend_from_slice(&DOS_DATE.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&(content.len() as u32).to_le_bytes());
    body.extend_from_slice(&(content.len() as u32).to_le_bytes());
    body.extend_from_slice(&(name.len() as u16).to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&local_offset.to_le_bytes());
    body.extend_from_slice(name);
    let cd_size = body.len() as u32 - cd_start;

    let zip64_eocd_offset = body.len() as u64;
    body.extend_from_slice(&Z64_EOCD_SIG);
    body.extend_from_slice(&44u64.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&45u16.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&1u64.to_le_bytes());
    body.extend_from_slice(&1u64.to_le_bytes());
    body.extend_from_slice(&(cd_size as u64).to_le_bytes());
    body.extend_from_slice(&(cd_start as u64).to_le_bytes());

    body.extend_from_slice(&Z64_EOCD_LOCATOR_SIG);
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&zip64_eocd_offset.to_le_bytes());
    body.extend_from_slice(&1u32.to_le_bytes());

    body.extend_from_slice(&EOCD_SIG);
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&cd_size.to_le_bytes());
    body.extend_from_slice(&cd_start.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());

    let stub = vec![0x4du8, 0x5a, 0x90, 0x00].repeat(64);
    let mut bytes = Vec::with_capacity(stub.len() + body.len());
    bytes.extend_from_slice(&stub);
    bytes.extend_from_slice(&body);

    let mut archive = open(bytes);
    assert_eq!(read_all(&mut archive, "data.bin"), content);
}

#[test]
fn symlink_escaping_archive_root_is_broken() {
    let entries = [RawEntry::symlink("evil_link", "../../../etc/passwd")];
    let mut archive = open(build_zip(&entries, &[], &[]));

    assert!(archive.stat("evil_link").is_err());
    // re-querying a broken entry reports broken again, it doesn't panic or
    // silently resolve on a second attempt
    assert!(archive.stat("evil_link").is_err());
}

#[test]
fn symlink_cycle_is_reported_as_a_loop() {
    let entries = [RawEntry::symlink("a", "b"), RawEntry::symlink("b", "a")];
    let mut archive = open(build_zip(&entries, &[], &[]));

    let err = archive.stat("a").unwrap_err();
    assert!(matches!(err, Error::SymlinkLoop));
}
