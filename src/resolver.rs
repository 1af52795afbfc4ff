//! Entry resolver (C6): local-header validation and symlink following.
use std::io::{Read, Seek};

use crate::entry::{Entry, EntryId, Kind};
use crate::error::{Error, Result};
use crate::format::central_directory::CentralDirectoryRecord;
use crate::format::local::LocalFileHeader;
use crate::io::ByteSource;
use crate::tree::DirectoryTree;

/// `resolve(entry)`: idempotent and cycle-safe (§4.6). Returns the id of the
/// entry payload reads should actually use — itself for files/directories,
/// or the final non-symlink target for a resolved symlink.
pub(crate) fn resolve(
    source: &mut dyn ByteSource,
    entries: &mut Vec<Entry>,
    tree: &mut DirectoryTree,
    root: EntryId,
    records: &[Option<CentralDirectoryRecord>],
    id: EntryId,
) -> Result<EntryId> {
    match entries[id].kind {
        Kind::Directory => Ok(id),
        Kind::Resolved => Ok(entries[id].symlink_target.unwrap_or(id)),
        Kind::BrokenFile | Kind::BrokenSymlink => {
            Err(Error::corrupt(format!("entry is broken: {}", entries[id].name)))
        }
        Kind::Resolving => Err(Error::SymlinkLoop),
        Kind::UnresolvedFile => {
            match parse_local(source, entries, id, records) {
                Ok(()) => {
                    entries[id].kind = Kind::Resolved;
                    Ok(id)
                }
                Err(e) => {
                    entries[id].kind = Kind::BrokenFile;
                    Err(e)
                }
            }
        }
        Kind::UnresolvedSymlink => resolve_symlink(source, entries, tree, root, records, id),
    }
}

fn parse_local(
    source: &mut dyn ByteSource,
    entries: &mut [Entry],
    id: EntryId,
    records: &[Option<CentralDirectoryRecord>],
) -> Result<()> {
    let record = records[id]
        .as_ref()
        .expect("every non-fabricated entry keeps its central-directory record until resolved");
    let header = LocalFileHeader::parse(source, entries[id].data_offset, record)?;

    let mut data_offset = header.data_offset;
    if let Some(aes) = entries[id].aes_params.as_mut() {
        let salt_len = crate::crypto::AesSession::salt_len(aes.strength)?;
        crate::io::seek_to(source, data_offset)?;
        let salt = crate::io::read_all(source, salt_len)?;
        let verifier_bytes = crate::io::read_all(source, 2)?;
        aes.salt = salt;
        aes.verifier = [verifier_bytes[0], verifier_bytes[1]];
        data_offset += (salt_len + 2) as u64;
    }
    entries[id].data_offset = data_offset;
    Ok(())
}

fn resolve_symlink(
    source: &mut dyn ByteSource,
    entries: &mut Vec<Entry>,
    tree: &mut DirectoryTree,
    root: EntryId,
    records: &[Option<CentralDirectoryRecord>],
    id: EntryId,
) -> Result<EntryId> {
    entries[id].kind = Kind::Resolving;

    let outcome = (|| -> Result<EntryId> {
        parse_local(source, entries, id, records)?;
        let link_text = read_link_payload(source, &entries[id])?;
        let is_dos_host = entries[id].version_made_by >> 8 == 0;
        let link_text = if is_dos_host {
            link_text.replace('\\', "/")
        } else {
            link_text
        };
        let target_path = normalize_symlink_path(&entries[id].name, &link_text)
            .ok_or_else(|| Error::corrupt("symlink escapes the archive root"))?;

        let target_id = tree
            .find(entries, root, &target_path)
            .ok_or_else(|| Error::not_found(target_path.clone()))?;
        let resolved = resolve(source, entries, tree, root, records, target_id)?;
        Ok(resolved)
    })();

    match outcome {
        Ok(target) => {
            entries[id].kind = Kind::Resolved;
            entries[id].symlink_target = Some(target);
            Ok(target)
        }
        Err(Error::SymlinkLoop) => Err(Error::SymlinkLoop),
        Err(e) => {
            entries[id].kind = Kind::BrokenSymlink;
            Err(e)
        }
    }
}

/// Reads the symlink's payload (the link text), inflating it first if the
/// entry is stored deflated. Encrypted symlink targets aren't part of any
/// scenario this reader needs to support and are rejected as unsupported.
fn read_link_payload<R: Read + Seek + ?Sized>(source: &mut R, entry: &Entry) -> Result<String> {
    if entry.aes_params.is_some() || entry.general_purpose_bits & crate::format::GP_IS_ENCRYPTED != 0 {
        return Err(Error::unsupported("encrypted symlink targets are not supported"));
    }
    crate::io::seek_to(source, entry.data_offset)?;
    let raw = crate::io::read_all(source, entry.compressed_size as usize)?;
    let plain = match entry.compression_method {
        0 => raw,
        8 => {
            let mut out = Vec::with_capacity(entry.uncompressed_size as usize);
            let mut decompress = flate2::Decompress::new(false);
            decompress
                .decompress_vec(&raw, &mut out, flate2::FlushDecompress::Finish)
                .map_err(|e| Error::corrupt(format!("symlink payload inflate failed: {e}")))?;
            out
        }
        other => return Err(Error::unsupported(format!("compression method {other} on symlink"))),
    };
    String::from_utf8(plain).map_err(|_| Error::corrupt("symlink target is not valid UTF-8"))
}

/// Resolves `link_text` relative to `symlink_name`'s parent directory,
/// collapsing `.` and `..` segments; `..` past the archive root fails.
fn normalize_symlink_path(symlink_name: &str, link_text: &str) -> Option<String> {
    let mut segments: Vec<&str> = match symlink_name.rfind('/') {
        Some(idx) => symlink_name[..idx].split('/').collect(),
        None => Vec::new(),
    };
    for part in link_text.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            seg => segments.push(seg),
        }
    }
    Some(segments.join("/"))
}
