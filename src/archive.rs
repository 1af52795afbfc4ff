//! Archive façade (C8): open, stat, enumerate, open_read, close.
use tracing::trace;

use crate::entry::{EncryptionKind, Entry, EntryId, FileType};
use crate::error::{Error, Result};
use crate::format::central_directory::CentralDirectoryRecord;
use crate::format::eocd;
use crate::io::ByteSource;
use crate::reader::OpenFile;
use crate::resolver;
use crate::tree::DirectoryTree;

/// Password tried for WinZip-AES entries opened with no explicit password,
/// matching the convention scan pipelines in this shop use for handling
/// password-protected samples.
pub const DEFAULT_PASSWORD: &str = "infected";

/// Metadata `stat` reports about a (possibly symlink-resolved) entry.
#[derive(Debug, Clone)]
pub struct Stat {
    pub file_type: FileType,
    pub size: u64,
    pub mtime: Option<i64>,
    /// Same value as `mtime` — ZIP carries no separate creation time.
    pub createtime: Option<i64>,
    /// ZIP has no access-time concept; always `0`.
    pub accesstime: i64,
    /// Always `true`: this reader never writes back to the archive.
    pub readonly: bool,
    pub is_encrypted: bool,
}

pub struct Archive {
    source: Box<dyn ByteSource>,
    entries: Vec<Entry>,
    records: Vec<Option<CentralDirectoryRecord>>,
    tree: DirectoryTree,
    root: EntryId,
    comment: Vec<u8>,
    zip64: bool,
    has_encrypted_entry: bool,
}

impl Archive {
    /// Opens an archive for reading. `for_writing` exists only to reject the
    /// unsupported case explicitly; this reader never mutates the source.
    pub fn open(mut source: Box<dyn ByteSource>, for_writing: bool) -> Result<Self> {
        if for_writing {
            return Err(Error::ReadOnly);
        }

        let mut sniff = [0u8; 4];
        if crate::io::read_all(source.as_mut(), 4).map(|b| sniff.copy_from_slice(&b)).is_ok() {
            trace!("archive starts with {:02x?}", sniff);
        }

        let located = eocd::locate(source.as_mut())?;
        let entry_count = located.entries_total();

        let mut entries = vec![Entry::placeholder_directory(String::new())];
        let mut records: Vec<Option<CentralDirectoryRecord>> = vec![None];
        let root: EntryId = 0;
        let mut tree = DirectoryTree::new(entry_count as usize);

        let zip64 = located.zip64.is_some();
        let mut has_encrypted_entry = false;

        crate::io::seek_to(source.as_mut(), located.cd_start())?;
        for _ in 0..entry_count {
            let mut record = CentralDirectoryRecord::parse(source.as_mut())?;
            record.local_header_offset = located.adjust(record.local_header_offset);
            let name = record.normalized_name();
            let id = tree.insert(&mut entries, root, &name, &record)?;
            if records.len() < entries.len() {
                records.resize(entries.len(), None);
            }
            if entries[id].is_encrypted() {
                has_encrypted_entry = true;
            }
            records[id] = Some(record);
        }

        Ok(Self {
            source,
            entries,
            records,
            tree,
            root,
            comment: located.eocd.comment.clone(),
            zip64,
            has_encrypted_entry,
        })
    }

    /// The EOCD trailing comment, lossily decoded.
    pub fn comment(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.comment)
    }

    /// `stat`: resolves symlinks and reports the final target's metadata.
    pub fn stat(&mut self, path: &str) -> Result<Stat> {
        let path = path.trim_matches('/');
        let id = self
            .tree
            .find(&mut self.entries, self.root, path)
            .ok_or_else(|| Error::not_found(path.to_string()))?;
        let resolved = resolver::resolve(
            self.source.as_mut(),
            &mut self.entries,
            &mut self.tree,
            self.root,
            &self.records,
            id,
        )?;
        let entry = &self.entries[resolved];
        Ok(Stat {
            file_type: entry.file_type(),
            size: entry.uncompressed_size,
            mtime: entry.last_mod_time,
            createtime: entry.last_mod_time,
            accesstime: 0,
            readonly: true,
            is_encrypted: entry.is_encrypted(),
        })
    }

    /// Lists the immediate children of `dir` without following symlinks —
    /// entries keep whatever type their own header/mode bits describe.
    pub fn enumerate(&mut self, dir: &str, mut visit: impl FnMut(&str, FileType) -> Result<()>) -> Result<()> {
        let dir = dir.trim_matches('/');
        let dir_id = self
            .tree
            .find(&mut self.entries, self.root, dir)
            .ok_or_else(|| Error::not_found(dir.to_string()))?;
        if !self.entries[dir_id].kind.is_directory() {
            return Err(Error::corrupt(format!("not a directory: {dir}")));
        }
        let mut cursor = self.entries[dir_id].children;
        while let Some(id) = cursor {
            let entry = &self.entries[id];
            visit(&entry.name, entry.file_type())?;
            cursor = entry.sibling;
        }
        Ok(())
    }

    /// Opens `path` for reading. `path` is looked up literally first; only
    /// on a miss, and only when the archive holds at least one encrypted
    /// entry, is it split on the last `$` into a path/password pair and
    /// retried. A traditionally-encrypted hit demands a password from that
    /// split — a bare literal hit on one is reported as *not-found* rather
    /// than attempting a guess. AES hits always decrypt with
    /// [`DEFAULT_PASSWORD`], ignoring any supplied suffix. A hit on a
    /// non-encrypted entry rejects any supplied password. Opening a
    /// directory succeeds and yields a zero-length handle — an existing
    /// quirk this reader intentionally keeps rather than turning into a new
    /// error case.
    pub fn open_read(&mut self, path: &str) -> Result<OpenFile> {
        let trimmed = path.trim_matches('/');
        let (target_path, supplied_password) =
            if self.tree.find(&mut self.entries, self.root, trimmed).is_some() {
                (trimmed, None)
            } else if self.has_encrypted_entry {
                match trimmed.rfind('$') {
                    Some(idx) => (&trimmed[..idx], Some(&trimmed[idx + 1..])),
                    None => return Err(Error::not_found(trimmed.to_string())),
                }
            } else {
                return Err(Error::not_found(trimmed.to_string()));
            };

        let id = self
            .tree
            .find(&mut self.entries, self.root, target_path)
            .ok_or_else(|| Error::not_found(target_path.to_string()))?;
        let resolved = resolver::resolve(
            self.source.as_mut(),
            &mut self.entries,
            &mut self.tree,
            self.root,
            &self.records,
            id,
        )?;
        let entry = &self.entries[resolved];
        let password: std::borrow::Cow<'_, [u8]> = match entry.encryption_kind() {
            EncryptionKind::None => {
                if supplied_password.is_some() {
                    return Err(Error::BadPassword);
                }
                std::borrow::Cow::Borrowed(&[])
            }
            EncryptionKind::Aes { .. } => std::borrow::Cow::Borrowed(DEFAULT_PASSWORD.as_bytes()),
            EncryptionKind::Traditional => match supplied_password {
                Some(p) => std::borrow::Cow::Borrowed(p.as_bytes()),
                None => return Err(Error::not_found(target_path.to_string())),
            },
        };
        let dup = self.source.duplicate()?;
        OpenFile::open(dup, entry, &password)
    }

    /// Releases the archive. A plain `drop` does the same; named for
    /// parity with `OpenFile::destroy` and the embedder-facing contract.
    pub fn close(self) {}
}
