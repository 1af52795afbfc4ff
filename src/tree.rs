//! Directory tree & hash index (C5): bucket array with MRU promotion,
//! fabricated ancestor directories, case-insensitive lookup.
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::format::central_directory::CentralDirectoryRecord;

pub(crate) type EntryId = crate::entry::EntryId;

/// Stable FNV-1a hash over the case-folded path, used for both insertion and
/// lookup so the two always agree on a bucket.
fn path_hash(path: &str) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET;
    for ch in path.chars().flat_map(|c| c.to_lowercase()) {
        let mut buf = [0u8; 4];
        for b in ch.encode_utf8(&mut buf).as_bytes() {
            hash ^= u64::from(*b);
            hash = hash.wrapping_mul(PRIME);
        }
    }
    hash
}

fn path_eq_ci(a: &str, b: &str) -> bool {
    a.chars().flat_map(|c| c.to_lowercase()).eq(b.chars().flat_map(|c| c.to_lowercase()))
}

pub(crate) struct DirectoryTree {
    buckets: Vec<Option<EntryId>>,
}

impl DirectoryTree {
    /// Table size = max(1, floor(entry_count / 5)), per §4.5.
    pub(crate) fn new(entry_count: usize) -> Self {
        let size = (entry_count / 5).max(1);
        Self { buckets: vec![None; size] }
    }

    fn bucket_for(&self, path: &str) -> usize {
        (path_hash(path) as usize) % self.buckets.len()
    }

    /// Inserts one new entry at the head of its bucket and its parent's
    /// `children` list, fabricating any missing ancestor directories first.
    /// `full_path` never has a leading or trailing slash.
    pub(crate) fn insert(
        &mut self,
        entries: &mut Vec<Entry>,
        root: EntryId,
        full_path: &str,
        record: &CentralDirectoryRecord,
    ) -> Result<EntryId> {
        let parent = self.ensure_ancestors(entries, root, full_path)?;

        if let Some(existing) = self.find_no_mru(entries, full_path) {
            if entries[existing].is_placeholder() {
                entries[existing].overwrite_from_record(record);
                return Ok(existing);
            }
            return Err(Error::corrupt(format!("duplicate entry: {full_path}")));
        }

        let id = entries.len();
        let mut entry = Entry::from_central_record(full_path.to_string(), record);
        let bucket = self.bucket_for(full_path);
        entry.hash_next = self.buckets[bucket];
        entry.sibling = entries[parent].children;
        entries.push(entry);
        self.buckets[bucket] = Some(id);
        entries[parent].children = Some(id);
        Ok(id)
    }

    /// Walks the prefix segments of `full_path`, fabricating directory
    /// entries for any that don't already exist, and returns the id of the
    /// immediate parent directory.
    fn ensure_ancestors(
        &mut self,
        entries: &mut Vec<Entry>,
        root: EntryId,
        full_path: &str,
    ) -> Result<EntryId> {
        let mut parent = root;
        let mut prefix_end = 0usize;
        let segments: Vec<&str> = full_path.split('/').collect();
        if segments.len() <= 1 {
            return Ok(root);
        }
        for (i, segment) in segments.iter().enumerate() {
            if i + 1 == segments.len() {
                break; // last segment is the entry itself, not an ancestor
            }
            if prefix_end > 0 {
                prefix_end += 1; // account for the '/' separator
            }
            prefix_end += segment.len();
            let ancestor_path = &full_path[..prefix_end];
            parent = match self.find_no_mru(entries, ancestor_path) {
                Some(id) => {
                    if !entries[id].kind.is_directory() {
                        return Err(Error::corrupt(format!(
                            "ancestor path is not a directory: {ancestor_path}"
                        )));
                    }
                    id
                }
                None => {
                    let id = entries.len();
                    let mut dir = Entry::placeholder_directory(ancestor_path.to_string());
                    let bucket = self.bucket_for(ancestor_path);
                    dir.hash_next = self.buckets[bucket];
                    dir.sibling = entries[parent].children;
                    entries.push(dir);
                    self.buckets[bucket] = Some(id);
                    entries[parent].children = Some(id);
                    id
                }
            };
        }
        Ok(parent)
    }

    /// Lookup without MRU promotion, used internally while building the
    /// tree (promoting ancestors mid-insert would be observable and isn't
    /// part of the insertion contract).
    fn find_no_mru(&self, entries: &[Entry], path: &str) -> Option<EntryId> {
        if path.is_empty() {
            return None;
        }
        let mut cursor = self.buckets[self.bucket_for(path)];
        while let Some(id) = cursor {
            if path_eq_ci(&entries[id].name, path) {
                return Some(id);
            }
            cursor = entries[id].hash_next;
        }
        None
    }

    /// `find_entry`: empty path is the root; otherwise hash, walk the
    /// bucket chain case-insensitively, and splice a hit to the bucket head
    /// (move-to-front).
    pub(crate) fn find(
        &mut self,
        entries: &mut [Entry],
        root: EntryId,
        path: &str,
    ) -> Option<EntryId> {
        if path.is_empty() {
            return Some(root);
        }
        let bucket = self.bucket_for(path);
        let mut prev: Option<EntryId> = None;
        let mut cursor = self.buckets[bucket];
        while let Some(id) = cursor {
            let next = entries[id].hash_next;
            if path_eq_ci(&entries[id].name, path) {
                if let Some(prev_id) = prev {
                    entries[prev_id].hash_next = next;
                    entries[id].hash_next = self.buckets[bucket];
                    self.buckets[bucket] = Some(id);
                }
                return Some(id);
            }
            prev = Some(id);
            cursor = next;
        }
        None
    }
}
