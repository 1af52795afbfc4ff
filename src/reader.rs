//! Streaming reader (C7): the open-file handle returned by `open_read`.
//!
//! Forward reads run the byte source through decryption (if any) and
//! inflation (if any) in lockstep. A backward seek can't skip ahead in
//! either layer — the traditional cipher's keystream depends on every prior
//! plaintext byte and DEFLATE has no random access — so it reseats the
//! source at the payload start and replays forward in small chunks (§4.7).
//! The one exception is an AES-encrypted *stored* entry, where the cipher's
//! own counter can be repositioned directly.
use std::io::Read;

use flate2::{Decompress, FlushDecompress, Status};

use crate::crypto::{AesSession, TraditionalSession};
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::format;
use crate::io::ByteSource;

/// Bytes read and discarded per replay step on a backward seek.
const REPLAY_CHUNK: usize = 512;

enum Decryptor {
    None,
    Traditional(TraditionalSession),
    Aes(AesSession),
}

impl Decryptor {
    fn decrypt(&mut self, buf: &mut [u8]) {
        match self {
            Decryptor::None => {}
            Decryptor::Traditional(s) => s.decrypt(buf),
            Decryptor::Aes(s) => s.decrypt(buf),
        }
    }

    fn rewind_to_start(&mut self) {
        match self {
            Decryptor::None => {}
            Decryptor::Traditional(s) => s.rewind(),
            Decryptor::Aes(s) => s.seek(0),
        }
    }
}

pub struct OpenFile {
    source: Box<dyn ByteSource>,
    password: Vec<u8>,
    entry_snapshot: EntrySnapshot,
    decryptor: Decryptor,
    /// Absolute offset of the first stored/compressed byte.
    payload_start: u64,
    /// Length of the stored/compressed payload with any crypto overhead
    /// (salt, verifier, AES auth code, traditional header) excluded.
    compressed_len: u64,
    compressed_position: u64,
    uncompressed_position: u64,
    inflate: Option<Decompress>,
    input_buf: Box<[u8]>,
    input_pos: usize,
    input_len: usize,
}

/// The handful of entry fields an open file needs after resolution; kept by
/// value so the handle outlives any mutation of the archive's entry arena.
#[derive(Clone)]
struct EntrySnapshot {
    data_offset: u64,
    compressed_size: u64,
    uncompressed_size: u64,
    compression_method: u16,
    general_purpose_bits: u16,
    dos_mod_time: (u16, u16),
    crc32: u32,
    aes_strength: Option<u16>,
    aes_salt: Vec<u8>,
    aes_verifier: [u8; 2],
}

impl OpenFile {
    pub(crate) fn open(mut source: Box<dyn ByteSource>, entry: &Entry, password: &[u8]) -> Result<Self> {
        let snapshot = EntrySnapshot {
            data_offset: entry.data_offset,
            compressed_size: entry.compressed_size,
            uncompressed_size: entry.uncompressed_size,
            compression_method: entry.compression_method,
            general_purpose_bits: entry.general_purpose_bits,
            dos_mod_time: entry.dos_mod_time,
            crc32: entry.crc32,
            aes_strength: entry.aes_params.as_ref().map(|a| a.strength),
            aes_salt: entry.aes_params.as_ref().map(|a| a.salt.clone()).unwrap_or_default(),
            aes_verifier: entry.aes_params.as_ref().map(|a| a.verifier).unwrap_or([0, 0]),
        };
        let (decryptor, payload_start, compressed_len) =
            establish(source.as_mut(), &snapshot, password)?;
        crate::io::seek_to(source.as_mut(), payload_start)?;

        Ok(Self {
            source,
            password: password.to_vec(),
            entry_snapshot: snapshot,
            decryptor,
            payload_start,
            compressed_len,
            compressed_position: 0,
            uncompressed_position: 0,
            inflate: if entry.compression_method == 8 {
                Some(Decompress::new(false))
            } else {
                None
            },
            input_buf: vec![0u8; REPLAY_CHUNK].into_boxed_slice(),
            input_pos: 0,
            input_len: 0,
        })
    }

    pub fn length(&self) -> u64 {
        self.entry_snapshot.uncompressed_size
    }

    pub fn tell(&self) -> u64 {
        self.uncompressed_position
    }

    /// Reads up to `buf.len()` plaintext bytes, returning the count read
    /// (0 at end of file).
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = self.entry_snapshot.uncompressed_size - self.uncompressed_position;
        let want = (buf.len() as u64).min(remaining) as usize;
        if want == 0 {
            return Ok(0);
        }
        let produced = self.fill(&mut buf[..want])?;
        self.uncompressed_position += produced as u64;
        Ok(produced)
    }

    /// Repositions the read cursor; `pos` is clamped to the entry's length.
    pub fn seek(&mut self, pos: u64) -> Result<u64> {
        let target = pos.min(self.entry_snapshot.uncompressed_size);

        if target == self.uncompressed_position {
            return Ok(target);
        }

        if self.entry_snapshot.compression_method == 0 && self.can_seek_directly() {
            crate::io::seek_to(self.source.as_mut(), self.payload_start + target)?;
            if let Decryptor::Aes(s) = &mut self.decryptor {
                s.seek(target);
            }
            self.compressed_position = target;
            self.uncompressed_position = target;
            return Ok(target);
        }

        if target < self.uncompressed_position {
            self.rewind()?;
        }

        let mut discard = [0u8; REPLAY_CHUNK];
        while self.uncompressed_position < target {
            let step = ((target - self.uncompressed_position) as usize).min(discard.len());
            let got = self.fill(&mut discard[..step])?;
            if got == 0 {
                break;
            }
            self.uncompressed_position += got as u64;
        }
        Ok(self.uncompressed_position)
    }

    /// True for the entries whose decryption can jump straight to a target
    /// offset instead of replaying (unencrypted, or AES — both are simple
    /// counters; the traditional cipher's key state depends on every prior
    /// byte and can't skip).
    fn can_seek_directly(&self) -> bool {
        !matches!(self.decryptor, Decryptor::Traditional(_))
    }

    fn rewind(&mut self) -> Result<()> {
        crate::io::seek_to(self.source.as_mut(), self.payload_start)?;
        self.decryptor.rewind_to_start();
        self.compressed_position = 0;
        self.uncompressed_position = 0;
        self.input_pos = 0;
        self.input_len = 0;
        if self.entry_snapshot.compression_method == 8 {
            self.inflate = Some(Decompress::new(false));
        }
        Ok(())
    }

    /// Produces up to `out.len()` plaintext bytes from the compressed
    /// stream, returning 0 only at true end of stream.
    fn fill(&mut self, out: &mut [u8]) -> Result<usize> {
        match self.entry_snapshot.compression_method {
            0 => {
                let avail = (self.compressed_len - self.compressed_position).min(out.len() as u64) as usize;
                if avail == 0 {
                    return Ok(0);
                }
                self.source.read_exact(&mut out[..avail])?;
                self.decryptor.decrypt(&mut out[..avail]);
                self.compressed_position += avail as u64;
                Ok(avail)
            }
            8 => self.fill_deflated(out),
            other => Err(Error::unsupported(format!("compression method {other}"))),
        }
    }

    fn fill_deflated(&mut self, out: &mut [u8]) -> Result<usize> {
        let inflate = self.inflate.as_mut().expect("deflate entries always carry an inflator");
        loop {
            if self.input_pos == self.input_len && self.compressed_position < self.compressed_len {
                let want = ((self.compressed_len - self.compressed_position) as usize).min(self.input_buf.len());
                self.source.read_exact(&mut self.input_buf[..want])?;
                self.decryptor.decrypt(&mut self.input_buf[..want]);
                self.compressed_position += want as u64;
                self.input_pos = 0;
                self.input_len = want;
            }

            let before_in = inflate.total_in();
            let before_out = inflate.total_out();
            let status = inflate
                .decompress(&self.input_buf[self.input_pos..self.input_len], out, FlushDecompress::None)
                .map_err(|e| Error::corrupt(format!("deflate stream error: {e}")))?;
            self.input_pos += (inflate.total_in() - before_in) as usize;
            let produced = (inflate.total_out() - before_out) as usize;
            if produced > 0 {
                return Ok(produced);
            }
            if status == Status::StreamEnd {
                return Ok(0);
            }
            if self.input_pos == self.input_len && self.compressed_position >= self.compressed_len {
                return Ok(0);
            }
        }
    }

    /// An independent handle onto the same entry, positioned at the start.
    pub fn duplicate(&self) -> Result<Self> {
        let mut source = self.source.duplicate()?;
        let snapshot = self.entry_snapshot.clone();
        let (decryptor, payload_start, compressed_len) = establish(source.as_mut(), &snapshot, &self.password)?;
        crate::io::seek_to(source.as_mut(), payload_start)?;
        Ok(Self {
            source,
            password: self.password.clone(),
            entry_snapshot: snapshot,
            decryptor,
            payload_start,
            compressed_len,
            compressed_position: 0,
            uncompressed_position: 0,
            inflate: if self.entry_snapshot.compression_method == 8 {
                Some(Decompress::new(false))
            } else {
                None
            },
            input_buf: vec![0u8; REPLAY_CHUNK].into_boxed_slice(),
            input_pos: 0,
            input_len: 0,
        })
    }

    /// Releases the handle. A plain `drop` would do the same; this exists so
    /// callers have an explicit, named end to the handle's lifetime.
    pub fn destroy(self) {}
}

/// Derives keys (if any) and works out where the actual ciphertext/stored
/// payload begins and ends. For a traditional-cipher entry this reads and
/// checks the 12-byte header through `source`, leaving it positioned at the
/// payload start; the caller re-seeks there regardless, to cover the other
/// two cases.
fn establish(
    source: &mut dyn ByteSource,
    snapshot: &EntrySnapshot,
    password: &[u8],
) -> Result<(Decryptor, u64, u64)> {
    if let Some(strength) = snapshot.aes_strength {
        let salt_len = AesSession::salt_len(strength)?;
        let overhead = salt_len as u64 + 2 + 10;
        let session = AesSession::establish(strength, &snapshot.aes_salt, snapshot.aes_verifier, password)?;
        return Ok((
            Decryptor::Aes(session),
            snapshot.data_offset,
            snapshot.compressed_size.saturating_sub(overhead),
        ));
    }
    if snapshot.general_purpose_bits & format::GP_IS_ENCRYPTED != 0 {
        let verifier = if snapshot.general_purpose_bits & format::GP_HAS_DATA_DESCRIPTOR != 0 {
            (snapshot.dos_mod_time.1 >> 8) as u8
        } else {
            (snapshot.crc32 >> 24) as u8
        };
        crate::io::seek_to(source, snapshot.data_offset)?;
        let session = TraditionalSession::establish(source, password, verifier)?;
        return Ok((Decryptor::Traditional(session), snapshot.data_offset + 12, snapshot.compressed_size - 12));
    }
    Ok((Decryptor::None, snapshot.data_offset, snapshot.compressed_size))
}
