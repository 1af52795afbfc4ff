//! Extra-field walking: `(id: u16, len: u16, payload[len])` triples.
use crate::error::Result;
use crate::io::{read_all, read_u16_le};

#[derive(Debug, Clone, Default)]
pub(crate) struct ExtraFields(Vec<u8>);

impl ExtraFields {
    pub(crate) fn new<R: std::io::Read + ?Sized>(r: &mut R, len: usize) -> Result<Self> {
        Ok(Self(read_all(r, len)?))
    }

    /// Walks the `(id, len, payload)` triples until `field_id` is found or
    /// the declared length is exhausted.
    pub(crate) fn field_data(&self, field_id: u16) -> Option<&[u8]> {
        let mut rest: &[u8] = &self.0;
        loop {
            if rest.len() < 4 {
                return None;
            }
            let id = read_u16_le(&mut rest).ok()?;
            let len = usize::from(read_u16_le(&mut rest).ok()?);
            if rest.len() < len {
                return None;
            }
            let (payload, tail) = rest.split_at(len);
            if id == field_id {
                return Some(payload);
            }
            rest = tail;
        }
    }
}
