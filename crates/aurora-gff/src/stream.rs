//! Stream helpers shared by the decoders
//!
//! All multi-byte integers in the GFF body are little-endian. Strings are
//! raw single-byte text; bytes are mapped one-to-one onto chars (Latin-1)
//! so no input byte is ever rejected or lost.

use std::io::{self, Read, Seek, SeekFrom};
use std::ops::{Deref, DerefMut};
use tracing::{trace, warn};

/// Seek that restores the saved cursor position when dropped.
///
/// Restoration happens on every exit path, including when the payload read
/// through the guard fails.
pub(crate) struct ScopedSeek<'a, R: Seek + ?Sized> {
    stream: &'a mut R,
    saved: u64,
}

impl<'a, R: Seek + ?Sized> ScopedSeek<'a, R> {
    /// Save the current position and move to `target`
    pub(crate) fn new(stream: &'a mut R, target: u64) -> io::Result<Self> {
        let saved = stream.stream_position()?;
        if let Err(e) = stream.seek(SeekFrom::Start(target)) {
            let _ = stream.seek(SeekFrom::Start(saved));
            return Err(e);
        }
        trace!(from = saved, to = target, "scoped seek");
        Ok(Self { stream, saved })
    }
}

impl<R: Seek + ?Sized> Deref for ScopedSeek<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.stream
    }
}

impl<R: Seek + ?Sized> DerefMut for ScopedSeek<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.stream
    }
}

impl<R: Seek + ?Sized> Drop for ScopedSeek<'_, R> {
    fn drop(&mut self) {
        if let Err(e) = self.stream.seek(SeekFrom::Start(self.saved)) {
            warn!(position = self.saved, error = %e, "failed to restore stream position");
        }
    }
}

pub(crate) fn read_u8<R: Read + ?Sized>(reader: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_u32_le<R: Read + ?Sized>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_u64_le<R: Read + ?Sized>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub(crate) fn read_f32_le<R: Read + ?Sized>(reader: &mut R) -> io::Result<f32> {
    read_u32_le(reader).map(f32::from_bits)
}

pub(crate) fn read_f32_array<R: Read + ?Sized, const N: usize>(
    reader: &mut R,
) -> io::Result<[f32; N]> {
    let mut out = [0f32; N];
    for value in &mut out {
        *value = read_f32_le(reader)?;
    }
    Ok(out)
}

/// Read `len` raw bytes as text
pub(crate) fn read_text<R: Read + ?Sized>(reader: &mut R, len: usize) -> io::Result<String> {
    let buf = read_bounded(reader, len as u64)?;
    if buf.len() < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "string shorter than its declared length",
        ));
    }
    Ok(latin1(&buf))
}

/// Read up to `limit` bytes, stopping early at end of stream
pub(crate) fn read_bounded<R: Read + ?Sized>(reader: &mut R, limit: u64) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(limit.min(64 * 1024) as usize);
    reader.take(limit).read_to_end(&mut buf)?;
    Ok(buf)
}

pub(crate) fn latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Logical label from a fixed 16-byte slot: cut at the first NUL, trailing
/// spaces removed.
pub(crate) fn label_from_slot(slot: &[u8]) -> String {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    let mut label = latin1(&slot[..end]);
    label.truncate(label.trim_end_matches(' ').len());
    label
}
