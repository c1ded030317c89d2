use std::fmt;

use tessel_chunk::CHUNK_VOLUME;

/// Largest accepted frame body.
pub const MAX_FRAME: usize = 2 * CHUNK_VOLUME;

#[derive(Debug, PartialEq, Eq)]
pub enum FrameError {
    TooLarge(usize),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::TooLarge(n) => write!(f, "frame of {n} bytes exceeds limit of {MAX_FRAME}"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Prefixes `payload` with its 4-byte big-endian length.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 4);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Splits a byte stream into length-prefixed frames.
#[derive(Default)]
pub struct FrameReader {
    buf: Vec<u8>,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Next complete frame, if one is buffered.
    ///
    /// An oversized length means the stream is out of sync; everything buffered is dropped.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        let Some(header) = self.buf.first_chunk::<4>() else {
            return Ok(None);
        };
        let len = u32::from_be_bytes(*header) as usize;
        if len > MAX_FRAME {
            self.buf.clear();
            return Err(FrameError::TooLarge(len));
        }
        if self.buf.len() < len + 4 {
            return Ok(None);
        }
        let frame = self.buf[4..len + 4].to_vec();
        self.buf.drain(..len + 4);
        Ok(Some(frame))
    }
}
