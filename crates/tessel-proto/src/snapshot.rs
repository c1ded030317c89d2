use std::fmt;

use miniz_oxide::inflate::{TINFLStatus, decompress_to_vec_with_limit};

#[derive(Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// The stream inflates to more bytes than the target holds.
    TooLarge,
    Corrupt(TINFLStatus),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::TooLarge => write!(f, "snapshot inflates past the chunk size"),
            SnapshotError::Corrupt(s) => write!(f, "snapshot is not a valid deflate stream ({s:?})"),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Inflates a raw-deflate `payload` into `out`, zero-filling any remainder.
///
/// On error `out` is left untouched. Returns the number of inflated bytes.
pub fn inflate_snapshot(payload: &[u8], out: &mut [u8]) -> Result<usize, SnapshotError> {
    // One spare byte tells an exact fit apart from an overflow.
    let bytes = match decompress_to_vec_with_limit(payload, out.len() + 1) {
        Ok(bytes) => bytes,
        Err(e) if e.status == TINFLStatus::HasMoreOutput => return Err(SnapshotError::TooLarge),
        Err(e) => return Err(SnapshotError::Corrupt(e.status)),
    };
    if bytes.len() > out.len() {
        return Err(SnapshotError::TooLarge);
    }
    let n = bytes.len();
    out[..n].copy_from_slice(&bytes);
    out[n..].fill(0);
    Ok(n)
}
