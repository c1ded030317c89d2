//! Padded scratch volumes and decaying light propagation.
#![forbid(unsafe_code)]

mod flood;
mod volume;

pub use flood::FloodFill;
pub use volume::PaddedVolume;
