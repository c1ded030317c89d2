//! Wire protocol: frames, typed server/client messages and chunk snapshots.
#![forbid(unsafe_code)]

mod frame;
mod message;
mod snapshot;
mod transport;

pub use frame::{FrameError, FrameReader, MAX_FRAME, encode_frame};
pub use message::{ClientMessage, DecodeError, MAX_NAME_LEN, PROTOCOL_VERSION, ServerMessage};
pub use snapshot::{SnapshotError, inflate_snapshot};
pub use transport::{ChannelTransport, Transport};
