use std::fmt;
use std::str::FromStr;

use tessel_chunk::{ChunkCoord, MAX_CHUNK_COORD, MAX_VOXEL_COORD};

use crate::encode_frame;

/// Handshake version sent as `V,<n>`.
pub const PROTOCOL_VERSION: i32 = 2;

/// Longest player name kept from an `N` message, in bytes.
pub const MAX_NAME_LEN: usize = 31;

/// Offset of the deflate stream inside a binary chunk snapshot.
const SNAPSHOT_HEADER: usize = 25;

/// Event decoded from one server frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerMessage {
    /// Binary `C`: raw-deflate voxels for one chunk.
    Chunk { coord: ChunkCoord, payload: Vec<u8> },
    /// `U`: our own id and spawn pose.
    Identity { id: i32, x: f32, y: f32, z: f32, rx: f32, ry: f32 },
    Block { x: i32, y: i32, z: i32, w: u8 },
    Light { x: i32, y: i32, z: i32, w: u8 },
    Position { id: i32, x: f32, y: f32, z: f32, rx: f32, ry: f32 },
    Disconnect { id: i32 },
    Time { elapsed: f64, day_length: i32 },
    Talk(String),
    Nick { id: i32, name: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    Empty,
    UnknownTag(u8),
    Truncated { tag: char, len: usize },
    NotUtf8(char),
    MissingField { tag: char, field: &'static str },
    BadField { tag: char, field: &'static str },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "empty message"),
            DecodeError::UnknownTag(t) => write!(f, "unknown tag 0x{t:02x}"),
            DecodeError::Truncated { tag, len } => write!(f, "'{tag}' message truncated at {len} bytes"),
            DecodeError::NotUtf8(tag) => write!(f, "'{tag}' message is not valid UTF-8"),
            DecodeError::MissingField { tag, field } => write!(f, "'{tag}' message missing {field}"),
            DecodeError::BadField { tag, field } => write!(f, "'{tag}' message has malformed {field}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Comma-separated fields after the tag.
struct Fields<'a> {
    tag: char,
    rest: std::str::Split<'a, char>,
}

impl Fields<'_> {
    fn next<T: FromStr>(&mut self, field: &'static str) -> Result<T, DecodeError> {
        let raw = self.rest.next().ok_or(DecodeError::MissingField { tag: self.tag, field })?;
        raw.trim()
            .parse()
            .map_err(|_| DecodeError::BadField { tag: self.tag, field })
    }

    /// A world voxel coordinate inside the addressable range.
    fn voxel(&mut self, field: &'static str) -> Result<i32, DecodeError> {
        let v: i32 = self.next(field)?;
        if v.unsigned_abs() > MAX_VOXEL_COORD.unsigned_abs() {
            return Err(DecodeError::BadField { tag: self.tag, field });
        }
        Ok(v)
    }

    /// A finite world position component inside the addressable range.
    fn position(&mut self, field: &'static str) -> Result<f32, DecodeError> {
        let v: f32 = self.next(field)?;
        if !v.is_finite() || v.abs() > MAX_VOXEL_COORD as f32 {
            return Err(DecodeError::BadField { tag: self.tag, field });
        }
        Ok(v)
    }

    fn finite<T: FromStr + Into<f64> + Copy>(&mut self, field: &'static str) -> Result<T, DecodeError> {
        let v: T = self.next(field)?;
        if !v.into().is_finite() {
            return Err(DecodeError::BadField { tag: self.tag, field });
        }
        Ok(v)
    }
}

fn be_i32(bytes: &[u8], tag: char, field: &'static str) -> Result<i32, DecodeError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| DecodeError::BadField { tag, field })?;
    let v = i64::from_be_bytes(raw);
    if v.unsigned_abs() > u64::from(MAX_CHUNK_COORD.unsigned_abs()) {
        return Err(DecodeError::BadField { tag, field });
    }
    Ok(v as i32)
}

impl ServerMessage {
    pub fn decode(frame: &[u8]) -> Result<Self, DecodeError> {
        let &tag = frame.first().ok_or(DecodeError::Empty)?;
        if tag == b'C' {
            return Self::decode_snapshot(frame);
        }
        let tag = tag as char;
        if !matches!(tag, 'U' | 'B' | 'L' | 'P' | 'D' | 'E' | 'T' | 'N') {
            return Err(DecodeError::UnknownTag(frame[0]));
        }
        if frame.get(1) != Some(&b',') {
            return Err(DecodeError::Truncated { tag, len: frame.len() });
        }
        let body = std::str::from_utf8(&frame[2..]).map_err(|_| DecodeError::NotUtf8(tag))?;
        if tag == 'T' {
            return Ok(ServerMessage::Talk(body.to_string()));
        }
        let mut f = Fields {
            tag,
            rest: body.split(','),
        };
        let msg = match tag {
            'U' => ServerMessage::Identity {
                id: f.next("id")?,
                x: f.position("x")?,
                y: f.position("y")?,
                z: f.position("z")?,
                rx: f.finite("rx")?,
                ry: f.finite("ry")?,
            },
            'B' => ServerMessage::Block {
                x: f.voxel("x")?,
                y: f.voxel("y")?,
                z: f.voxel("z")?,
                w: f.next("w")?,
            },
            'L' => ServerMessage::Light {
                x: f.voxel("x")?,
                y: f.voxel("y")?,
                z: f.voxel("z")?,
                w: f.next("w")?,
            },
            'P' => ServerMessage::Position {
                id: f.next("id")?,
                x: f.position("x")?,
                y: f.position("y")?,
                z: f.position("z")?,
                rx: f.finite("rx")?,
                ry: f.finite("ry")?,
            },
            'D' => ServerMessage::Disconnect { id: f.next("id")? },
            'E' => ServerMessage::Time {
                elapsed: f.finite("elapsed")?,
                day_length: f.next("day_length")?,
            },
            _ => {
                let id = f.next("id")?;
                // The name is the first whitespace-free token of the remaining text.
                let rest = body.split_once(',').map(|(_, r)| r).unwrap_or("");
                let token = rest
                    .split_whitespace()
                    .next()
                    .ok_or(DecodeError::MissingField { tag, field: "name" })?;
                ServerMessage::Nick {
                    id,
                    name: truncate(token, MAX_NAME_LEN).to_string(),
                }
            }
        };
        Ok(msg)
    }

    fn decode_snapshot(frame: &[u8]) -> Result<Self, DecodeError> {
        if frame.len() < SNAPSHOT_HEADER {
            return Err(DecodeError::Truncated {
                tag: 'C',
                len: frame.len(),
            });
        }
        let coord = ChunkCoord::new(
            be_i32(&frame[1..9], 'C', "p")?,
            be_i32(&frame[9..17], 'C', "q")?,
            be_i32(&frame[17..25], 'C', "r")?,
        );
        Ok(ServerMessage::Chunk {
            coord,
            payload: frame[SNAPSHOT_HEADER..].to_vec(),
        })
    }

    /// Encodes a binary chunk snapshot frame body around an already-deflated payload.
    pub fn snapshot_frame(coord: ChunkCoord, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(SNAPSHOT_HEADER + payload.len());
        out.push(b'C');
        for v in [coord.cx, coord.cy, coord.cz] {
            out.extend_from_slice(&i64::from(v).to_be_bytes());
        }
        out.extend_from_slice(payload);
        out
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Message the client sends to the authority.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientMessage {
    Version(i32),
    Login { username: String, token: String },
    Position { x: f32, y: f32, z: f32, rx: f32, ry: f32 },
    ChunkRequest(ChunkCoord),
    Block { x: i32, y: i32, z: i32, w: u8 },
    Light { x: i32, y: i32, z: i32, w: u8 },
    Talk(String),
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::Version(v) => write!(f, "V,{v}"),
            ClientMessage::Login { username, token } => write!(f, "A,{username},{token}"),
            ClientMessage::Position { x, y, z, rx, ry } => {
                write!(f, "P,{x:.2},{y:.2},{z:.2},{rx:.2},{ry:.2}")
            }
            ClientMessage::ChunkRequest(c) => write!(f, "C,{},{},{}", c.cx, c.cy, c.cz),
            ClientMessage::Block { x, y, z, w } => write!(f, "B,{x},{y},{z},{w}"),
            ClientMessage::Light { x, y, z, w } => write!(f, "L,{x},{y},{z},{w}"),
            ClientMessage::Talk(text) => write!(f, "T,{text}"),
        }
    }
}

impl ClientMessage {
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Encoded body with its length prefix.
    pub fn to_frame(&self) -> Vec<u8> {
        encode_frame(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_messages_decode() {
        assert_eq!(
            ServerMessage::decode(b"B,5,10,-5,3"),
            Ok(ServerMessage::Block { x: 5, y: 10, z: -5, w: 3 })
        );
        assert_eq!(
            ServerMessage::decode(b"U,7,1.5,0,-2,0.25,0"),
            Ok(ServerMessage::Identity { id: 7, x: 1.5, y: 0.0, z: -2.0, rx: 0.25, ry: 0.0 })
        );
        assert_eq!(
            ServerMessage::decode(b"E,1234.5,600"),
            Ok(ServerMessage::Time { elapsed: 1234.5, day_length: 600 })
        );
        assert_eq!(
            ServerMessage::decode(b"T,hi, there"),
            Ok(ServerMessage::Talk("hi, there".into()))
        );
        assert_eq!(ServerMessage::decode(b"D,9"), Ok(ServerMessage::Disconnect { id: 9 }));
    }

    #[test]
    fn nick_takes_first_token_and_truncates() {
        let long = format!("N,3,{} trailing", "a".repeat(40));
        match ServerMessage::decode(long.as_bytes()) {
            Ok(ServerMessage::Nick { id, name }) => {
                assert_eq!(id, 3);
                assert_eq!(name.len(), MAX_NAME_LEN);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(ServerMessage::decode(b"N,3,").is_err());
    }

    #[test]
    fn malformed_messages_are_errors() {
        assert_eq!(ServerMessage::decode(b""), Err(DecodeError::Empty));
        assert_eq!(ServerMessage::decode(b"Z,1"), Err(DecodeError::UnknownTag(b'Z')));
        assert_eq!(
            ServerMessage::decode(b"B,1,2"),
            Err(DecodeError::MissingField { tag: 'B', field: "z" })
        );
        assert_eq!(
            ServerMessage::decode(b"B,1,2,3,999"),
            Err(DecodeError::BadField { tag: 'B', field: "w" })
        );
        assert_eq!(ServerMessage::decode(b"Cshort"), Err(DecodeError::Truncated { tag: 'C', len: 6 }));
        assert_eq!(ServerMessage::decode(b"P"), Err(DecodeError::Truncated { tag: 'P', len: 1 }));
    }

    #[test]
    fn out_of_range_values_are_bad_fields() {
        assert_eq!(
            ServerMessage::decode(b"U,1,0,inf,0,0,0"),
            Err(DecodeError::BadField { tag: 'U', field: "y" })
        );
        assert_eq!(
            ServerMessage::decode(b"P,2,NaN,0,0,0,0"),
            Err(DecodeError::BadField { tag: 'P', field: "x" })
        );
        assert_eq!(
            ServerMessage::decode(b"P,2,0,0,1e30,0,0"),
            Err(DecodeError::BadField { tag: 'P', field: "z" })
        );
        assert_eq!(
            ServerMessage::decode(b"U,1,0,0,0,-inf,0"),
            Err(DecodeError::BadField { tag: 'U', field: "rx" })
        );
        assert_eq!(
            ServerMessage::decode(b"B,2147483647,0,0,1"),
            Err(DecodeError::BadField { tag: 'B', field: "x" })
        );
        assert_eq!(
            ServerMessage::decode(b"L,0,0,-2147483648,15"),
            Err(DecodeError::BadField { tag: 'L', field: "z" })
        );
        assert_eq!(
            ServerMessage::decode(b"E,inf,600"),
            Err(DecodeError::BadField { tag: 'E', field: "elapsed" })
        );
        let far = ServerMessage::snapshot_frame(ChunkCoord::new(MAX_CHUNK_COORD + 1, 0, 0), &[]);
        assert_eq!(ServerMessage::decode(&far), Err(DecodeError::BadField { tag: 'C', field: "p" }));
        let edge = ServerMessage::snapshot_frame(ChunkCoord::new(-MAX_CHUNK_COORD, 0, 0), &[]);
        assert!(ServerMessage::decode(&edge).is_ok());
    }

    #[test]
    fn snapshot_header_is_big_endian() {
        let frame = ServerMessage::snapshot_frame(ChunkCoord::new(-3, 2, 70000), &[1, 2, 3]);
        assert_eq!(frame.len(), 28);
        assert_eq!(&frame[9..17], &[0, 0, 0, 0, 0, 0, 0, 2]);
        assert_eq!(
            ServerMessage::decode(&frame),
            Ok(ServerMessage::Chunk {
                coord: ChunkCoord::new(-3, 2, 70000),
                payload: vec![1, 2, 3]
            })
        );
    }

    #[test]
    fn client_messages_encode_as_text() {
        let p = ClientMessage::Position { x: 1.0, y: 2.5, z: -3.0, rx: 0.5, ry: 0.0 };
        assert_eq!(p.to_string(), "P,1.00,2.50,-3.00,0.50,0.00");
        assert_eq!(ClientMessage::Version(PROTOCOL_VERSION).to_string(), "V,2");
        assert_eq!(ClientMessage::ChunkRequest(ChunkCoord::new(1, 0, -2)).to_string(), "C,1,0,-2");
        let frame = ClientMessage::Talk("hey".into()).to_frame();
        assert_eq!(frame, [&[0, 0, 0, 5][..], b"T,hey"].concat());
    }
}
