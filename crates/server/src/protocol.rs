//! Binary frame envelope: one message-type byte, a little-endian `u32`
//! payload length, then the payload. Payloads above 1 MiB and unknown type
//! bytes are protocol errors that tear the client down.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub const DEFAULT_PORT: u16 = 5000;
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    RequestMap,
    MapData,
    PlayerMove,
    PlayerJoin,
    PlayerLeave,
    Error,
}

impl MessageType {
    pub fn as_byte(self) -> u8 {
        match self {
            Self::RequestMap => 1,
            Self::MapData => 2,
            Self::PlayerMove => 3,
            Self::PlayerJoin => 4,
            Self::PlayerLeave => 5,
            Self::Error => 255,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::RequestMap),
            2 => Some(Self::MapData),
            3 => Some(Self::PlayerMove),
            4 => Some(Self::PlayerJoin),
            5 => Some(Self::PlayerLeave),
            255 => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub message_type: MessageType,
    pub payload: Vec<u8>,
}

pub fn write_frame(
    writer: &mut impl Write,
    message_type: MessageType,
    payload: &[u8],
) -> io::Result<()> {
    if payload.len() > MAX_PAYLOAD_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("payload of {} bytes exceeds the 1 MiB cap", payload.len()),
        ));
    }
    writer.write_u8(message_type.as_byte())?;
    writer.write_u32::<LittleEndian>(payload.len() as u32)?;
    writer.write_all(payload)?;
    writer.flush()
}

pub fn read_frame(reader: &mut impl Read) -> io::Result<Frame> {
    let type_byte = reader.read_u8()?;
    let Some(message_type) = MessageType::from_byte(type_byte) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unknown message type {type_byte}"),
        ));
    };
    let length = reader.read_u32::<LittleEndian>()? as usize;
    if length > MAX_PAYLOAD_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("payload of {length} bytes exceeds the 1 MiB cap"),
        ));
    }
    let mut payload = vec![0; length];
    reader.read_exact(&mut payload)?;
    Ok(Frame { message_type, payload })
}
