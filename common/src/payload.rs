//! The record format shared by the event producer and every monitor.
//!
//! A record is a fixed-width meta header immediately followed by the
//! payload it describes:
//!
//! ```text
//! record         := meta payload
//! meta           := size:u32
//! payload        := lost:u64 cpu:i32 kind:i32 data
//! data           := size - 16 opaque bytes
//! ```
//!
//! Every scalar is little-endian. `data` carries no length of its own;
//! whatever remains past the payload header is data, and the reader
//! already knows how much that is from `size`.

use std::io;

use byteorder::{ByteOrder, LittleEndian};
use speedy::{Readable, Writable};

/// Number of bytes `Meta` occupies on the wire.
pub const META_SIZE: usize = 4;

/// Number of bytes the fixed part of `Payload` occupies on the wire.
pub const PAYLOAD_HEADER_SIZE: usize = 16;

/// Describes the byte length of the payload which follows it on the wire.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug, Readable, Writable)]
pub struct Meta {
    pub size: u32,
}

impl Meta {
    #[inline]
    pub fn marshal(&self) -> [u8; META_SIZE] {
        let mut buffer = [0; META_SIZE];
        LittleEndian::write_u32(&mut buffer, self.size);
        buffer
    }

    pub fn unmarshal(&mut self, buffer: &[u8]) -> io::Result<()> {
        if buffer.len() != META_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "invalid meta header: expected {} bytes, got {}",
                    META_SIZE,
                    buffer.len()
                ),
            ));
        }

        self.size = LittleEndian::read_u32(buffer);
        Ok(())
    }
}

/// A single event as pulled out of the kernel's per-CPU buffers.
///
/// `data` is opaque at this layer; `kind` tells downstream consumers how
/// to interpret it and is never branched on here.
#[derive(Clone, PartialEq, Eq, Default, Debug, Readable, Writable)]
pub struct Payload {
    pub data: Vec<u8>,
    pub lost: u64,
    pub cpu: i32,
    pub kind: i32,
}

impl Payload {
    pub fn new(data: Vec<u8>, lost: u64, cpu: i32, kind: i32) -> Self {
        Payload {
            data,
            lost,
            cpu,
            kind,
        }
    }

    /// Total number of bytes `encode` will produce.
    #[inline]
    pub fn encoded_size(&self) -> usize {
        PAYLOAD_HEADER_SIZE + self.data.len()
    }

    pub fn encode(&self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.encode_into(&mut buffer)?;
        Ok(buffer)
    }

    /// Encodes into `buffer`, discarding its previous contents while
    /// reusing its capacity.
    pub fn encode_into(&self, buffer: &mut Vec<u8>) -> io::Result<()> {
        if self.data.len() > std::u32::MAX as usize - PAYLOAD_HEADER_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "payload data is too long to frame",
            ));
        }

        let mut header = [0; PAYLOAD_HEADER_SIZE];
        LittleEndian::write_u64(&mut header[0..8], self.lost);
        LittleEndian::write_i32(&mut header[8..12], self.cpu);
        LittleEndian::write_i32(&mut header[12..16], self.kind);

        buffer.clear();
        buffer.reserve(self.encoded_size());
        buffer.extend_from_slice(&header);
        buffer.extend_from_slice(&self.data);
        Ok(())
    }

    /// Decodes an encoded payload, fully overwriting `self`.
    ///
    /// Everything past the fixed header is treated as `data` and is
    /// copied out of `buffer`; the decoded value never aliases it.
    pub fn decode(&mut self, buffer: &[u8]) -> io::Result<()> {
        if buffer.len() < PAYLOAD_HEADER_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "truncated payload header: expected at least {} bytes, got {}",
                    PAYLOAD_HEADER_SIZE,
                    buffer.len()
                ),
            ));
        }

        self.lost = LittleEndian::read_u64(&buffer[0..8]);
        self.cpu = LittleEndian::read_i32(&buffer[8..12]);
        self.kind = LittleEndian::read_i32(&buffer[12..16]);
        self.data.clear();
        self.data.extend_from_slice(&buffer[PAYLOAD_HEADER_SIZE..]);
        Ok(())
    }
}
