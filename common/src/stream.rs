//! Sequencing of records onto and off of byte streams.
//!
//! The codec itself is stateless; all of the state lives in the values it
//! is given and in the sink/source. Writes and reads block exactly as
//! long as the underlying stream blocks. A sink or source shared between
//! threads must be locked around each whole call, never around the two
//! halves of a record separately.

use std::io;

use crate::payload::{Meta, Payload, META_SIZE};

// Like `read_exact`, except a stream which runs dry is reported through
// the returned count instead of an error.
fn fill_buffer<F: io::Read>(fp: &mut F, buffer: &mut [u8]) -> io::Result<usize> {
    let mut position = 0;
    while position < buffer.len() {
        match fp.read(&mut buffer[position..]) {
            Ok(0) => break,
            Ok(count) => position += count,
            Err(ref error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }

    Ok(position)
}

/// Writes a single record to `fp`.
///
/// The meta header is always derived from the payload's actual encoding,
/// so its `size` exactly matches the bytes which follow it; the derived
/// value is returned. The two segments are written back-to-back with no
/// locking of the sink here. A failed write leaves the sink torn; what to
/// do with it then is the stream owner's call.
pub fn write_meta_payload<F: io::Write>(fp: &mut F, payload: &Payload) -> io::Result<Meta> {
    let encoded = payload.encode()?;
    let meta = Meta {
        size: encoded.len() as u32,
    };

    fp.write_all(&meta.marshal())?;
    fp.write_all(&encoded)?;
    Ok(meta)
}

/// Reads a single record from `fp`.
///
/// Returns `Ok(None)` if the stream ended cleanly, that is with zero
/// bytes available at a record boundary. A stream which ends anywhere
/// inside a record fails with an `UnexpectedEof` error instead, and a
/// record whose meta announces fewer bytes than a payload header fails
/// with `InvalidData`.
pub fn read_meta_payload<F: io::Read>(fp: &mut F) -> io::Result<Option<(Meta, Payload)>> {
    let mut header = [0; META_SIZE];
    let count = fill_buffer(fp, &mut header)?;
    if count == 0 {
        return Ok(None);
    }
    if count < header.len() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stream ended in the middle of a meta header",
        ));
    }

    let mut meta = Meta { size: 0 };
    meta.unmarshal(&header)?;

    let mut buffer = vec![0; meta.size as usize];
    let count = fill_buffer(fp, &mut buffer)?;
    if count < buffer.len() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "stream ended in the middle of a payload: expected {} bytes, got {}",
                buffer.len(),
                count
            ),
        ));
    }

    let mut payload = Payload::default();
    payload.decode(&buffer)?;
    Ok(Some((meta, payload)))
}

/// Pull iterator over the records of a byte source.
///
/// Yields each decoded record in stream order, ends on clean stream
/// termination and yields at most one error, after which it is done.
pub struct RecordIter<F: io::Read> {
    fp: F,
    done: bool,
}

impl<F: io::Read> RecordIter<F> {
    pub fn new(fp: F) -> Self {
        RecordIter { fp, done: false }
    }

    pub fn into_inner(self) -> F {
        self.fp
    }
}

impl<F: io::Read> Iterator for RecordIter<F> {
    type Item = io::Result<(Meta, Payload)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match read_meta_payload(&mut self.fp) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
