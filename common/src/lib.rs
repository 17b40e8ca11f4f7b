pub extern crate speedy;

#[macro_use]
extern crate speedy_derive;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod payload;
pub mod stream;

pub use crate::payload::{Meta, Payload, META_SIZE, PAYLOAD_HEADER_SIZE};
pub use crate::stream::{read_meta_payload, write_meta_payload, RecordIter};
