use crate::catalogue::{Apid, PacketId};

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Not enough bytes to decode a packet header. Recoverable by buffering more input.
    #[error("Malformed header: got {actual} bytes, need {minimum}")]
    MalformedHeader {
        /// Number of bytes we got
        actual: usize,
        /// Minimum number of expected bytes
        minimum: usize,
    },

    /// Payload is too large to be described by a 16-bit length field.
    #[error("Payload too large: {size} bytes, max {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Header payload length is outside sane bounds; frame boundaries are lost.
    #[error("Stream desynchronized: payload length {length} exceeds max {max}")]
    Desync { length: usize, max: usize },

    /// Header decoded cleanly but nothing is known about its packet id.
    #[error("Unknown packet id {0:#06x}")]
    UnknownPacketId(Apid),

    /// Header length does not match the fixed catalogue length for its packet id.
    #[error("Payload size mismatch for {id}: expected {expected} bytes, got {actual}")]
    PayloadSizeMismatch {
        id: PacketId,
        expected: usize,
        actual: usize,
    },

    /// A message was submitted under a packet id that names a different layout.
    #[error("Packet id mismatch: submitted as {expected}, message is {actual}")]
    PacketIdMismatch { expected: PacketId, actual: PacketId },

    /// Byte-at-a-time resynchronization gave up; the connection should be considered failed.
    #[error("Resynchronization failed after discarding {discarded} bytes")]
    ResyncExhausted { discarded: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors that mean the header's notion of the frame boundary can't be trusted.
    #[must_use]
    pub fn is_desync(&self) -> bool {
        matches!(self, Error::Desync { .. } | Error::PayloadSizeMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
