use std::fmt::Display;

use crate::catalogue::{Apid, PacketId};
use crate::{Error, Result};

/// Packet header
///
/// Precedes every payload on the wire: packet id, sequence count and payload length, each a
/// big-endian `u16`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PacketHeader {
    /// Raw packet id. See [PacketHeader::packet_id] for the catalogue entry.
    pub apid: Apid,
    /// Per-sender counter, wraps modulo 2^16.
    pub sequence_count: u16,
    /// Number of payload bytes following the header.
    pub payload_length: u16,
}

impl PacketHeader {
    /// Size of an encoded ``PacketHeader``
    pub const LEN: usize = 6;

    /// Resolve the header's packet id against the catalogue.
    ///
    /// # Errors
    /// [Error::UnknownPacketId] if the id is not in the catalogue.
    pub fn packet_id(&self) -> Result<PacketId> {
        PacketId::try_from(self.apid)
    }

    #[must_use]
    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..2].copy_from_slice(&self.apid.to_be_bytes());
        buf[2..4].copy_from_slice(&self.sequence_count.to_be_bytes());
        buf[4..6].copy_from_slice(&self.payload_length.to_be_bytes());
        buf
    }

    /// Decode from the first [PacketHeader::LEN] bytes of `buf`.
    ///
    /// # Errors
    /// [Error::MalformedHeader] if there are not enough bytes.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::LEN {
            return Err(Error::MalformedHeader {
                actual: buf.len(),
                minimum: Self::LEN,
            });
        }
        Ok(PacketHeader {
            apid: u16::from_be_bytes([buf[0], buf[1]]),
            sequence_count: u16::from_be_bytes([buf[2], buf[3]]),
            payload_length: u16::from_be_bytes([buf[4], buf[5]]),
        })
    }
}

/// Encode a header for a payload of `len` bytes.
///
/// # Errors
/// [Error::PayloadTooLarge] if `len` does not fit in 16 bits.
pub fn encode_header(id: Apid, seq: u16, len: usize) -> Result<[u8; PacketHeader::LEN]> {
    let payload_length = u16::try_from(len).map_err(|_| Error::PayloadTooLarge {
        size: len,
        max: u16::MAX as usize,
    })?;
    Ok(PacketHeader {
        apid: id,
        sequence_count: seq,
        payload_length,
    }
    .encode())
}

/// Decode a header from the front of `buf`.
///
/// # Errors
/// [Error::MalformedHeader] if there are fewer than [PacketHeader::LEN] bytes.
pub fn decode_header(buf: &[u8]) -> Result<PacketHeader> {
    PacketHeader::decode(buf)
}

/// A single header-plus-payload unit as transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    pub header: PacketHeader,
    /// Payload bytes only; `header.payload_length` bytes long.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Total bytes on the wire.
    #[must_use]
    pub fn wire_len(&self) -> usize {
        PacketHeader::LEN + self.payload.len()
    }

    /// Re-encode this frame exactly as it was received.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_len());
        buf.extend_from_slice(&self.header.encode());
        buf.extend_from_slice(&self.payload);
        buf
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Frame{{header: {:?}, payload:[len={}]}}",
            self.header,
            self.payload.len()
        )
    }
}

/// Encode `payload` into a complete frame.
///
/// The caller owns the sequence count and must advance it per send.
///
/// # Errors
/// [Error::PayloadTooLarge] if the payload does not fit a 16-bit length.
///
/// # Example
/// ```
/// use gpstlm::packet::{encode_frame, decode_stream};
/// use gpstlm::catalogue::{CommandAck, Payload, MAX_PAYLOAD_LEN};
///
/// let ack = CommandAck { command_id: 7, command_count: 3 };
/// let dat = encode_frame(CommandAck::ID.apid(), 1, &ack.encode()).unwrap();
///
/// let (frame, consumed) = decode_stream(&dat, MAX_PAYLOAD_LEN).unwrap().unwrap();
/// assert_eq!(consumed, dat.len());
/// assert_eq!(CommandAck::decode(&frame.payload).unwrap(), ack);
/// ```
pub fn encode_frame(id: Apid, sequence_count: u16, payload: &[u8]) -> Result<Vec<u8>> {
    let header = encode_header(id, sequence_count, payload.len())?;
    let mut buf = Vec::with_capacity(PacketHeader::LEN + payload.len());
    buf.extend_from_slice(&header);
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Attempt to peel one frame off the front of `buf`.
///
/// Returns `Ok(None)` when more bytes are needed; nothing is consumed. On success returns the
/// frame and the number of bytes it occupied, which the caller removes from its buffer.
///
/// This never resynchronizes: a header length above `max_payload` is reported as
/// [Error::Desync] and recovery is left to the caller (see [crate::stream::FrameDecoder]).
///
/// # Errors
/// [Error::Desync] if the header length exceeds `max_payload`.
pub fn decode_stream(buf: &[u8], max_payload: usize) -> Result<Option<(Frame, usize)>> {
    let header = match PacketHeader::decode(buf) {
        Ok(header) => header,
        Err(Error::MalformedHeader { .. }) => return Ok(None),
        Err(err) => return Err(err),
    };
    let length = header.payload_length as usize;
    if length > max_payload {
        return Err(Error::Desync {
            length,
            max: max_payload,
        });
    }
    let total = PacketHeader::LEN + length;
    if buf.len() < total {
        return Ok(None);
    }
    let frame = Frame {
        header,
        payload: buf[PacketHeader::LEN..total].to_vec(),
    };
    Ok(Some((frame, total)))
}
