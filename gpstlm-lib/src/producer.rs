use std::sync::atomic::{AtomicU16, Ordering};

use tracing::trace;

use crate::catalogue::{Message, PacketId, Payload};
use crate::packet::encode_frame;
use crate::{Error, Result};

/// Per-sender packet sequence counter.
///
/// Wraps modulo 2^16. Safe to share between producers feeding one transport.
#[derive(Debug, Default)]
pub struct SequenceCounter(AtomicU16);

impl SequenceCounter {
    #[must_use]
    pub fn new(start: u16) -> Self {
        SequenceCounter(AtomicU16::new(start))
    }

    /// Take the next sequence count.
    pub fn next(&self) -> u16 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    /// The count the next frame will carry.
    #[must_use]
    pub fn peek(&self) -> u16 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Encodes messages into frames for one transport.
///
/// # Example
/// ```
/// use gpstlm::catalogue::{CommandAck, Message, PacketId};
/// use gpstlm::Producer;
///
/// let producer = Producer::default();
/// let ack = Message::from(CommandAck { command_id: 7, command_count: 3 });
/// let first = producer.submit(PacketId::CommandAck, &ack).unwrap();
/// let second = producer.submit(PacketId::CommandAck, &ack).unwrap();
/// assert_eq!(first.len(), 14);
/// assert_eq!(&first[2..4], &[0, 0]);
/// assert_eq!(&second[2..4], &[0, 1]);
/// ```
#[derive(Debug, Default)]
pub struct Producer {
    sequence: SequenceCounter,
}

impl Producer {
    #[must_use]
    pub fn with_sequence(start: u16) -> Self {
        Producer {
            sequence: SequenceCounter::new(start),
        }
    }

    /// Encode `message` under `packet_id` and return the frame bytes ready for transport.
    ///
    /// # Errors
    /// [Error::PacketIdMismatch] if `message` is not the record `packet_id` names.
    pub fn submit(&self, packet_id: PacketId, message: &Message) -> Result<Vec<u8>> {
        if message.packet_id() != packet_id {
            return Err(Error::PacketIdMismatch {
                expected: packet_id,
                actual: message.packet_id(),
            });
        }
        self.frame(packet_id, &message.encode())
    }

    /// Encode a statically typed record under its own packet id.
    ///
    /// # Errors
    /// Never for catalogue records; the signature matches [Producer::submit].
    pub fn send<P: Payload>(&self, message: &P) -> Result<Vec<u8>> {
        self.frame(P::ID, &message.encode())
    }

    fn frame(&self, id: PacketId, payload: &[u8]) -> Result<Vec<u8>> {
        let seq = self.sequence.next();
        trace!(%id, seq, len = payload.len(), "encoding frame");
        encode_frame(id.apid(), seq, payload)
    }

    #[must_use]
    pub fn sequence(&self) -> &SequenceCounter {
        &self.sequence
    }
}
