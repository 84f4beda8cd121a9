//! The closed catalogue of telemetry messages.
//!
//! Every message has a fixed binary layout: fields are packed big-endian in declaration order
//! with no padding, so a message's encoded length is a constant of its type ([Payload::LEN]).
//! Arrays are fixed capacity and sized by [MAX_CHANNELS] and [MAX_TASKS].
//!
//! Layouts are part of the wire contract. Adding a message means appending a new [PacketId]
//! and record; existing ids and layouts never change.
use std::fmt::Display;

use bytes::{Buf, BufMut};

use crate::{Error, Result};

/// Declares a catalogue record: a plain struct of fixed-width fields and its [Payload] impl.
macro_rules! message {
    (
        $(#[$meta:meta])*
        pub struct $name:ident = $id:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident: $ty:ty,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl $crate::catalogue::Payload for $name {
            const ID: $crate::catalogue::PacketId = $crate::catalogue::PacketId::$id;
            const LEN: usize = 0 $(+ <$ty as $crate::catalogue::Field>::WIDTH)*;

            fn put_fields(&self, buf: &mut Vec<u8>) {
                $( $crate::catalogue::Field::put(&self.$field, buf); )*
            }

            fn get_fields(buf: &mut &[u8]) -> Self {
                Self {
                    $( $field: $crate::catalogue::Field::get(buf), )*
                }
            }
        }
    };
}

mod command;
mod health;
mod measurement;
mod navigation;
mod orbit;

pub use command::*;
pub use health::*;
pub use measurement::*;
pub use navigation::*;
pub use orbit::*;

/// Raw 16-bit packet identifier as carried in a packet header.
pub type Apid = u16;

/// First APID assigned to this receiver's packets.
pub const APID_BASE: Apid = 0x0;

/// Number of hardware tracking channels.
pub const MAX_CHANNELS: usize = 12;

/// Number of receiver tasks reported in [TaskHealth].
pub const MAX_TASKS: usize = 16;

/// Identifies a catalogue entry. The wire value is `APID_BASE + ordinal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum PacketId {
    BoardHealth = 0,
    TaskHealth = 1,
    ChannelHealth = 2,
    Sps = 3,
    Clock = 4,
    SvPosition = 5,
    Ekf = 6,
    Measurement = 7,
    Pseudorange = 8,
    Ephemeris = 9,
    Almanac = 10,
    CommandAck = 11,
}

impl PacketId {
    /// All ids in ordinal order.
    pub const ALL: [PacketId; 12] = [
        PacketId::BoardHealth,
        PacketId::TaskHealth,
        PacketId::ChannelHealth,
        PacketId::Sps,
        PacketId::Clock,
        PacketId::SvPosition,
        PacketId::Ekf,
        PacketId::Measurement,
        PacketId::Pseudorange,
        PacketId::Ephemeris,
        PacketId::Almanac,
        PacketId::CommandAck,
    ];

    /// Value carried in the header's packet id field.
    #[must_use]
    pub const fn apid(self) -> Apid {
        APID_BASE + self as u16
    }

    /// Exact encoded payload length for this id.
    #[must_use]
    pub const fn payload_len(self) -> usize {
        match self {
            PacketId::BoardHealth => BoardHealth::LEN,
            PacketId::TaskHealth => TaskHealth::LEN,
            PacketId::ChannelHealth => ChannelHealth::LEN,
            PacketId::Sps => Sps::LEN,
            PacketId::Clock => Clock::LEN,
            PacketId::SvPosition => SvPosition::LEN,
            PacketId::Ekf => Ekf::LEN,
            PacketId::Measurement => Measurement::LEN,
            PacketId::Pseudorange => Pseudorange::LEN,
            PacketId::Ephemeris => Ephemeris::LEN,
            PacketId::Almanac => Almanac::LEN,
            PacketId::CommandAck => CommandAck::LEN,
        }
    }

    /// The catalogue's decode routine for this id.
    #[must_use]
    pub fn decoder(self) -> DecodeFn {
        match self {
            PacketId::BoardHealth => decode_as::<BoardHealth>,
            PacketId::TaskHealth => decode_as::<TaskHealth>,
            PacketId::ChannelHealth => decode_as::<ChannelHealth>,
            PacketId::Sps => decode_as::<Sps>,
            PacketId::Clock => decode_as::<Clock>,
            PacketId::SvPosition => decode_as::<SvPosition>,
            PacketId::Ekf => decode_as::<Ekf>,
            PacketId::Measurement => decode_as::<Measurement>,
            PacketId::Pseudorange => decode_as::<Pseudorange>,
            PacketId::Ephemeris => decode_as::<Ephemeris>,
            PacketId::Almanac => decode_as::<Almanac>,
            PacketId::CommandAck => decode_as::<CommandAck>,
        }
    }
}

impl TryFrom<Apid> for PacketId {
    type Error = Error;

    fn try_from(apid: Apid) -> Result<Self> {
        apid.checked_sub(APID_BASE)
            .and_then(|ordinal| PacketId::ALL.get(ordinal as usize))
            .copied()
            .ok_or(Error::UnknownPacketId(apid))
    }
}

impl Display for PacketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}({})", self.apid())
    }
}

/// Largest payload of any catalogue entry; the default sanity bound for header lengths.
pub const MAX_PAYLOAD_LEN: usize = {
    let mut max = 0;
    let mut i = 0;
    while i < PacketId::ALL.len() {
        let len = PacketId::ALL[i].payload_len();
        if len > max {
            max = len;
        }
        i += 1;
    }
    max
};

/// Decodes a payload into a [Message]. Fails if the payload is not the expected size.
pub type DecodeFn = fn(&[u8]) -> Result<Message>;

fn decode_as<P: Payload>(dat: &[u8]) -> Result<Message> {
    P::decode(dat).map(Into::into)
}

/// A fixed-width value that can be packed into a payload.
pub trait Field: Sized {
    /// Encoded width in bytes.
    const WIDTH: usize;

    fn put(&self, buf: &mut Vec<u8>);

    /// Callers guarantee at least `WIDTH` bytes remain.
    fn get(buf: &mut &[u8]) -> Self;
}

macro_rules! field {
    ($ty:ty, $put:ident, $get:ident) => {
        impl Field for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            fn put(&self, buf: &mut Vec<u8>) {
                buf.$put(*self);
            }

            fn get(buf: &mut &[u8]) -> Self {
                buf.$get()
            }
        }
    };
}

field!(u16, put_u16, get_u16);
field!(u32, put_u32, get_u32);
field!(i32, put_i32, get_i32);
field!(f32, put_f32, get_f32);
field!(f64, put_f64, get_f64);

impl<T: Field, const N: usize> Field for [T; N] {
    const WIDTH: usize = T::WIDTH * N;

    fn put(&self, buf: &mut Vec<u8>) {
        for v in self {
            v.put(buf);
        }
    }

    fn get(buf: &mut &[u8]) -> Self {
        std::array::from_fn(|_| T::get(buf))
    }
}

/// A catalogue record with a fixed wire layout.
pub trait Payload: Sized + Into<Message> {
    /// Packet id this record is sent under.
    const ID: PacketId;
    /// Exact encoded length in bytes.
    const LEN: usize;

    fn put_fields(&self, buf: &mut Vec<u8>);

    /// Callers guarantee exactly `LEN` bytes remain.
    fn get_fields(buf: &mut &[u8]) -> Self;

    /// Encode to exactly [Self::LEN] bytes.
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        self.put_fields(&mut buf);
        buf
    }

    /// Decode from exactly [Self::LEN] bytes.
    ///
    /// # Errors
    /// [Error::PayloadSizeMismatch] if `dat` is not exactly [Self::LEN] bytes.
    fn decode(dat: &[u8]) -> Result<Self> {
        if dat.len() != Self::LEN {
            return Err(Error::PayloadSizeMismatch {
                id: Self::ID,
                expected: Self::LEN,
                actual: dat.len(),
            });
        }
        let mut buf = dat;
        Ok(Self::get_fields(&mut buf))
    }
}

/// Any decoded catalogue record.
#[derive(Debug, Clone, PartialEq, derive_more::From)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "packet")
)]
pub enum Message {
    BoardHealth(BoardHealth),
    TaskHealth(TaskHealth),
    ChannelHealth(ChannelHealth),
    Sps(Sps),
    Clock(Clock),
    SvPosition(SvPosition),
    Ekf(Ekf),
    Measurement(Measurement),
    Pseudorange(Pseudorange),
    Ephemeris(Ephemeris),
    Almanac(Almanac),
    CommandAck(CommandAck),
}

impl Message {
    #[must_use]
    pub fn packet_id(&self) -> PacketId {
        match self {
            Message::BoardHealth(_) => PacketId::BoardHealth,
            Message::TaskHealth(_) => PacketId::TaskHealth,
            Message::ChannelHealth(_) => PacketId::ChannelHealth,
            Message::Sps(_) => PacketId::Sps,
            Message::Clock(_) => PacketId::Clock,
            Message::SvPosition(_) => PacketId::SvPosition,
            Message::Ekf(_) => PacketId::Ekf,
            Message::Measurement(_) => PacketId::Measurement,
            Message::Pseudorange(_) => PacketId::Pseudorange,
            Message::Ephemeris(_) => PacketId::Ephemeris,
            Message::Almanac(_) => PacketId::Almanac,
            Message::CommandAck(_) => PacketId::CommandAck,
        }
    }

    /// Encode the payload bytes for this message.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Message::BoardHealth(m) => m.encode(),
            Message::TaskHealth(m) => m.encode(),
            Message::ChannelHealth(m) => m.encode(),
            Message::Sps(m) => m.encode(),
            Message::Clock(m) => m.encode(),
            Message::SvPosition(m) => m.encode(),
            Message::Ekf(m) => m.encode(),
            Message::Measurement(m) => m.encode(),
            Message::Pseudorange(m) => m.encode(),
            Message::Ephemeris(m) => m.encode(),
            Message::Almanac(m) => m.encode(),
            Message::CommandAck(m) => m.encode(),
        }
    }

    /// Decode `payload` as the record named by `id`.
    ///
    /// # Errors
    /// [Error::PayloadSizeMismatch] if `payload` is not the catalogue length for `id`.
    pub fn decode(id: PacketId, payload: &[u8]) -> Result<Message> {
        (id.decoder())(payload)
    }
}
