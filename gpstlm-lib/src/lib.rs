#![doc = include_str!("../README.md")]

mod error;
mod producer;
mod summary;

pub mod catalogue;
pub mod dispatch;
pub mod packet;
pub mod stream;

pub use catalogue::{Message, PacketId, Payload};
pub use dispatch::{Consumer, Dispatcher};
pub use error::{Error, Result};
pub use packet::{Frame, PacketHeader};
pub use producer::{Producer, SequenceCounter};
pub use summary::{missing_packets, ApidSummary, Summary};
