//! Routing decoded frames to consumers.
//!
//! A [Dispatcher] maps each [PacketId] to a decode routine and the consumers subscribed to it.
//! Consumers are called synchronously, in registration order, so a slow consumer delays the
//! ones registered after it. Use [ChannelConsumer] to move a consumer's work onto its own
//! queue.
use std::collections::HashMap;

use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::{debug, trace, warn};

use crate::catalogue::{DecodeFn, Message, PacketId};
use crate::packet::Frame;
use crate::{Error, Result, Summary};

/// Receives fully decoded messages. Never sees partial or malformed messages.
pub trait Consumer {
    fn on_message(&mut self, packet_id: PacketId, message: &Message);
}

impl<F> Consumer for F
where
    F: FnMut(PacketId, &Message),
{
    fn on_message(&mut self, packet_id: PacketId, message: &Message) {
        self(packet_id, message);
    }
}

/// Forwards each message to a channel so it can be handled on another thread.
///
/// # Example
/// ```
/// use gpstlm::catalogue::{CommandAck, PacketId, Payload};
/// use gpstlm::dispatch::{ChannelConsumer, Dispatcher};
/// use gpstlm::packet::decode_stream;
/// use gpstlm::Producer;
///
/// let (consumer, rx) = ChannelConsumer::new();
/// let mut dispatcher = Dispatcher::default();
/// dispatcher.subscribe(PacketId::CommandAck, consumer);
///
/// let dat = Producer::default().send(&CommandAck { command_id: 7, command_count: 3 }).unwrap();
/// let (frame, _) = decode_stream(&dat, 8).unwrap().unwrap();
/// dispatcher.dispatch(&frame).unwrap();
///
/// let (id, _) = rx.try_recv().unwrap();
/// assert_eq!(id, PacketId::CommandAck);
/// ```
pub struct ChannelConsumer {
    tx: Sender<(PacketId, Message)>,
}

impl ChannelConsumer {
    #[must_use]
    pub fn new() -> (Self, Receiver<(PacketId, Message)>) {
        let (tx, rx) = unbounded();
        (ChannelConsumer { tx }, rx)
    }
}

impl Consumer for ChannelConsumer {
    fn on_message(&mut self, packet_id: PacketId, message: &Message) {
        if self.tx.send((packet_id, message.clone())).is_err() {
            trace!(%packet_id, "receiver gone, dropping message");
        }
    }
}

struct Route {
    decode: DecodeFn,
    consumers: Vec<Box<dyn Consumer + Send>>,
}

/// Dispatch table keyed by packet id.
#[derive(Default)]
pub struct Dispatcher {
    routes: HashMap<PacketId, Route>,
    summary: Summary,
}

impl Dispatcher {
    /// Register `consumer` for `id`, decoding with `decode`.
    ///
    /// Additional consumers for the same id are delivered to in registration order. The most
    /// recently registered decode routine is used for the id.
    pub fn register<C>(&mut self, id: PacketId, decode: DecodeFn, consumer: C)
    where
        C: Consumer + Send + 'static,
    {
        let route = self.routes.entry(id).or_insert_with(|| Route {
            decode,
            consumers: Vec::new(),
        });
        route.decode = decode;
        route.consumers.push(Box::new(consumer));
        debug!(%id, consumers = route.consumers.len(), "registered consumer");
    }

    /// Register `consumer` for `id` using the catalogue's decoder.
    pub fn subscribe<C>(&mut self, id: PacketId, consumer: C)
    where
        C: Consumer + Send + 'static,
    {
        self.register(id, id.decoder(), consumer);
    }

    /// Register `consumer` for every catalogue id.
    pub fn subscribe_all<C>(&mut self, consumer: C)
    where
        C: Consumer + Clone + Send + 'static,
    {
        for id in PacketId::ALL {
            self.subscribe(id, consumer.clone());
        }
    }

    /// Decode `frame` and deliver it to every consumer registered for its packet id.
    ///
    /// Returns the number of consumers the message was delivered to. Every frame is recorded
    /// in [Dispatcher::summary] first, so sequence gaps are seen even for dropped frames.
    ///
    /// # Errors
    /// * [Error::UnknownPacketId] if the packet id is not in the catalogue or nothing is
    ///   registered for it. The frame is dropped.
    /// * [Error::PayloadSizeMismatch] if the payload is not the catalogue size for its packet
    ///   id. The frame is dropped.
    pub fn dispatch(&mut self, frame: &Frame) -> Result<usize> {
        self.summary.add(frame);

        let id = match frame.header.packet_id() {
            Ok(id) => id,
            Err(err) => {
                debug!(header = ?frame.header, "unknown packet id, dropping");
                return Err(err);
            }
        };
        let Some(route) = self.routes.get_mut(&id) else {
            debug!(%id, "no consumers registered, dropping");
            return Err(Error::UnknownPacketId(frame.header.apid));
        };

        let message = match (route.decode)(&frame.payload) {
            Ok(message) => message,
            Err(err) => {
                warn!(%id, %err, "failed to decode payload, dropping");
                return Err(err);
            }
        };
        for consumer in &mut route.consumers {
            consumer.on_message(id, &message);
        }
        Ok(route.consumers.len())
    }

    /// Stats on every frame dispatched so far.
    #[must_use]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// True if anything is registered for `id`.
    #[must_use]
    pub fn is_registered(&self, id: PacketId) -> bool {
        self.routes.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::catalogue::{Clock, CommandAck, Payload};
    use crate::packet::PacketHeader;

    fn frame(apid: u16, seq: u16, payload: Vec<u8>) -> Frame {
        Frame {
            header: PacketHeader {
                apid,
                sequence_count: seq,
                payload_length: payload.len() as u16,
            },
            payload,
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(&'static str, PacketId)>>>);

    impl Recorder {
        fn named(&self, name: &'static str) -> impl Consumer + Send + 'static {
            let log = self.0.clone();
            move |id: PacketId, _: &Message| log.lock().unwrap().push((name, id))
        }

        fn calls(&self) -> Vec<(&'static str, PacketId)> {
            self.0.lock().unwrap().clone()
        }
    }

    #[test]
    fn delivers_in_registration_order() {
        let recorder = Recorder::default();
        let mut dispatcher = Dispatcher::default();
        dispatcher.subscribe(PacketId::CommandAck, recorder.named("storage"));
        dispatcher.subscribe(PacketId::CommandAck, recorder.named("display"));
        dispatcher.subscribe(PacketId::Clock, recorder.named("clock"));

        let ack = CommandAck {
            command_id: 7,
            command_count: 3,
        };
        let delivered = dispatcher
            .dispatch(&frame(CommandAck::ID.apid(), 0, ack.encode()))
            .unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(
            recorder.calls(),
            [
                ("storage", PacketId::CommandAck),
                ("display", PacketId::CommandAck)
            ]
        );
    }

    #[test]
    fn unknown_packet_id() {
        let recorder = Recorder::default();
        let mut dispatcher = Dispatcher::default();
        dispatcher.subscribe(PacketId::CommandAck, recorder.named("ack"));

        let zult = dispatcher.dispatch(&frame(0x123, 0, vec![0; 8]));
        assert!(matches!(zult, Err(Error::UnknownPacketId(0x123))));

        // in the catalogue but nothing registered
        let zult = dispatcher.dispatch(&frame(Clock::ID.apid(), 1, Clock::default().encode()));
        assert!(matches!(zult, Err(Error::UnknownPacketId(4))));

        assert!(recorder.calls().is_empty());
        assert_eq!(dispatcher.summary().count, 2);
        assert_eq!(dispatcher.summary().unknown, 1);
    }

    #[test]
    fn size_mismatch_is_dropped_but_counted() {
        let recorder = Recorder::default();
        let mut dispatcher = Dispatcher::default();
        dispatcher.subscribe(PacketId::CommandAck, recorder.named("ack"));

        let ack = CommandAck::default().encode();
        dispatcher
            .dispatch(&frame(CommandAck::ID.apid(), 1, ack.clone()))
            .unwrap();
        let zult = dispatcher.dispatch(&frame(CommandAck::ID.apid(), 3, vec![0; 4]));
        assert!(matches!(
            zult,
            Err(Error::PayloadSizeMismatch {
                id: PacketId::CommandAck,
                expected: 8,
                actual: 4
            })
        ));
        dispatcher
            .dispatch(&frame(CommandAck::ID.apid(), 4, ack))
            .unwrap();

        assert_eq!(recorder.calls().len(), 2);
        assert_eq!(dispatcher.summary().missing, 1);
        assert_eq!(dispatcher.summary().rejected, 1);
    }

    #[test]
    fn custom_decoder() {
        fn always_ack(_: &[u8]) -> Result<Message> {
            Ok(CommandAck {
                command_id: 1,
                command_count: 1,
            }
            .into())
        }

        let (consumer, rx) = ChannelConsumer::new();
        let mut dispatcher = Dispatcher::default();
        dispatcher.register(PacketId::CommandAck, always_ack, consumer);
        dispatcher
            .dispatch(&frame(CommandAck::ID.apid(), 0, vec![0; 8]))
            .unwrap();

        let (_, message) = rx.try_recv().unwrap();
        assert_eq!(
            message,
            Message::CommandAck(CommandAck {
                command_id: 1,
                command_count: 1
            })
        );
    }

    #[test]
    fn subscribe_all() {
        let recorder = Recorder::default();
        let mut dispatcher = Dispatcher::default();
        let consumer = recorder.clone();
        dispatcher.subscribe_all(move |id: PacketId, _: &Message| {
            consumer.0.lock().unwrap().push(("all", id));
        });
        for id in PacketId::ALL {
            assert!(dispatcher.is_registered(id));
        }
        dispatcher
            .dispatch(&frame(Clock::ID.apid(), 0, Clock::default().encode()))
            .unwrap();
        assert_eq!(recorder.calls(), [("all", PacketId::Clock)]);
    }
}
