#![allow(dead_code)]

use gpstlm::catalogue::{Message, PacketId};
use gpstlm::Producer;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

/// Deterministic rng so failures are reproducible.
pub fn rng() -> StdRng {
    StdRng::seed_from_u64(0x6770_7374)
}

/// Random payload bytes of the catalogue length for `id`.
pub fn random_payload(rng: &mut impl Rng, id: PacketId) -> Vec<u8> {
    let mut dat = vec![0u8; id.payload_len()];
    rng.fill(&mut dat[..]);
    dat
}

/// A random message of the kind named by `id`.
pub fn random_message(rng: &mut impl Rng, id: PacketId) -> Message {
    Message::decode(id, &random_payload(rng, id)).expect("payload is catalogue sized")
}

/// Encode one random message of every kind, in catalogue order.
pub fn catalogue_stream(rng: &mut impl Rng, producer: &Producer) -> (Vec<u8>, Vec<Message>) {
    let mut dat = Vec::new();
    let mut messages = Vec::new();
    for id in PacketId::ALL {
        let msg = random_message(rng, id);
        dat.extend(producer.submit(id, &msg).expect("submit"));
        messages.push(msg);
    }
    (dat, messages)
}
