use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use gpstlm::catalogue::{Message, PacketId};
use gpstlm::stream::FrameDecoder;
use gpstlm::{Dispatcher, Producer};
use rand::Rng;

// One random frame of every catalogue kind, repeated.
fn stream(repeat: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let producer = Producer::default();
    let mut dat = Vec::new();
    for _ in 0..repeat {
        for id in PacketId::ALL {
            let mut payload = vec![0u8; id.payload_len()];
            rng.fill(&mut payload[..]);
            let msg = Message::decode(id, &payload).unwrap();
            dat.extend(producer.submit(id, &msg).unwrap());
        }
    }
    dat
}

fn bench_decode_stream(c: &mut Criterion) {
    let dat = stream(100);

    let mut group = c.benchmark_group("stream");
    group.throughput(Throughput::Bytes(dat.len() as u64));
    group.bench_function("decode", |b| {
        b.iter(|| {
            let mut decoder = FrameDecoder::default();
            decoder.push(&dat);
            while let Ok(Some(_)) = decoder.next_frame() {}
        });
    });
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let dat = stream(100);
    let mut decoder = FrameDecoder::default();
    decoder.push(&dat);
    let mut frames = Vec::new();
    while let Ok(Some(frame)) = decoder.next_frame() {
        frames.push(frame);
    }

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(frames.len() as u64));
    group.bench_function("decode_and_deliver", |b| {
        let mut dispatcher = Dispatcher::default();
        dispatcher.subscribe_all(|_: PacketId, _: &Message| {});
        b.iter(|| {
            for frame in &frames {
                let _ = dispatcher.dispatch(frame);
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_decode_stream, bench_dispatch);
criterion_main!(benches);
