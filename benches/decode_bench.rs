//! Criterion benchmark untuk decoder dan receive buffer
//!
//! Run dengan: cargo bench

use std::os::unix::net::UnixDatagram;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use uevent_monitor::{decode, RecvBuffer};

fn sample(attrs: usize) -> Vec<u8> {
    let mut raw = b"add@/devices/pci0000:00/0000:00:14.0/usb1/1-2".to_vec();
    for i in 0..attrs {
        raw.push(0);
        raw.extend_from_slice(format!("KEY_{i}=value-{i}").as_bytes());
    }
    raw
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for attrs in [8, 64, 1024].iter() {
        let raw = sample(*attrs);
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_function(format!("attrs_{}", attrs), |b| {
            b.iter(|| decode(black_box(&raw)).map(|m| m.attributes.len()))
        });
    }

    group.finish();
}

fn bench_receive(c: &mut Criterion) {
    let mut group = c.benchmark_group("recv_buffer");
    let (tx, rx) = UnixDatagram::pair().unwrap();

    for size in [256usize, 16 * 1024].iter() {
        let payload = vec![b'x'; *size];
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_function(format!("fill_{}", size), |b| {
            let mut buffer = RecvBuffer::new();
            b.iter(|| {
                tx.send(&payload).unwrap();
                black_box(buffer.fill(&rx).unwrap().len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_receive);
criterion_main!(benches);
