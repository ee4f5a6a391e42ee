use criterion::{black_box, criterion_group, criterion_main, Criterion};
use patchbay::{Message, NodeId, PatchProcessor, PatchSettings, Patcher};

// a chain of `len` adders ending in a trigger with an unconnected fan-out
fn chain(len: usize) -> (Patcher, PatchProcessor, NodeId) {
    let (mut patcher, mut processor) = Patcher::new(PatchSettings::default().with_command_capacity(4096));
    let head = patcher.create_object("+", "1").unwrap();
    let mut prev = head;
    for _ in 1..len {
        let next = patcher.create_object("+", "1").unwrap();
        patcher.connect(prev, 0, next, 0).unwrap();
        prev = next;
    }
    let fan = patcher.create_object("trigger", "f f f f").unwrap();
    patcher.connect(prev, 0, fan, 0).unwrap();
    processor.process();
    (patcher, processor, head)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("deliver through 64 adders", |b| {
        let (_patcher, mut processor, head) = chain(64);
        let msg = Message::Float(0.5);
        b.iter(move || processor.deliver(black_box(head), 0, &msg))
    });

    c.bench_function("route on list", |b| {
        let (mut patcher, mut processor) = Patcher::new(PatchSettings::default());
        let route = patcher
            .create_object("route", "alpha beta gamma delta epsilon zeta eta theta")
            .unwrap();
        processor.process();
        let msg = Message::List("theta 1 2 3".into());
        b.iter(move || processor.deliver(black_box(route), 0, &msg))
    });

    c.bench_function("create + connect + delete", |b| {
        let (mut patcher, mut processor) = Patcher::new(PatchSettings::default());
        b.iter(move || {
            let a = patcher.create_object("bang", "").unwrap();
            let p = patcher.create_object("print", "").unwrap();
            patcher.connect(a, 0, p, 0).unwrap();
            patcher.delete_object(a).unwrap();
            patcher.delete_object(p).unwrap();
            processor.process();
            patcher.poll();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
