//! Criterion benchmarks for the object integrity checker.
//!
//! Benchmarks the two hot paths called once per entry/line rather than
//! once per object: tree-ordering validation and identity-line parsing.

use criterion::{criterion_group, criterion_main, Criterion};

use fsck_core::host::NullHost;
use fsck_core::ident::check_ident;
use fsck_core::object::ObjectId;
use fsck_core::policy::Options;
use fsck_core::report::ReportSeverity;
use fsck_core::validators::tree::validate_tree;

fn noop_sink(_: Option<&ObjectId>, _: ReportSeverity, _: &str) -> i32 {
    0
}

fn synthetic_tree_buffer(entries: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    for i in 0..entries {
        let name = format!("file{i:05}");
        buf.extend_from_slice(b"100644 ");
        buf.extend_from_slice(name.as_bytes());
        buf.push(0);
        let mut oid = [0u8; 20];
        oid[0] = (i % 256) as u8;
        oid[1] = ((i >> 8) % 256) as u8;
        buf.extend_from_slice(&oid);
    }
    buf
}

fn bench_tree_ordering(c: &mut Criterion) {
    let buf = synthetic_tree_buffer(1000);
    let id = ObjectId::from_bytes([7; 20]);
    let opts = Options::new();

    c.bench_function("validate_tree/1000_sorted_entries", |b| {
        b.iter(|| {
            let mut sink = noop_sink;
            std::hint::black_box(validate_tree(
                std::hint::black_box(&id),
                std::hint::black_box(&buf),
                &opts,
                &mut sink,
                &NullHost,
            ))
        })
    });
}

fn bench_identity_line(c: &mut Criterion) {
    let line = b"A U Thor <author@example.com> 1234567890 +0000\n";
    let id = ObjectId::from_bytes([7; 20]);
    let opts = Options::new();

    c.bench_function("check_ident/well_formed_line", |b| {
        b.iter(|| {
            let mut sink = noop_sink;
            std::hint::black_box(check_ident(std::hint::black_box(line), &id, &opts, &mut sink))
        })
    });
}

criterion_group!(benches, bench_tree_ordering, bench_identity_line);
criterion_main!(benches);
