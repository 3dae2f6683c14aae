//! Whole-console throughput benchmarks.

use criterion::{criterion_group, criterion_main, Criterion};
use famicore_core::Console;

fn nrom_image() -> Vec<u8> {
    let mut prg = vec![0xEA; 32 * 1024];
    // Tight loop: JMP $8000.
    prg[0] = 0x4C;
    prg[1] = 0x00;
    prg[2] = 0x80;
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;

    let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 2, 1, 0x00, 0x00];
    image.extend_from_slice(&[0; 8]);
    image.extend_from_slice(&prg);
    image.extend_from_slice(&vec![0x55; 8 * 1024]);
    image
}

fn bench_step_frame(c: &mut Criterion) {
    let mut console = Console::new();
    console.insert_cartridge(&nrom_image()).unwrap();

    c.bench_function("step_frame", |b| {
        b.iter(|| {
            console.step_frame();
        });
    });
}

fn bench_clock(c: &mut Criterion) {
    let mut console = Console::new();
    console.insert_cartridge(&nrom_image()).unwrap();

    c.bench_function("clock_1000", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                console.clock();
            }
        });
    });
}

criterion_group!(benches, bench_step_frame, bench_clock);
criterion_main!(benches);
