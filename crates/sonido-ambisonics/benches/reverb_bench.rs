//! Criterion benchmarks for the ambisonic FDN reverb engine.
//!
//! Run with: cargo bench
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sonido_ambisonics::{ReverbEngine, ReverbParameters, SpatialEffectState};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_b_format(size: usize) -> [Vec<f32>; 4] {
    let w: Vec<f32> = (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 220.0 * t).sin() * 0.4
        })
        .collect();
    let x: Vec<f32> = w.iter().map(|v| v * 0.5).collect();
    let y: Vec<f32> = w.iter().map(|v| v * 0.3).collect();
    let z: Vec<f32> = w.iter().map(|v| v * 0.1).collect();
    [w, x, y, z]
}

fn make_engine() -> ReverbEngine {
    let mut engine = ReverbEngine::create();
    engine.device_update(SAMPLE_RATE).unwrap();
    engine.update(&ReverbParameters::default(), 2);
    engine
}

fn bench_process_stereo(c: &mut Criterion) {
    let mut group = c.benchmark_group("ReverbEngine_process_stereo");

    for &block_size in BLOCK_SIZES {
        let b_format = generate_b_format(block_size);
        let mut engine = make_engine();
        // Run the engine past its initial fade window before measuring.
        {
            let inputs = [
                b_format[0].as_slice(),
                b_format[1].as_slice(),
                b_format[2].as_slice(),
                b_format[3].as_slice(),
            ];
            let mut left = vec![0.0; block_size];
            let mut right = vec![0.0; block_size];
            let mut out: [&mut [f32]; 2] = [&mut left, &mut right];
            engine.process(inputs, &mut out);
        }

        group.bench_with_input(BenchmarkId::from_parameter(block_size), &block_size, |b, _| {
            let mut left = vec![0.0; block_size];
            let mut right = vec![0.0; block_size];
            b.iter(|| {
                let inputs = [
                    b_format[0].as_slice(),
                    b_format[1].as_slice(),
                    b_format[2].as_slice(),
                    b_format[3].as_slice(),
                ];
                let mut out: [&mut [f32]; 2] = [&mut left, &mut right];
                engine.process(black_box(inputs), &mut out);
                black_box(left[0])
            })
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut engine = make_engine();
    let mut params = ReverbParameters::default();

    c.bench_function("ReverbEngine_update", |b| {
        b.iter(|| {
            params.diffusion = if params.diffusion > 0.5 { 0.2 } else { 0.8 };
            engine.update(black_box(&params), 2);
        })
    });
}

fn bench_fading_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("ReverbEngine_process_while_fading");
    let block_size = 256;
    let b_format = generate_b_format(block_size);

    group.bench_function("256", |b| {
        b.iter(|| {
            let mut engine = make_engine();
            let mut params = ReverbParameters::default();
            params.decay_time = 3.0;
            engine.update(black_box(&params), 2);

            let inputs = [
                b_format[0].as_slice(),
                b_format[1].as_slice(),
                b_format[2].as_slice(),
                b_format[3].as_slice(),
            ];
            let mut left = vec![0.0; block_size];
            let mut right = vec![0.0; block_size];
            let mut out: [&mut [f32]; 2] = [&mut left, &mut right];
            engine.process(inputs, &mut out);
            black_box(left[0])
        })
    });

    group.finish();
}

criterion_group!(benches, bench_process_stereo, bench_update, bench_fading_process);
criterion_main!(benches);
