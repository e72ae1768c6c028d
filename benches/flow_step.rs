//! Benchmarks for the CPU reference kernel and scene setup.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use flowgarden::ground::sample_ground;
use flowgarden::seed::build_seed_texture;
use flowgarden::shader_utils::{kernel_wgsl, particles_wgsl};
use flowgarden::{CpuCompute, FlowFieldParams, GroundConfig, MeshData, SimulationStage};

fn cloud(count: usize) -> MeshData {
    MeshData::from_positions(
        (0..count)
            .map(|i| {
                let t = i as f32 * 0.013;
                [t.sin() * 3.0, (i % 97) as f32 * 0.05, t.cos() * 3.0]
            })
            .collect(),
    )
}

fn bench_cpu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_step");

    for count in [1_000usize, 10_000, 50_000] {
        let mesh = cloud(count);
        let seed = build_seed_texture(&mesh, -2.0, &mut StdRng::seed_from_u64(1)).unwrap();
        let mut stage = SimulationStage::initialize(
            CpuCompute::new(),
            &seed,
            FlowFieldParams::default(),
            0.3,
        )
        .unwrap();
        let mut time = 0.0f32;

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                time += 1.0 / 60.0;
                stage.step(black_box(time), black_box(1.0 / 60.0));
            })
        });
    }

    group.finish();
}

fn bench_seeding(c: &mut Criterion) {
    let mesh = cloud(50_000);
    c.bench_function("seed_texture_50k", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        b.iter(|| black_box(build_seed_texture(&mesh, -2.0, &mut rng).unwrap()))
    });
}

fn bench_ground(c: &mut Criterion) {
    let config = GroundConfig::default();
    c.bench_function("sample_ground_default", |b| {
        let mut rng = StdRng::seed_from_u64(3);
        b.iter(|| black_box(sample_ground(&config, &mut rng)))
    });
}

fn bench_shader_sources(c: &mut Criterion) {
    let mut group = c.benchmark_group("shader_sources");
    group.bench_function("kernel", |b| b.iter(|| black_box(kernel_wgsl())));
    group.bench_function("particles", |b| b.iter(|| black_box(particles_wgsl())));
    group.finish();
}

criterion_group!(
    benches,
    bench_cpu_step,
    bench_seeding,
    bench_ground,
    bench_shader_sources
);
criterion_main!(benches);
