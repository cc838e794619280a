//! Benchmarks for the CPU half of a frame.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tidewave::input::{Input, KeyCode};
use tidewave::passes::schedule;
use tidewave::shaders::ShaderStage;
use tidewave::uniforms::SCENE_BLOCK;
use tidewave::{BindingTable, FrameSnapshot, RecordingExecutor, UniformBinder, World};

const DT: f32 = 1.0 / 60.0;

fn bench_world_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_tick");

    group.bench_function("idle", |b| {
        let mut world = World::default();
        let mut input = Input::new();
        let mut now = 0.0;
        b.iter(|| {
            now += DT;
            let out = world.tick(&mut input, now, DT);
            input.begin_tick();
            black_box(out)
        })
    });

    group.bench_function("keys_held", |b| {
        let mut world = World::default();
        let mut input = Input::new();
        for key in [KeyCode::LeftShift, KeyCode::W, KeyCode::T, KeyCode::U] {
            input.key_down(key);
        }
        let mut now = 0.0;
        b.iter(|| {
            now += DT;
            let out = world.tick(&mut input, now, DT);
            input.begin_tick();
            black_box(out)
        })
    });

    group.finish();
}

fn bench_uniform_push(c: &mut Criterion) {
    let table = BindingTable::resolve(&ShaderStage::Trace.source(), SCENE_BLOCK, "Trace").unwrap();

    c.bench_function("binding_table_resolve", |b| {
        let source = ShaderStage::Trace.source();
        b.iter(|| black_box(BindingTable::resolve(&source, SCENE_BLOCK, "Trace").unwrap()))
    });

    c.bench_function("uniform_push", |b| {
        let mut binder = UniformBinder::new(table.clone());
        let snapshot = FrameSnapshot::default();
        b.iter(|| black_box(binder.push(black_box(&snapshot)).len()))
    });
}

fn bench_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("pass_schedule");

    for cadence in [0u32, 1, 3] {
        group.bench_with_input(BenchmarkId::new("schedule", cadence), &cadence, |b, &cadence| {
            let mut frame = 0u64;
            b.iter(|| {
                frame += 1;
                black_box(schedule(frame, cadence))
            })
        });
    }

    group.bench_function("recording_executor_frame", |b| {
        let mut exec = RecordingExecutor::new();
        let mut frame = 0u64;
        b.iter(|| {
            exec.run(frame, 3);
            frame += 1;
        })
    });

    group.finish();
}

criterion_group!(benches, bench_world_tick, bench_uniform_push, bench_schedule);
criterion_main!(benches);
