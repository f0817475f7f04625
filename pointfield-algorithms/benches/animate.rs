use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pointfield_algorithms::ProceduralPointField;
use pointfield_core::{FieldConfig, FrameTime};

const PRESETS: [&str; 3] = ["sphere", "helicoid", "swarm"];
const DT: f32 = 1.0 / 60.0;

fn field(name: &str) -> ProceduralPointField {
    let mut config = FieldConfig::preset(name).unwrap();
    config.sampler.seed = Some(1);
    ProceduralPointField::build(config).unwrap()
}

fn animate_frame(c: &mut Criterion) {
    let mut g = c.benchmark_group("animate frame");

    for name in PRESETS {
        let mut field = field(name);
        let count = field.count().unwrap();
        g.throughput(Throughput::Elements(count as u64));

        let mut frame = 0u64;
        g.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                frame += 1;
                // Past the swarm start delay so every motion does real work.
                let time = FrameTime::new(3.0 + frame as f32 * DT, DT, frame);
                std::hint::black_box(&mut field).animate(time).unwrap();
            });
        });
    }

    g.finish();
}

criterion_group!(benches, animate_frame);
criterion_main!(benches);
