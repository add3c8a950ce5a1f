use billiard_physics::expr::{CompiledFormulas, FallbackFormulas, KinematicFormulas};
use billiard_physics::{compile, Ball, BallId, FormulaBackend, Kind, PhysicsParams, Shot, Vector3};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_contact_velocity(c: &mut Criterion) {
    let v = Vector3::new(1.2, -0.4, 0.0);
    let w = Vector3::new(3.0, 10.0, -25.0);
    let r = 0.028575;

    let compiled = CompiledFormulas::get();
    c.bench_function("contact_velocity/compiled", |b| {
        b.iter(|| compiled.contact_velocity(black_box(v), black_box(w), black_box(r)))
    });
    c.bench_function("contact_velocity/fallback", |b| {
        b.iter(|| FallbackFormulas.contact_velocity(black_box(v), black_box(w), black_box(r)))
    });
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile/deltaW", |b| {
        b.iter(|| {
            compile(
                black_box("[0, 0, 1] x ~U * (5 * mu * g * t / (2 * r))"),
                &["U", "mu", "g", "t", "r"],
                Kind::Vector,
            )
        })
    });
}

fn bench_evolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve");
    for backend in [FormulaBackend::Compiled, FormulaBackend::Fallback] {
        let params = PhysicsParams {
            formula_backend: backend,
            ..Default::default()
        };
        let mut ball = Ball::with_params(BallId(0), 0.0, 0.0, &params);
        ball.hit(&Shot::new(Vector3::new(1.0, 0.3, 0.0), 2.0).with_top_spin(0.4).with_side_spin(0.2), &params);

        group.bench_function(format!("{:?}", backend), |b| {
            b.iter(|| {
                let mut ball = ball.clone();
                for _ in 0..60 {
                    ball.evolve(black_box(1.0 / 60.0), &params, &[]);
                }
                ball
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_contact_velocity, bench_compile, bench_evolve);
criterion_main!(benches);
