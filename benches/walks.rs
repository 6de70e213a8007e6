use bodywalk::ball_walk::BallWalk;
use bodywalk::billiard_walk::BilliardWalk;
use bodywalk::core::{MarkovChain, Walk};
use bodywalk::geometry::{Ball, ConvexBody, Polytope};
use bodywalk::hit_and_run::HitAndRun;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ndarray::{Array1, Array2};

/// The hypercube `[-1, 1]^dim` as `2 * dim` inequalities.
fn hypercube(dim: usize) -> Polytope {
    let identity = Array2::<f64>::eye(dim);
    let a = ndarray::concatenate![ndarray::Axis(0), identity, -&identity];
    Polytope::new(a, Array1::ones(2 * dim)).unwrap()
}

fn bench_walk<B, W>(c: &mut Criterion, name: &str, body: &B, walk: W)
where
    B: ConvexBody + ?Sized,
    W: Walk + Clone,
{
    let origin = vec![0.0; body.dim()];
    c.bench_function(name, |b| {
        b.iter_batched(
            || MarkovChain::new(body, &origin, 42_u64, walk.clone()).unwrap(),
            |mut chain| black_box(chain.sample(black_box(100), 10, 1).unwrap()),
            BatchSize::SmallInput,
        )
    });
}

fn criterion_benchmark(c: &mut Criterion) {
    for dim in [2, 20] {
        let cube = hypercube(dim);
        let ball = Ball::new(Array1::zeros(dim), 1.0).unwrap();

        bench_walk(c, &format!("ball walk cube {dim}"), &cube, BallWalk::new(0.5).unwrap());
        bench_walk(c, &format!("hit-and-run cube {dim}"), &cube, HitAndRun::default());
        bench_walk(
            c,
            &format!("billiard walk cube {dim}"),
            &cube,
            BilliardWalk::new(1.0, None).unwrap(),
        );
        bench_walk(c, &format!("hit-and-run ball {dim}"), &ball, HitAndRun::default());
        bench_walk(
            c,
            &format!("billiard walk ball {dim}"),
            &ball,
            BilliardWalk::new(1.0, None).unwrap(),
        );
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
