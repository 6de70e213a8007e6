//! End-to-end checks of the three walks over the unit square and the unit disk:
//! reproducibility, containment and the shape of the returned samples.

use bodywalk::ball_walk::{ball_walk, BallWalk};
use bodywalk::billiard_walk::{billiard_walk, BilliardWalk};
use bodywalk::core::{MarkovChain, MultiChain};
use bodywalk::geometry::{Ball, ConvexBody, Polytope};
use bodywalk::hit_and_run::{hit_and_run, HitAndRun};
use bodywalk::stats;
use bodywalk::WalkError;
use ndarray::{arr1, Array2};

fn square() -> Polytope {
    Polytope::from_rows(
        &[vec![1.0, 0.0], vec![-1.0, 0.0], vec![0.0, 1.0], vec![0.0, -1.0]],
        &[0.5, 0.5, 0.5, 0.5],
    )
    .unwrap()
}

fn disk() -> Ball {
    Ball::new(arr1(&[0.0, 0.0]), 1.0).unwrap()
}

fn assert_inside<B: ConvexBody + ?Sized>(body: &B, samples: &Array2<f64>) {
    for x in samples.rows() {
        assert!(body.is_inside(&x.to_owned()), "sample {x} left the body");
    }
}

#[test]
fn every_walk_stays_inside_square_and_disk() {
    let bodies: [Box<dyn ConvexBody + Sync>; 2] = [Box::new(square()), Box::new(disk())];
    for body in &bodies {
        let body = body.as_ref();
        let samples = [
            ball_walk(body, &[0.0, 0.0], 1_u64, 0.3).unwrap().sample(500, 1, 1),
            hit_and_run(body, &[0.0, 0.0], 2_u64, None).unwrap().sample(500, 1, 1),
            billiard_walk(body, &[0.0, 0.0], 3_u64, 0.5, None)
                .unwrap()
                .sample(500, 1, 1),
        ];
        for s in samples {
            let s = s.unwrap();
            assert_eq!(s.shape(), &[500, 2]);
            assert_inside(body, &s);
        }
    }
}

#[test]
fn equal_seeds_reproduce_and_distinct_seeds_diverge() {
    let body = square();
    let run = |seed: u64| {
        (
            ball_walk(&body, &[0.0, 0.0], seed, 0.2).unwrap().sample(50, 5, 2).unwrap(),
            hit_and_run(&body, &[0.0, 0.0], seed, None).unwrap().sample(50, 5, 2).unwrap(),
            billiard_walk(&body, &[0.0, 0.0], seed, 1.0, None)
                .unwrap()
                .sample(50, 5, 2)
                .unwrap(),
        )
    };
    let (a1, b1, c1) = run(7);
    let (a2, b2, c2) = run(7);
    let (a3, b3, c3) = run(8);

    assert_eq!(a1, a2);
    assert_eq!(b1, b2);
    assert_eq!(c1, c2);
    assert_ne!(a1, a3);
    assert_ne!(b1, b3);
    assert_ne!(c1, c3);
}

#[test]
fn borrowed_generator_matches_owned_seed() {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    let body = disk();
    let owned = hit_and_run(&body, &[0.1, 0.1], 11_u64, None)
        .unwrap()
        .sample(20, 3, 1)
        .unwrap();

    let mut rng = SmallRng::seed_from_u64(11);
    let borrowed = hit_and_run(&body, &[0.1, 0.1], &mut rng, None)
        .unwrap()
        .sample(20, 3, 1)
        .unwrap();
    assert_eq!(owned, borrowed);
}

#[test]
fn sampling_leaves_the_initial_point_untouched() {
    let body = square();
    let initial_point = vec![0.1, -0.2];
    let mut chain = billiard_walk(&body, &initial_point, 5_u64, 0.5, None).unwrap();
    chain.sample(10, 3, 2).unwrap();
    chain.advance(7).unwrap();

    assert_eq!(initial_point, vec![0.1, -0.2]);
    assert_eq!(chain.initial_state(), &arr1(&[0.1, -0.2]));
}

#[test]
fn repeated_sampling_restarts_from_the_initial_point() {
    let body = square();
    let mut chain = hit_and_run(&body, &[0.2, 0.2], 9_u64, None).unwrap();
    let first = chain.sample(5, 3, 1).unwrap();
    let second = chain.sample(5, 3, 1).unwrap();

    // Same starting point, but the generator stream continues.
    assert_ne!(first, second);
    assert_inside(&body, &second);
}

#[test]
fn mismatched_initial_point_is_rejected() {
    let body = disk();
    let err = MarkovChain::new(&body, &[0.0, 0.0, 0.0], 0_u64, HitAndRun::default()).unwrap_err();
    assert_eq!(
        err,
        WalkError::DimensionMismatch {
            what: "initial point",
            expected: 2,
            found: 3,
        }
    );
}

#[test]
fn bodies_without_reflections_cannot_host_a_billiard_walk() {
    struct MembershipOnly;

    impl ConvexBody for MembershipOnly {
        fn dim(&self) -> usize {
            1
        }

        fn is_inside(&self, x: &ndarray::Array1<f64>) -> bool {
            x[0].abs() <= 1.0
        }
    }

    let body = MembershipOnly;
    let mut chain = billiard_walk(&body, &[0.0], 0_u64, 1.0, None).unwrap();
    assert!(matches!(
        chain.step(),
        Err(WalkError::UnsupportedCapability(_))
    ));

    // The Ball Walk only needs membership.
    let samples = ball_walk(&body, &[0.0], 0_u64, 0.5)
        .unwrap()
        .sample(100, 1, 1)
        .unwrap();
    assert!(samples.iter().all(|x| x.abs() <= 1.0));
}

#[test]
fn parallel_chains_mix_over_the_disk() {
    let body = disk();
    let walks = [
        MultiChain::new(&body, &[0.0, 0.0], BilliardWalk::new(1.0, None).unwrap(), 4)
            .unwrap()
            .set_seed(1)
            .run(1000, 10, 1)
            .unwrap(),
        MultiChain::new(&body, &[0.0, 0.0], HitAndRun::default(), 4)
            .unwrap()
            .set_seed(2)
            .run(1000, 10, 1)
            .unwrap(),
    ];
    for samples in walks {
        assert_eq!(samples.shape(), &[4, 1000, 2]);
        let rhat = stats::rhat(&samples).unwrap();
        assert!(
            rhat.iter().all(|&r| (r - 1.0).abs() < 0.05),
            "chains did not mix: rhat = {rhat}"
        );
    }
}

#[test]
fn ball_walk_acceptance_shrinks_with_step_size() {
    let body = square();
    let rate = |delta: f64| {
        let samples = MarkovChain::new(&body, &[0.0, 0.0], 4_u64, BallWalk::new(delta).unwrap())
            .unwrap()
            .sample(2000, 1, 1)
            .unwrap();
        stats::acceptance_rate(&samples).unwrap()
    };
    let (small, large) = (rate(0.05), rate(1.0));
    assert!(small > 0.9, "acceptance with small steps: {small}");
    assert!(large < small, "acceptance {large} should drop below {small}");
}
