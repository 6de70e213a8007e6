//! Samples the square `[-0.5, 0.5]^2` with all three walks, running several chains in
//! parallel, and prints summary statistics of the pooled samples.
//!
//! Run with `cargo run --release --example square_walks --features csv` to also write the
//! samples to CSV files.

use bodywalk::ball_walk::BallWalk;
use bodywalk::billiard_walk::BilliardWalk;
use bodywalk::core::{MultiChain, Walk};
use bodywalk::geometry::Polytope;
use bodywalk::hit_and_run::HitAndRun;
use bodywalk::stats;

use ndarray::{Array3, Axis};
use rand::{thread_rng, Rng};
use std::error::Error;

#[cfg(feature = "csv")]
use bodywalk::io::csv::save_csv;

const N_CHAINS: usize = 4;
const SAMPLE_SIZE: usize = 20_000;
const WARMUP: usize = 100;

fn run<W: Walk + Clone + Send>(
    square: &Polytope,
    walk: W,
    seed: u64,
) -> Result<Array3<f64>, Box<dyn Error>> {
    let mut chains = MultiChain::new(square, &[0.0, 0.0], walk, N_CHAINS)?.set_seed(seed);
    Ok(chains.run_progress(SAMPLE_SIZE / N_CHAINS, WARMUP, 1)?)
}

fn report(name: &str, samples: &Array3<f64>) -> Result<(), Box<dyn Error>> {
    let pooled = samples.to_shape((SAMPLE_SIZE, 2))?;
    let mean = pooled
        .mean_axis(Axis(0))
        .ok_or("cannot take the mean of zero samples")?;
    let var = pooled.var_axis(Axis(0), 1.0);
    let rhat = stats::rhat(samples)?;
    let acceptance = stats::acceptance_rate(&samples.index_axis(Axis(0), 0).to_owned())?;

    println!("{name}");
    println!("  mean:       ({:.3}, {:.3})   expected (0, 0)", mean[0], mean[1]);
    println!("  variance:   ({:.4}, {:.4})   expected (0.0833, 0.0833)", var[0], var[1]);
    println!("  R-hat:      ({:.4}, {:.4})", rhat[0], rhat[1]);
    println!("  moves:      {:.1}%", 100.0 * acceptance);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let seed: u64 = thread_rng().gen();
    let square = Polytope::from_rows(
        &[vec![1.0, 0.0], vec![-1.0, 0.0], vec![0.0, 1.0], vec![0.0, -1.0]],
        &[0.5, 0.5, 0.5, 0.5],
    )?;

    let runs = [
        ("Ball Walk (delta = 0.2)", run(&square, BallWalk::new(0.2)?, seed)?),
        ("Hit-and-Run", run(&square, HitAndRun::default(), seed)?),
        ("Billiard Walk (tau = 0.5)", run(&square, BilliardWalk::new(0.5, None)?, seed)?),
    ];

    for (name, samples) in &runs {
        report(name, samples)?;
    }

    save(&runs)
}

#[cfg(feature = "csv")]
fn save(runs: &[(&str, Array3<f64>)]) -> Result<(), Box<dyn Error>> {
    for (file, (_, samples)) in ["ball_walk.csv", "hit_and_run.csv", "billiard_walk.csv"]
        .iter()
        .zip(runs)
    {
        save_csv(samples, file)?;
        println!("Saved samples to {file}");
    }
    Ok(())
}

#[cfg(not(feature = "csv"))]
fn save(_runs: &[(&str, Array3<f64>)]) -> Result<(), Box<dyn Error>> {
    Ok(())
}
