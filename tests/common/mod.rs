use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Seeded Gaussian work samples, the synthetic stand-in for a simulated window.
pub fn gaussian_work(mean: f64, std_dev: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(mean, std_dev).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

/// Negated Gaussian samples, as produced by the reverse leg of a symmetric window.
pub fn negated_gaussian_work(mean: f64, std_dev: f64, n: usize, seed: u64) -> Vec<f64> {
    gaussian_work(mean, std_dev, n, seed)
        .into_iter()
        .map(|w| -w)
        .collect()
}
