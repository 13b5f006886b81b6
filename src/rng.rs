use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the solver's random choices. The solver owns its source instead
/// of going through a process-wide generator, so a fixed seed reproduces a
/// run exactly and tests can substitute a scripted sequence.
pub trait RandomSource {
    /// Flips a coin that lands on heads with probability p. Returns true iff
    /// heads.
    fn flip(&mut self, p: f64) -> bool;

    /// Uniform draw from [0, n) without modulo bias.
    fn uniform(&mut self, n: usize) -> usize;
}

pub struct SolverRng {
    rng: SmallRng,
    seed: u64,
}

impl SolverRng {
    /// A seed of 0 is replaced by the wall clock.
    pub fn from_seed(seed: u64) -> SolverRng {
        let seed = if seed == 0 {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(1)
        } else {
            seed
        };
        SolverRng {
            rng: SmallRng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed actually in use, after wall-clock substitution.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SolverRng {
    fn flip(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p)
    }

    fn uniform(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }
}
