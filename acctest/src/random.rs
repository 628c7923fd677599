//! Random resource-name suffixes
//!
//! Parallel runs of the same test need distinct resource names. Suffixes are
//! drawn from a lowercase alphanumeric set that is valid for almost every
//! cloud resource name.

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Historical alphanumeric set used for test suffixes; note it has no `5`
pub const CHARSET_ALPHA_NUM: &str = "abcdefghijklmnopqrstuvwxyz012346789";

pub const CHARSET_ALPHA: &str = "abcdefghijklmnopqrstuvwxyz";

/// Samples characters uniformly from a fixed set
#[derive(Debug, Clone)]
pub struct RandomChars {
    chars: Vec<char>,
}

impl RandomChars {
    pub fn new(chars: &str) -> Self {
        Self {
            chars: chars.chars().collect(),
        }
    }

    pub fn alpha_num() -> Self {
        Self::new(CHARSET_ALPHA_NUM)
    }

    /// `n` characters from the thread RNG
    pub fn sample(&self, n: usize) -> String {
        self.sample_with(&mut rand::thread_rng(), n)
    }

    /// `n` characters from the given RNG
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> String {
        if self.chars.is_empty() {
            return String::new();
        }
        rng.sample_iter(self).take(n).collect()
    }
}

impl Distribution<char> for RandomChars {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        let index = rng.gen_range(0..self.chars.len());
        self.chars[index]
    }
}

/// Random alphanumeric string of length `n`
pub fn rand_string(n: usize) -> String {
    RandomChars::alpha_num().sample(n)
}

/// Deterministic generator for replayed runs
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
