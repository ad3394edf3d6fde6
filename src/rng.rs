use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Stream used by the search, kept apart from the formula generator's stream 0
/// so the same seed does not correlate clauses with initial assignments.
const SEARCH_STREAM: u64 = 1;

/// Generator owned by a single solve invocation.
pub fn search_rng(seed: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(SEARCH_STREAM);
    rng
}

/// Seed of the `sample`-th run of a sweep configuration.
pub fn sample_seed(base: u64, sample: usize) -> u64 {
    base.wrapping_add(sample as u64)
}

/// Uniform assignment over `1..=num_vars`; slot 0 is unused and left false.
pub fn random_assignment(num_vars: u32, rng: &mut ChaCha8Rng) -> Vec<bool> {
    let mut assignment = vec![false; num_vars as usize + 1];
    for value in assignment.iter_mut().skip(1) {
        *value = rng.random::<bool>();
    }
    assignment
}
