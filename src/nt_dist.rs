use std::collections::BTreeMap;

use rand::Rng;

use crate::genome::GenomeSet;

/// Empirical frequency of `{A,C,G,T}` across one or more sequences.
/// Ambiguity codes `R` and `Y` are excluded from counting. A `BTreeMap`
/// keeps byte iteration sorted, which is what makes `random()`
/// reproducible under a fixed seed regardless of hash-table layout.
#[derive(Debug, Clone, Default)]
pub struct NucDistro {
    counts: BTreeMap<u8, u64>,
    total: u64,
}

impl NucDistro {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a distribution by counting every sequence in `set`.
    pub fn from_genome_set(set: &GenomeSet) -> Self {
        let mut nd = Self::new();
        nd.count(set);
        nd
    }

    pub fn count(&mut self, set: &GenomeSet) {
        for seq in set.sequences() {
            for &nt in seq {
                if nt == b'R' || nt == b'Y' {
                    continue;
                }
                *self.counts.entry(nt).or_insert(0) += 1;
                self.total += 1;
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn counts(&self) -> &BTreeMap<u8, u64> {
        &self.counts
    }

    /// Draw a uniform `r in [0, total)` and return the first byte whose
    /// cumulative count strictly exceeds `r`, iterating in sorted byte
    /// order. Calling this on an empty distribution is a programming
    /// error, so it panics rather than returning a `Result`.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        assert!(self.total > 0, "NucDistro::random called on an empty distribution");
        let r = rng.gen_range(0..self.total);
        let mut cumulative = 0u64;
        for (&byte, &count) in self.counts.iter() {
            cumulative += count;
            if r < cumulative {
                return byte;
            }
        }
        unreachable!("cumulative count never exceeded r; counts/total invariant violated")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn excludes_ambiguity_codes() {
        let set = GenomeSet::from_raw_sequences(vec![("g".into(), b"ACGTRYRY".to_vec())]);
        let nd = NucDistro::from_genome_set(&set);
        assert_eq!(nd.total(), 4);
        assert_eq!(nd.counts().get(&b'R'), None);
        assert_eq!(nd.counts().get(&b'Y'), None);
    }

    #[test]
    fn random_is_deterministic_under_fixed_seed() {
        let set = GenomeSet::from_raw_sequences(vec![("g".into(), b"AAACCCGGGTTT".to_vec())]);
        let nd = NucDistro::from_genome_set(&set);
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let draws_a: Vec<u8> = (0..50).map(|_| nd.random(&mut rng_a)).collect();
        let draws_b: Vec<u8> = (0..50).map(|_| nd.random(&mut rng_b)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    #[should_panic(expected = "empty distribution")]
    fn random_on_empty_panics() {
        let nd = NucDistro::new();
        let mut rng = StdRng::seed_from_u64(0);
        nd.random(&mut rng);
    }
}
