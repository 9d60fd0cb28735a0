use rustc_hash::FxHashSet;

use crate::environment::Environment;
use crate::genome::GenomeSet;
use crate::nt_dist::NucDistro;

/// Attempt to apply a single silent substitution at `pos` in row 0 of
/// `set`. Returns `true` and commits the change iff `pos` is inside an
/// ORF and a replacement base exists that leaves every touched codon's
/// amino acid unchanged. Written as a free function with explicit state
/// rather than a closure capturing loop variables.
fn try_mutate_silent(
    set: &mut GenomeSet,
    nd: &NucDistro,
    rng: &mut impl rand::Rng,
    done: &FxHashSet<usize>,
    pos: usize,
) -> bool {
    if done.contains(&pos) {
        return false;
    }

    let existing = set.row(0)[pos];
    let silent = {
        let env = match Environment::new(set, pos, 1, 0) {
            Ok(env) => env,
            Err(_) => return false,
        };
        let mut replacement;
        loop {
            replacement = nd.random(rng);
            if replacement != existing {
                break;
            }
        }
        let (silent, _) = env.replace(&[replacement]);
        silent.then_some(replacement)
    };

    match silent {
        Some(replacement) => {
            set.row_mut(0)[pos] = replacement;
            true
        }
        None => false,
    }
}

/// Introduce up to `n` distinct silent single-nucleotide substitutions
/// into `set`'s first row, positions sampled from a random start with a
/// wrap-around scan. Returns the number actually applied.
pub fn mutate_silent(
    set: &mut GenomeSet,
    nd: &NucDistro,
    n: usize,
    rng: &mut impl rand::Rng,
) -> usize {
    let length = set.length();
    if length == 0 {
        return 0;
    }
    let mut done: FxHashSet<usize> = FxHashSet::default();

    let mut applied = 0;
    'mutations: while applied < n {
        let start = rng.gen_range(0..length);

        for p in start..length {
            if try_mutate_silent(set, nd, rng, &done, p) {
                done.insert(p);
                applied += 1;
                continue 'mutations;
            }
        }
        for p in 0..start {
            if try_mutate_silent(set, nd, rng, &done, p) {
                done.insert(p);
                applied += 1;
                continue 'mutations;
            }
        }

        // A full wrap completed without finding anywhere new to mutate.
        break;
    }
    applied
}

/// Count silent vs. non-silent mismatches between the first two rows of
/// an alignment, ignoring indels (spec's supplemented `-m 0` "auto"
/// support, ported from `CountMutations` in the original `mutate.go`).
pub fn count_mutations(set: &GenomeSet) -> (usize, usize) {
    let mut silent = 0;
    let mut non_silent = 0;
    let a = set.row(0);
    let b = set.row(1);

    for i in 0..set.length() {
        if a[i] == b[i] || a[i] == b'-' || b[i] == b'-' {
            continue;
        }
        let env = match Environment::new(set, i, 1, 0) {
            Ok(env) => env,
            Err(_) => continue,
        };
        let (is_silent, _) = env.replace(&[b[i]]);
        if is_silent {
            silent += 1;
        } else {
            non_silent += 1;
        }
    }
    (silent, non_silent)
}
