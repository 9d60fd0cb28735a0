use rustc_hash::FxHashSet;

use crate::cached_search::CachedScanner;
use crate::environment::Environment;
use crate::errs::{SimError, SimResult};
use crate::genome::GenomeSet;
use crate::sites::Site;

/// Add one of `sites` somewhere in `set`'s first row, not at any position
/// in `not_at`, using at most `max_muts` nucleotide changes. Returns the
/// position it was added at.
pub fn add_site(
    set: &mut GenomeSet,
    sites: &'static [Site],
    not_at: &FxHashSet<usize>,
    max_muts: usize,
    rng: &mut impl rand::Rng,
) -> SimResult<usize> {
    let site = &sites[rng.gen_range(0..sites.len())];
    let m = site.pattern.len();
    let length = set.length();

    let mut try_add = |set: &mut GenomeSet, pos: usize| -> bool {
        if not_at.contains(&pos) {
            return false;
        }
        let env = match Environment::new(set, pos, m, 0) {
            Ok(env) => env,
            Err(_) => return false,
        };
        let (silent, num_muts) = env.replace(site.pattern);
        let accept = silent && num_muts <= max_muts;
        drop(env);
        if accept {
            set.row_mut(0)[pos..pos + m].copy_from_slice(site.pattern);
        }
        accept
    };

    let start = rng.gen_range(0..length);
    for pos in start..length {
        if try_add(set, pos) {
            return Ok(pos);
        }
    }
    for pos in 0..start {
        if try_add(set, pos) {
            return Ok(pos);
        }
    }
    Err(SimError::NoSlot)
}

/// Remove a site from somewhere in `set`, not at any position in
/// `not_at`, by overwriting it with a synonymous alternative. Scans
/// matches at `pos >= genome_start` first, then `pos < genome_start`, via
/// the cached scanner.
pub fn remove_site(
    set: &mut GenomeSet,
    search: &mut CachedScanner,
    not_at: &FxHashSet<usize>,
    rng: &mut impl rand::Rng,
) -> SimResult<usize> {
    let m = search.sites()[0].pattern.len();
    let length = set.length();
    let genome_start = rng.gen_range(0..length);

    // Rewind to the start of the cache before each call: a prior
    // `remove_site` call returns early on success, leaving the replay
    // cursor wherever it stopped, and this pass must see every cached
    // match regardless of where an earlier call left off.
    search.init(set, search.sites());

    let mut try_remove = |set: &mut GenomeSet, pos: usize, rng: &mut dyn rand::RngCore| -> bool {
        if not_at.contains(&pos) {
            return false;
        }
        let env = match Environment::new(set, pos, m, 0) {
            Ok(env) => env,
            Err(_) => return false,
        };
        let alternatives = env.find_alternatives(1);
        if alternatives.is_empty() {
            return false;
        }
        let alt = &alternatives[rng.gen_range(0..alternatives.len())];
        let window = alt.window.clone();
        drop(env);
        let window_start = set.orfs().codon_offset(pos).map(|(s, _)| s).unwrap_or(pos);
        set.row_mut(0)[window_start..window_start + window.len()].copy_from_slice(&window);
        true
    };

    for (pos, _) in search.by_ref() {
        if pos >= genome_start && try_remove(set, pos, rng) {
            return Ok(pos);
        }
    }
    search.init(set, search.sites());
    for (pos, _) in search.by_ref() {
        if pos < genome_start && try_remove(set, pos, rng) {
            return Ok(pos);
        }
    }
    Err(SimError::NoSite)
}

/// Try to silently remove `remove` sites and add `add` sites. Builds the
/// cached scanner once up front so the two phases share its memoized
/// positions; this relies on the cache staying valid because nothing
/// else mutates `set` during the call. Returns the number of edits
/// actually applied.
pub fn tamper(
    set: &mut GenomeSet,
    sites: &'static [Site],
    remove: usize,
    add: usize,
    rng: &mut impl rand::Rng,
) -> usize {
    let mut removed_at: FxHashSet<usize> = FxHashSet::default();
    let mut count = 0;

    let mut search = CachedScanner::new();
    search.init(set, sites);

    for _ in 0..remove {
        match remove_site(set, &mut search, &removed_at, rng) {
            Ok(pos) => {
                removed_at.insert(pos);
                count += 1;
            }
            Err(_) => break,
        }
    }

    for _ in 0..add {
        match add_site(set, sites, &removed_at, 1, rng) {
            Ok(_) => count += 1,
            Err(_) => break,
        }
    }

    count
}
