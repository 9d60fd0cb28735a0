use crate::genome::GenomeSet;
use crate::search::Scanner;
use crate::sites::Site;

/// Memoizing wrapper around `Scanner`. The first call to
/// `init` runs the underlying scanner to completion and records every
/// `(pos, site)` it produces; every subsequent `init` against the same
/// data just rewinds the replay cursor to the start of that recorded
/// list instead of rescanning.
///
/// Every real caller in this crate (`Tamper::remove_site`/`add_site`)
/// always drains a `CachedScanner` to `is_end()` before re-initializing
/// it, so eagerly populating the whole cache inside `init` is
/// observationally identical to the reference design's "populate lazily
/// as `next()` is called, and mark it full once the scan reaches its
/// end" — it is simpler to reason about and test.
///
/// The cache is only as good as the promise that nothing mutates the
/// scanned bytes between `init` calls; the tamper driver relies on this
/// directly and it is not re-checked here.
#[derive(Default)]
pub struct CachedScanner {
    sites: Option<&'static [Site]>,
    cache: Vec<(usize, Site)>,
    cache_full: bool,
    replay_idx: usize,
}

impl CachedScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, set: &GenomeSet, sites: &'static [Site]) {
        if !self.cache_full {
            self.cache.clear();
            for (pos, site) in Scanner::new(set, sites) {
                self.cache.push((pos, *site));
            }
            self.cache_full = true;
        }
        self.sites = Some(sites);
        self.replay_idx = 0;
    }

    pub fn sites(&self) -> &'static [Site] {
        self.sites.expect("CachedScanner::init must be called before use")
    }

    pub fn is_end(&self) -> bool {
        self.replay_idx >= self.cache.len()
    }

    pub fn cached_positions(&self) -> &[(usize, Site)] {
        &self.cache
    }
}

impl Iterator for CachedScanner {
    type Item = (usize, Site);

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_end() {
            return None;
        }
        let item = self.cache[self.replay_idx];
        self.replay_idx += 1;
        Some(item)
    }
}
