/// Type-IIS restriction enzyme family a recognition site belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Enzyme {
    BsaI,
    BsmBI,
}

/// A 6-byte recognition site, its 4-byte sticky-end offsets relative to
/// the match position, and whether the sticky is read right-to-left.
/// The four canonical sites (both strands of BsaI and BsmBI) are
/// constants below.
#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub pattern: &'static [u8],
    pub sticky_start: isize,
    pub sticky_end: isize,
    pub reverse: bool,
    pub enzyme: Enzyme,
}

pub const RE_SITES: &[Site] = &[
    Site { pattern: b"CGTCTC", sticky_start: 1, sticky_end: 5, reverse: false, enzyme: Enzyme::BsmBI },
    Site { pattern: b"GAGACG", sticky_start: -11, sticky_end: -7, reverse: true, enzyme: Enzyme::BsmBI },
    Site { pattern: b"GGTCTC", sticky_start: 1, sticky_end: 5, reverse: false, enzyme: Enzyme::BsaI },
    Site { pattern: b"GAGACC", sticky_start: -11, sticky_end: -7, reverse: true, enzyme: Enzyme::BsaI },
];

/// Extract the sticky end for a match at `pos` using `site`, against row 0
/// of `nts`. Returns `None` if the offsets fall outside the sequence —
/// out-of-range extractions are simply ignored rather than treated as an
/// error. The slice is reversed but not complemented when `site.reverse`
/// is set: the comparison only needs to be internally consistent for
/// uniqueness testing, not biologically literal.
pub fn sticky_end(nts: &[u8], pos: usize, site: &Site) -> Option<Vec<u8>> {
    let start = pos as isize + site.sticky_start;
    let end = pos as isize + site.sticky_end;
    if start < 0 || end < start || end as usize > nts.len() {
        return None;
    }
    let mut slice = nts[start as usize..end as usize].to_vec();
    if site.reverse {
        slice.reverse();
    }
    Some(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_canonical_sites() {
        assert_eq!(RE_SITES.len(), 4);
        assert!(RE_SITES.iter().all(|s| s.pattern.len() == 6));
    }

    #[test]
    fn sticky_end_out_of_range_is_none() {
        let nts = b"GGTCTC";
        let site = RE_SITES[3]; // reverse site, offsets go negative
        assert_eq!(sticky_end(nts, 0, &site), None);
    }
}
