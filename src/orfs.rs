use std::io::BufRead;
use std::ops::Range;

use derive_new::new;

use crate::errs::{SimError, SimResult};

/// A half-open `[start, end)` open reading frame, 0-based. Non-overlapping
/// and typically sorted, but neither is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Orf {
    pub start: usize,
    pub end: usize,
}

impl Orf {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Ordered set of ORFs for one genome. Lookup is a linear scan: ORFs
/// number in the dozens for a viral genome, so this is not a performance
/// concern.
#[derive(Debug, Clone, Default)]
pub struct OrfIndex {
    orfs: Vec<Orf>,
}

impl OrfIndex {
    pub fn new(orfs: Vec<Orf>) -> Self {
        Self { orfs }
    }

    pub fn orfs(&self) -> &[Orf] {
        &self.orfs
    }

    /// Return `(codon_start, offset_in_codon)` for the first ORF
    /// containing `pos`, or `SimError::OutsideOrf` if none does.
    pub fn codon_offset(&self, pos: usize) -> SimResult<(usize, usize)> {
        for orf in &self.orfs {
            if pos >= orf.start && pos < orf.end {
                let rel = pos - orf.start;
                return Ok((orf.start + (rel / 3) * 3, rel % 3));
            }
        }
        Err(SimError::OutsideOrf(pos))
    }

    /// Parse whitespace-separated `start end` pairs, one per line,
    /// 1-based inclusive. `start` is converted to 0-based;
    /// `end` is left as-is, which is exclusive in 0-based coordinates.
    pub fn parse<R: BufRead>(reader: R) -> SimResult<Self> {
        let mut orfs = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let parse_field = |f: Option<&str>| -> SimResult<usize> {
                f.and_then(|s| s.parse::<usize>().ok()).ok_or_else(|| {
                    SimError::ParseError {
                        where_: format!("ORF line {}", lineno + 1),
                        reason: format!("expected `start end`, got `{line}`"),
                    }
                })
            };
            let start = parse_field(fields.next())?;
            let end = parse_field(fields.next())?;
            if start == 0 {
                return Err(SimError::ParseError {
                    where_: format!("ORF line {}", lineno + 1),
                    reason: "1-based start must be >= 1".to_string(),
                });
            }
            orfs.push(Orf { start: start - 1, end });
        }
        Ok(Self::new(orfs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(start: usize, end: usize) -> OrfIndex {
        OrfIndex::new(vec![Orf { start, end }])
    }

    #[test]
    fn codon_offset_boundary_scenarios() {
        let idx = single(10, 100);
        assert_eq!(idx.codon_offset(10).unwrap(), (10, 0));
        assert_eq!(idx.codon_offset(12).unwrap(), (10, 2));
        assert_eq!(idx.codon_offset(13).unwrap(), (13, 0));
        assert!(matches!(idx.codon_offset(9), Err(SimError::OutsideOrf(9))));
    }

    #[test]
    fn parse_converts_to_0_based_start() {
        let text = "11 20\n101 110\n";
        let idx = OrfIndex::parse(text.as_bytes()).unwrap();
        assert_eq!(idx.orfs(), &[Orf { start: 10, end: 20 }, Orf { start: 100, end: 110 }]);
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        let text = "not a number\n";
        assert!(OrfIndex::parse(text.as_bytes()).is_err());
    }
}
