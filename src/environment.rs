use crate::codon_table::{translate_broadcast, REVERSE};
use crate::errs::SimResult;
use crate::genome::GenomeSet;

/// Round `x` up to the next multiple of 3.
fn ceil3(x: usize) -> usize {
    (x + 2) / 3 * 3
}

/// The codon-aligned window completely containing a subsequence
/// `[pos, pos+n)` of one row of a `GenomeSet`. Borrows into the
/// underlying sequence bytes; short-lived, never outlives the silence
/// check it was built for.
pub struct Environment<'g> {
    window: &'g [u8],
    protein: Vec<u8>,
    offset: usize,
    n: usize,
}

/// A synonymous alternative to a subsequence's window, returned by
/// `Environment::find_alternatives`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub edit_distance: usize,
    pub window: Vec<u8>,
}

impl<'g> Environment<'g> {
    /// Build the environment covering `[pos, pos+n)` in row `which` of
    /// `set`. Fails with `SimError::OutsideOrf` if `pos` is not inside
    /// any ORF.
    ///
    /// `window_len = ceil3(offset_in_codon + n)`. A tempting-looking
    /// alternative, `ceil3(3 - offset + n)`, overcounts the window by a
    /// full codon whenever `offset == 0` and is wrong.
    pub fn new(set: &'g GenomeSet, pos: usize, n: usize, which: usize) -> SimResult<Self> {
        let (codon_start, offset_in_codon) = set.orfs().codon_offset(pos)?;
        let window_start = codon_start;
        let window_len = ceil3(offset_in_codon + n);
        let row = set.row(which);
        let window = &row[window_start..window_start + window_len];
        let protein = translate_broadcast(window);
        Ok(Self { window, protein, offset: offset_in_codon, n })
    }

    /// The original subsequence, `window[offset..offset+n]`.
    pub fn subsequence(&self) -> &[u8] {
        &self.window[self.offset..self.offset + self.n]
    }

    /// Per-nucleotide translation of the subsequence.
    pub fn protein(&self) -> &[u8] {
        &self.protein[self.offset..self.offset + self.n]
    }

    pub fn window(&self) -> &[u8] {
        self.window
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Would replacing the subsequence with `replacement` preserve every
    /// amino acid in the window? Returns `(silent, edit_distance)`: the
    /// second element counts positions where `replacement[i] !=
    /// subsequence[i]`, independent of silence. The silence test
    /// short-circuits on the first amino-acid change.
    pub fn replace(&self, replacement: &[u8]) -> (bool, usize) {
        debug_assert_eq!(replacement.len(), self.n);
        let edit_distance =
            self.subsequence().iter().zip(replacement).filter(|(a, b)| a != b).count();

        let mut scratch = self.window.to_vec();
        scratch[self.offset..self.offset + self.n].copy_from_slice(replacement);

        let mut silent = true;
        for (original_codon, new_codon) in
            self.window.chunks_exact(3).zip(scratch.chunks_exact(3))
        {
            if crate::codon_table::translate_codon(original_codon)
                != crate::codon_table::translate_codon(new_codon)
            {
                silent = false;
                break;
            }
        }
        (silent, edit_distance)
    }

    /// Enumerate every synonymous window: an odometer over the reverse
    /// codon table, one "digit" per codon position in the window. A
    /// candidate is accepted iff it agrees with the original window
    /// strictly outside `[offset, offset+n)` and differs inside that
    /// range by `1 <= d <= max_muts` substitutions. Sorted ascending by
    /// edit distance; ties keep odometer order.
    ///
    /// A flanking codon carrying an ambiguity code or gap (`N`, `-`)
    /// translates to no known amino acid, so no synonymous codon set
    /// exists for it either; such a window simply has no alternatives.
    pub fn find_alternatives(&self, max_muts: usize) -> Vec<Alternative> {
        let num_codons = self.window.len() / 3;
        let codon_choices: Option<Vec<&Vec<[u8; 3]>>> = (0..num_codons)
            .map(|i| {
                let codon = &self.window[i * 3..i * 3 + 3];
                let aa = crate::codon_table::translate_codon(codon);
                REVERSE.get(&aa)
            })
            .collect();
        let Some(codon_choices) = codon_choices else {
            return Vec::new();
        };

        let mut results = Vec::new();
        let mut indices = vec![0usize; num_codons];
        loop {
            let mut candidate = Vec::with_capacity(self.window.len());
            for (i, &choice) in indices.iter().enumerate() {
                candidate.extend_from_slice(&codon_choices[i][choice]);
            }

            if candidate[..self.offset] == self.window[..self.offset]
                && candidate[self.offset + self.n..] == self.window[self.offset + self.n..]
            {
                let d = candidate[self.offset..self.offset + self.n]
                    .iter()
                    .zip(&self.window[self.offset..self.offset + self.n])
                    .filter(|(a, b)| a != b)
                    .count();
                if d >= 1 && d <= max_muts {
                    results.push(Alternative { edit_distance: d, window: candidate });
                }
            }

            // Odometer increment, least-significant digit first.
            let mut carry = true;
            for (i, idx) in indices.iter_mut().enumerate() {
                if !carry {
                    break;
                }
                *idx += 1;
                if *idx >= codon_choices[i].len() {
                    *idx = 0;
                } else {
                    carry = false;
                }
            }
            if carry {
                break;
            }
        }

        results.sort_by_key(|alt| alt.edit_distance);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orfs::{Orf, OrfIndex};

    fn env_set(seq: &[u8], orf_end: usize) -> GenomeSet {
        GenomeSet::new(
            vec!["g".into()],
            vec![seq.to_vec()],
            OrfIndex::new(vec![Orf { start: 0, end: orf_end }]),
        )
    }

    #[test]
    fn window_len_is_at_least_offset_plus_n_and_multiple_of_3() {
        for offset in 0..3 {
            for n in 1..5 {
                let len = ceil3(offset + n);
                assert!(len >= offset + n);
                assert_eq!(len % 3, 0);
            }
        }
    }

    #[test]
    fn silence_at_wobble_position() {
        let set = env_set(b"AAATTTCCC", 9);
        let env = Environment::new(&set, 2, 1, 0).unwrap();
        assert_eq!(env.subsequence(), b"A");
        let (silent, d) = env.replace(b"G");
        assert_eq!((silent, d), (true, 1));
    }

    #[test]
    fn non_silent_replacement_at_first_codon_position() {
        let set = env_set(b"AAATTTCCC", 9);
        let env = Environment::new(&set, 0, 1, 0).unwrap();
        let (silent, d) = env.replace(b"C");
        assert_eq!((silent, d), (false, 1));
    }

    #[test]
    fn replace_with_original_bytes_is_silent_with_zero_edits() {
        let set = env_set(b"AAATTTCCC", 9);
        let env = Environment::new(&set, 3, 3, 0).unwrap();
        let subseq = env.subsequence().to_vec();
        assert_eq!(env.replace(&subseq), (true, 0));
    }

    #[test]
    fn find_alternatives_for_lysine_codon() {
        // AAG = K, the window here is exactly one codon.
        let set = env_set(b"AAG", 3);
        let env = Environment::new(&set, 0, 3, 0).unwrap();
        let alts = env.find_alternatives(3);
        assert_eq!(alts, vec![Alternative { edit_distance: 1, window: b"AAA".to_vec() }]);
    }

    #[test]
    fn find_alternatives_respects_edit_distance_bounds() {
        let set = env_set(b"AAG", 3);
        let env = Environment::new(&set, 0, 3, 0).unwrap();
        for alt in env.find_alternatives(1) {
            assert!(alt.edit_distance >= 1 && alt.edit_distance <= 1);
        }
        let sorted_check = env.find_alternatives(3);
        let mut prev = 0;
        for alt in &sorted_check {
            assert!(alt.edit_distance >= prev);
            prev = alt.edit_distance;
        }
    }

    #[test]
    fn find_alternatives_translations_match_original_protein() {
        let set = env_set(b"AAATTTCCC", 9);
        let env = Environment::new(&set, 0, 9, 0).unwrap();
        let original_protein = env.protein().to_vec();
        for alt in env.find_alternatives(9) {
            let protein = translate_broadcast(&alt.window);
            assert_eq!(protein, original_protein);
        }
    }

    #[test]
    fn outside_orf_is_an_error() {
        let set = env_set(b"AAATTTCCC", 6);
        assert!(Environment::new(&set, 7, 1, 0).is_err());
    }
}
