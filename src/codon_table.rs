use std::collections::BTreeMap;

use lazy_static::lazy_static;

/// The standard genetic code, forward direction: codon -> amino acid (or
/// `*` for a stop). Carried over verbatim from the reference translation
/// table; this is data, not behavior, so there is nothing to redesign.
pub const CODON_TABLE: &[(&str, u8)] = &[
    ("TTT", b'F'),
    ("TTC", b'F'),
    ("TTA", b'L'),
    ("TTG", b'L'),
    ("CTT", b'L'),
    ("CTC", b'L'),
    ("CTA", b'L'),
    ("CTG", b'L'),
    ("ATT", b'I'),
    ("ATC", b'I'),
    ("ATA", b'I'),
    ("ATG", b'M'),
    ("GTT", b'V'),
    ("GTC", b'V'),
    ("GTA", b'V'),
    ("GTG", b'V'),
    ("TCT", b'S'),
    ("TCC", b'S'),
    ("TCA", b'S'),
    ("TCG", b'S'),
    ("CCT", b'P'),
    ("CCC", b'P'),
    ("CCA", b'P'),
    ("CCG", b'P'),
    ("ACT", b'T'),
    ("ACC", b'T'),
    ("ACA", b'T'),
    ("ACG", b'T'),
    ("GCT", b'A'),
    ("GCC", b'A'),
    ("GCA", b'A'),
    ("GCG", b'A'),
    ("TAT", b'Y'),
    ("TAC", b'Y'),
    ("TAA", b'*'),
    ("TAG", b'*'),
    ("CAT", b'H'),
    ("CAC", b'H'),
    ("CAA", b'Q'),
    ("CAG", b'Q'),
    ("AAT", b'N'),
    ("AAC", b'N'),
    ("AAA", b'K'),
    ("AAG", b'K'),
    ("GAT", b'D'),
    ("GAC", b'D'),
    ("GAA", b'E'),
    ("GAG", b'E'),
    ("TGT", b'C'),
    ("TGC", b'C'),
    ("TGA", b'*'),
    ("TGG", b'W'),
    ("CGT", b'R'),
    ("CGC", b'R'),
    ("CGA", b'R'),
    ("CGG", b'R'),
    ("AGT", b'S'),
    ("AGC", b'S'),
    ("AGA", b'R'),
    ("AGG", b'R'),
    ("GGT", b'G'),
    ("GGC", b'G'),
    ("GGA", b'G'),
    ("GGG", b'G'),
];

lazy_static! {
    /// codon (3 bytes) -> amino acid, for O(1) lookup during translation.
    pub static ref FORWARD: BTreeMap<[u8; 3], u8> = CODON_TABLE
        .iter()
        .map(|(codon, aa)| {
            let bytes = codon.as_bytes();
            ([bytes[0], bytes[1], bytes[2]], *aa)
        })
        .collect();

    /// amino acid -> synonymous codons, sorted lexicographically so that
    /// odometer enumeration in `Environment::find_alternatives` is
    /// deterministic.
    pub static ref REVERSE: BTreeMap<u8, Vec<[u8; 3]>> = {
        let mut map: BTreeMap<u8, Vec<[u8; 3]>> = BTreeMap::new();
        for (&codon, &aa) in FORWARD.iter() {
            map.entry(aa).or_default().push(codon);
        }
        for codons in map.values_mut() {
            codons.sort_unstable();
        }
        map
    };
}

/// Translate a single codon. Aligned sequences admit `{A,C,G,T,-,N,R,Y}`,
/// so a window can carry an ambiguity code or a gap outside the position
/// actually being mutated; an unrecognized triplet translates to `0`
/// (the zero value), mirroring the reference table's map-lookup
/// semantics rather than treating it as a fatal error.
pub fn translate_codon(codon: &[u8]) -> u8 {
    debug_assert_eq!(codon.len(), 3);
    FORWARD.get(&[codon[0], codon[1], codon[2]]).copied().unwrap_or(0)
}

/// Per-nucleotide translation: codon `3k` broadcasts its amino acid across
/// positions `3k, 3k+1, 3k+2`.
pub fn translate_broadcast(window: &[u8]) -> Vec<u8> {
    debug_assert_eq!(window.len() % 3, 0);
    let mut protein = vec![0u8; window.len()];
    for (codon, out) in window.chunks_exact(3).zip(protein.chunks_exact_mut(3)) {
        let aa = translate_codon(codon);
        out[0] = aa;
        out[1] = aa;
        out[2] = aa;
    }
    protein
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_codons() {
        assert_eq!(translate_codon(b"AAA"), b'K');
        assert_eq!(translate_codon(b"AAG"), b'K');
        assert_eq!(translate_codon(b"TAA"), b'*');
        assert_eq!(translate_codon(b"TGA"), b'*');
    }

    #[test]
    fn broadcast_repeats_amino_acid_across_codon() {
        let protein = translate_broadcast(b"AAATTTCCC");
        assert_eq!(protein, b"KKKFFFPPP");
    }

    #[test]
    fn reverse_table_is_sorted_and_covers_forward() {
        for codons in REVERSE.values() {
            let mut sorted = codons.clone();
            sorted.sort_unstable();
            assert_eq!(*codons, sorted);
        }
        let total: usize = REVERSE.values().map(|v| v.len()).sum();
        assert_eq!(total, CODON_TABLE.len());
    }

    #[test]
    fn lysine_has_two_synonymous_codons() {
        let k_codons = &REVERSE[&b'K'];
        assert_eq!(k_codons, &[*b"AAA", *b"AAG"]);
    }

    #[test]
    fn unknown_codon_translates_to_the_zero_value_instead_of_panicking() {
        assert_eq!(translate_codon(b"NNN"), 0);
        assert_eq!(translate_codon(b"A-T"), 0);
        assert_eq!(translate_codon(b"AAR"), 0);
    }
}
