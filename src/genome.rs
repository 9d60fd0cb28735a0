use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result as AnyhowResult};
use bio::io::fasta::Reader as FastaReader;

use crate::errs::{SimError, SimResult};
use crate::orfs::OrfIndex;

const FASTA_LINE_WIDTH: usize = 60;

/// An ordered collection of equal-length aligned byte sequences, plus the
/// ORF index that applies to the first sequence by convention. Cloning
/// (`Clone`) produces an independent deep copy.
#[derive(Debug, Clone)]
pub struct GenomeSet {
    names: Vec<String>,
    nts: Vec<Vec<u8>>,
    orfs: OrfIndex,
}

impl GenomeSet {
    /// All sequences must share the same length; this is an invariant of
    /// the type, checked once at construction.
    pub fn new(names: Vec<String>, nts: Vec<Vec<u8>>, orfs: OrfIndex) -> Self {
        assert_eq!(names.len(), nts.len(), "one name per sequence");
        if let Some(first) = nts.first() {
            let len = first.len();
            assert!(
                nts.iter().all(|row| row.len() == len),
                "all sequences in a GenomeSet must share the same length"
            );
        }
        Self { names, nts, orfs }
    }

    /// Build a set without an ORF index, useful for components (like the
    /// base distribution) that only care about raw bytes.
    pub fn from_raw_sequences(seqs: Vec<(String, Vec<u8>)>) -> Self {
        let (names, nts): (Vec<_>, Vec<_>) = seqs.into_iter().unzip();
        Self::new(names, nts, OrfIndex::default())
    }

    pub fn sequences(&self) -> &[Vec<u8>] {
        &self.nts
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_genomes(&self) -> usize {
        self.nts.len()
    }

    /// Length shared by every row (0 if there are no rows).
    pub fn length(&self) -> usize {
        self.nts.first().map(Vec::len).unwrap_or(0)
    }

    pub fn orfs(&self) -> &OrfIndex {
        &self.orfs
    }

    pub fn row(&self, which: usize) -> &[u8] {
        &self.nts[which]
    }

    pub fn row_mut(&mut self, which: usize) -> &mut [u8] {
        &mut self.nts[which]
    }

    /// Append a deep copy of `other`'s rows to the end of this set.
    /// Aliasing the other set's rows by reference would require a
    /// lifetime-parameterized type threaded through the whole trial
    /// harness; `combine` only ever builds a short-lived two-row
    /// alignment for counting, so a deep copy of the (typically single)
    /// reference row is used instead.
    pub fn combine(&mut self, other: &GenomeSet) {
        for (name, row) in other.names.iter().zip(other.nts.iter()) {
            self.names.push(name.clone());
            self.nts.push(row.clone());
        }
    }

    /// Load an aligned sequence set from a FASTA file and an ORF-list
    /// file. The ORF index applies to the first sequence.
    pub fn load(fasta_path: impl AsRef<Path>, orfs_path: impl AsRef<Path>) -> SimResult<Self> {
        let orfs_file = File::open(orfs_path.as_ref())?;
        let orfs = OrfIndex::parse(std::io::BufReader::new(orfs_file))?;
        let (names, nts) = Self::load_fasta_rows(fasta_path)?;
        Ok(Self::new(names, nts, orfs))
    }

    /// Load an aligned sequence set from a bare FASTA file, with no ORF
    /// index (used for a second alignment row that only needs raw
    /// bytes, e.g. to auto-count mutations against a reference).
    pub fn load_fasta_only(fasta_path: impl AsRef<Path>) -> SimResult<Self> {
        let (names, nts) = Self::load_fasta_rows(fasta_path)?;
        Ok(Self::new(names, nts, OrfIndex::default()))
    }

    fn load_fasta_rows(fasta_path: impl AsRef<Path>) -> SimResult<(Vec<String>, Vec<Vec<u8>>)> {
        let reader = FastaReader::from_file(fasta_path.as_ref())?;
        let mut names = Vec::new();
        let mut nts = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| SimError::ParseError {
                where_: format!("{:?}", fasta_path.as_ref()),
                reason: e.to_string(),
            })?;
            let name = match record.desc() {
                Some(desc) => format!("{} {}", record.id(), desc),
                None => record.id().to_string(),
            };
            names.push(name);
            nts.push(record.seq().to_vec());
        }

        if nts.is_empty() {
            return Err(SimError::ParseError {
                where_: format!("{:?}", fasta_path.as_ref()),
                reason: "FASTA file contained no sequences".to_string(),
            });
        }
        let len = nts[0].len();
        if nts.iter().any(|row| row.len() != len) {
            return Err(SimError::ParseError {
                where_: format!("{:?}", fasta_path.as_ref()),
                reason: "sequences in an aligned set must share one length".to_string(),
            });
        }

        Ok((names, nts))
    }

    /// Write the `which`-th sequence as FASTA, one header line `>name`
    /// then sequence bytes wrapped at 60 columns. The final,
    /// possibly-short, line is preserved as-is.
    pub fn save(&self, which: usize, path: impl AsRef<Path>) -> AnyhowResult<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("failed to create {:?}", path.as_ref()))?;
        let mut w = BufWriter::new(file);
        writeln!(w, ">{}", self.names[which])?;
        let seq = &self.nts[which];
        for chunk in seq.chunks(FASTA_LINE_WIDTH) {
            w.write_all(chunk)?;
            w.write_all(b"\n")?;
        }
        w.flush()?;
        Ok(())
    }
}
