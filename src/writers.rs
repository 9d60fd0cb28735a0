use std::fs::File;
use std::io::{BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result as AnyhowResult};

use crate::trials::TrialRecord;

/// A sink that accepts one result record at a time and reports how many
/// bytes it wrote, matching the reference crate's convention of
/// returning a running byte (or row) count so callers can drive a
/// progress counter off it.
pub trait OutWriter<T> {
    fn write(&mut self, item: T) -> AnyhowResult<u64>;
}

/// Whitespace-separated trial-result writer. Each trial mode has its own
/// header line and column layout, so the header is written once up
/// front at construction rather than recomputed per row.
pub struct TrialResultWriter<W: Write> {
    writer: BufWriter<W>,
}

fn spacing_header() -> &'static str {
    "# Results from a Spacing Trial\nname count max_length unique acceptable interleaved muts_in_sites total_sites total_singles added removed"
}

fn tamper_header() -> &'static str {
    "# Results from a Tamper Trial\nname tampered muts_in_sites total_sites total_singles"
}

impl<W: Write> TrialResultWriter<W> {
    fn with_header(mut writer: BufWriter<W>, header: &str) -> AnyhowResult<Self> {
        writeln!(writer, "{header}")?;
        Ok(Self { writer })
    }

    pub fn spacing(writer: BufWriter<W>) -> AnyhowResult<Self> {
        Self::with_header(writer, spacing_header())
    }

    pub fn tamper(writer: BufWriter<W>) -> AnyhowResult<Self> {
        Self::with_header(writer, tamper_header())
    }
}

impl TrialResultWriter<Stdout> {
    pub fn spacing_stdout() -> AnyhowResult<Self> {
        Self::spacing(BufWriter::new(std::io::stdout()))
    }

    pub fn tamper_stdout() -> AnyhowResult<Self> {
        Self::tamper(BufWriter::new(std::io::stdout()))
    }
}

impl TrialResultWriter<File> {
    fn new_path(path: &Path, force: bool, header: &str) -> AnyhowResult<Self> {
        if path.exists() && !force {
            return Err(anyhow!("refusing to write over existing file {path:?}"));
        }
        let file = File::create(path)?;
        Self::with_header(BufWriter::new(file), header)
    }

    pub fn spacing_file(path: &PathBuf, force: bool) -> AnyhowResult<Self> {
        Self::new_path(path, force, spacing_header())
    }

    pub fn tamper_file(path: &PathBuf, force: bool) -> AnyhowResult<Self> {
        Self::new_path(path, force, tamper_header())
    }
}

impl<W: Write> OutWriter<TrialRecord> for TrialResultWriter<W> {
    fn write(&mut self, item: TrialRecord) -> AnyhowResult<u64> {
        match item {
            TrialRecord::Spacing(r) => {
                writeln!(
                    self.writer,
                    "{} {} {} {} {} {} {} {} {} {} {}",
                    r.name,
                    r.count,
                    r.max_length,
                    r.unique,
                    r.acceptable,
                    r.interleaved,
                    r.muts_in_sites,
                    r.total_sites,
                    r.total_singles,
                    r.added,
                    r.removed
                )?;
            }
            TrialRecord::Tamper(r) => {
                writeln!(
                    self.writer,
                    "{} {} {} {} {}",
                    r.name, r.tampered, r.muts_in_sites, r.total_sites, r.total_singles
                )?;
            }
        }
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trials::SpacingTrialResult;

    #[test]
    fn spacing_row_has_nine_whitespace_separated_fields() {
        let mut buf = Vec::new();
        {
            let mut writer =
                TrialResultWriter::spacing(BufWriter::new(&mut buf)).unwrap();
            writer
                .write(TrialRecord::Spacing(SpacingTrialResult {
                    name: "genome".into(),
                    count: 3,
                    max_length: 7000,
                    unique: true,
                    acceptable: true,
                    interleaved: false,
                    muts_in_sites: 0,
                    total_sites: 0,
                    total_singles: 0,
                    added: 0,
                    removed: 0,
                }))
                .unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let data_line = text.lines().nth(1).unwrap();
        assert_eq!(data_line.split_whitespace().count(), 11);
    }

    #[test]
    fn header_is_written_before_any_row() {
        let mut buf = Vec::new();
        let writer = TrialResultWriter::tamper(BufWriter::new(&mut buf)).unwrap();
        drop(writer);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("# Results from a Tamper Trial"));
    }
}
