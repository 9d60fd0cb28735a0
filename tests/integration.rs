use std::io::Write;
use std::path::Path;
use std::process::Command;

fn ggsim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ggsim"))
}

#[test]
fn self_test_subcommand_exits_successfully() {
    let status = ggsim().arg("self-test").status().expect("failed to run ggsim self-test");
    assert!(status.success());
}

#[test]
fn spacing_trial_end_to_end_writes_a_results_file() {
    let dir = tempfile::tempdir().unwrap();
    let fasta_path = dir.path().join("genome.fasta");
    let orfs_path = dir.path().join("genome.orfs");
    let out_path = dir.path().join("results.txt");

    // A 4-fold-degenerate Gly-rich genome so silent mutations are always
    // available, wrapped in a single ORF spanning the whole sequence.
    let seq: String = (0..900)
        .map(|i| match i % 3 {
            0 | 1 => 'G',
            _ => ['A', 'C', 'G', 'T'][i % 4],
        })
        .collect();
    write_fasta(&fasta_path, "genome", &seq);
    std::fs::write(&orfs_path, "1 900\n").unwrap();

    let status = ggsim()
        .args([
            "trial",
            "spacing",
            fasta_path.to_str().unwrap(),
            orfs_path.to_str().unwrap(),
            "-n",
            "5",
            "-m",
            "10",
            "-p",
            "1",
            "--seed",
            "42",
            "-o",
            out_path.to_str().unwrap(),
            "--suppress-progress",
        ])
        .status()
        .expect("failed to run ggsim trial spacing");
    assert!(status.success());

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut lines = contents.lines();
    assert!(lines.next().unwrap().starts_with('#'));
    assert_eq!(lines.clone().count(), 5, "one data row per trial");
    for line in lines {
        assert_eq!(line.split_whitespace().count(), 9 + 2);
    }
}

fn write_fasta(path: &Path, name: &str, seq: &str) {
    let mut f = std::fs::File::create(path).unwrap();
    writeln!(f, ">{name}").unwrap();
    for chunk in seq.as_bytes().chunks(60) {
        f.write_all(chunk).unwrap();
        f.write_all(b"\n").unwrap();
    }
}
