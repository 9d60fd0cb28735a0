use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use crate::genome::GenomeSet;
use crate::mutate::count_mutations;
use crate::nt_dist::NucDistro;
use crate::trials::{run_spacing_trials, run_tamper_trials};
use crate::util::{create_out_directory, get_master_progress_bar};
use crate::writers::TrialResultWriter;

#[derive(Parser)]
#[command(name = "ggsim", about = "Monte-Carlo restriction-site statistics for viral genomes")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to file to write run log (JSON lines), in addition to stderr.
    #[clap(help_heading = "Logging Options")]
    #[arg(long, global = true)]
    log_filepath: Option<PathBuf>,
    /// Increase logging verbosity; repeatable (-v, -vv, -vvv).
    #[clap(help_heading = "Logging Options")]
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbosity: u8,
    /// Hide the progress bar.
    #[clap(help_heading = "Logging Options")]
    #[arg(long, default_value_t = false, global = true)]
    suppress_progress: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Monte-Carlo trial.
    #[command(subcommand)]
    Trial(TrialCommand),
    /// Run the internal property-based smoke checks and exit.
    SelfTest,
}

#[derive(Subcommand)]
enum TrialCommand {
    /// Spacing (Golden-Gate plausibility) trial.
    Spacing(SpacingTrialArgs),
    /// Tamper-labelling trial.
    Tamper(TamperTrialArgs),
}

#[derive(Args)]
#[command(arg_required_else_help = true)]
struct TrialCommonArgs {
    /// FASTA file containing the reference genome.
    #[clap(help_heading = "Input Options")]
    genome: PathBuf,
    /// ORF-list file (whitespace-separated `start end` pairs, 1-based inclusive).
    #[clap(help_heading = "Input Options")]
    orfs: PathBuf,

    /// Number of trials to run.
    #[clap(help_heading = "Trial Options")]
    #[arg(short = 'n', long, default_value_t = 10_000)]
    num_trials: usize,
    /// Mutations per mutant. 0 means "auto": count the silent mutations
    /// between `genome` and `--reference-alignment` and use that count.
    #[clap(help_heading = "Trial Options")]
    #[arg(short = 'm', long, default_value_t = 700)]
    num_muts: usize,
    /// Second aligned FASTA row used to resolve `--num-muts 0` ("auto").
    /// Required only when `--num-muts` is 0.
    #[clap(help_heading = "Trial Options")]
    #[arg(long)]
    reference_alignment: Option<PathBuf>,
    /// Worker thread count (default: available parallelism).
    #[clap(help_heading = "Trial Options")]
    #[arg(short = 'p', long)]
    threads: Option<usize>,
    /// Master RNG seed. Omitted means a process-entropy seed, logged at
    /// startup for reproducibility.
    #[clap(help_heading = "Trial Options")]
    #[arg(long)]
    seed: Option<u64>,
    /// Results file path.
    #[clap(help_heading = "Output Options")]
    #[arg(short = 'o', long, default_value = "results.txt")]
    out_path: PathBuf,
    /// Force overwrite of an existing results file.
    #[clap(help_heading = "Output Options")]
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Args)]
#[command(arg_required_else_help = true)]
struct SpacingTrialArgs {
    #[command(flatten)]
    common: TrialCommonArgs,
    /// Enable per-site silent-mutation counting against the reference.
    #[clap(help_heading = "Trial Options")]
    #[arg(short = 'c', long, default_value_t = false)]
    count_sites: bool,
}

#[derive(Args)]
#[command(arg_required_else_help = true)]
struct TamperTrialArgs {
    #[command(flatten)]
    common: TrialCommonArgs,
    /// Number of sites to move (add = remove = this many) per tampered trial.
    #[clap(help_heading = "Trial Options")]
    #[arg(long, default_value_t = 3)]
    edits: usize,
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(s) => s,
        None => {
            let s = rand::random();
            info!("no --seed given, using process-entropy seed {s}");
            s
        }
    }
}

fn resolve_threads(threads: Option<usize>) -> usize {
    threads.unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
}

fn resolve_num_muts(
    num_muts: usize,
    genome: &GenomeSet,
    reference_alignment: Option<&PathBuf>,
) -> anyhow::Result<usize> {
    if num_muts != 0 {
        return Ok(num_muts);
    }
    let reference_alignment = reference_alignment
        .context("--num-muts 0 requires --reference-alignment to auto-count mutations")?;
    let other = GenomeSet::load_fasta_only(reference_alignment)
        .with_context(|| format!("failed to load reference alignment {reference_alignment:?}"))?;
    let mut combined = genome.clone();
    combined.combine(&other);
    let (silent, non_silent) = count_mutations(&combined);
    info!(
        "auto mutation count from reference alignment: {silent} silent, {non_silent} non-silent"
    );
    Ok(silent)
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let _handle = crate::logging::init_logging(self.log_filepath.as_deref(), self.verbosity)?;

        match self.command {
            Command::Trial(TrialCommand::Spacing(args)) => run_spacing(args, self.suppress_progress),
            Command::Trial(TrialCommand::Tamper(args)) => run_tamper(args, self.suppress_progress),
            Command::SelfTest => crate::self_test::run(),
        }
    }
}

fn run_spacing(args: SpacingTrialArgs, suppress_progress: bool) -> anyhow::Result<()> {
    let common = args.common;
    create_out_directory(&common.out_path)?;
    let genome = GenomeSet::load(&common.genome, &common.orfs)
        .with_context(|| format!("failed to load genome {:?}", common.genome))?;
    let nd = NucDistro::from_genome_set(&genome);
    let num_muts = resolve_num_muts(common.num_muts, &genome, common.reference_alignment.as_ref())?;
    let seed = resolve_seed(common.seed);
    let threads = resolve_threads(common.threads);

    let progress = get_master_progress_bar(common.num_trials);
    if suppress_progress {
        progress.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    let mut writer = TrialResultWriter::spacing_file(&common.out_path, common.force)?;

    run_spacing_trials(
        &genome,
        &nd,
        common.num_trials,
        num_muts,
        args.count_sites,
        threads,
        seed,
        &progress,
        &mut writer,
    )?;
    progress.finish_and_clear();
    Ok(())
}

fn run_tamper(args: TamperTrialArgs, suppress_progress: bool) -> anyhow::Result<()> {
    let common = args.common;
    create_out_directory(&common.out_path)?;
    let genome = GenomeSet::load(&common.genome, &common.orfs)
        .with_context(|| format!("failed to load genome {:?}", common.genome))?;
    let nd = NucDistro::from_genome_set(&genome);
    let num_muts = resolve_num_muts(common.num_muts, &genome, common.reference_alignment.as_ref())?;
    let seed = resolve_seed(common.seed);
    let threads = resolve_threads(common.threads);

    if args.edits == 0 {
        warn!("--edits is 0; tamper trials will never apply a tamper edit");
    }

    let progress = get_master_progress_bar(common.num_trials);
    if suppress_progress {
        progress.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    let mut writer = TrialResultWriter::tamper_file(&common.out_path, common.force)?;

    run_tamper_trials(
        &genome,
        &nd,
        common.num_trials,
        num_muts,
        args.edits,
        threads,
        seed,
        &progress,
        &mut writer,
    )?;
    progress.finish_and_clear();
    Ok(())
}
