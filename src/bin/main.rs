use clap::Parser;
use gg_sim::cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
