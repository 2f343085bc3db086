use clap::Parser;
use sqlrun_cli::Cli;

fn main() -> miette::Result<()> {
    Cli::parse().run()
}
