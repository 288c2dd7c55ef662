use clap::{ArgAction, Parser};
use env_logger::{Builder, Env};
use log::error;
use namefix::cli::{RunOptions, print_banner, read_confirmation, run_cli};
use namefix::output::OutputFormatter;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "namefix",
    version,
    about = "Recursively lowercase and sanitize file and folder names"
)]
struct Cli {
    /// Directory whose contents are renamed (the directory itself keeps its name).
    root: PathBuf,

    /// Show what would be renamed without changing anything.
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes")]
    yes: bool,

    /// Configuration file (defaults to ./.namefixrc.toml, then ~/.config/namefix/config.toml).
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a JSON report of every decision to this file.
    #[arg(long = "report", value_name = "FILE")]
    report: Option<PathBuf>,

    /// Sets the level of verbosity (-v lists unchanged names, -vv adds debug logs).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    Builder::from_env(Env::default().default_filter_or(default_level)).init();

    print_banner(&cli.root);

    let proceed = if cli.dry_run || cli.yes {
        true
    } else {
        print!("Are you sure you want to proceed? (yes/no): ");
        if let Err(e) = io::stdout().flush() {
            error!("Could not flush stdout: {}", e);
        }
        match read_confirmation(io::stdin().lock()) {
            Ok(answer) => answer,
            Err(e) => {
                error!("Could not read confirmation: {}", e);
                false
            }
        }
    };

    let options = RunOptions {
        dry_run: cli.dry_run,
        proceed,
        verbose: cli.verbose > 0,
        config_path: cli.config,
        report_path: cli.report,
    };

    match run_cli(&cli.root, &options) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
