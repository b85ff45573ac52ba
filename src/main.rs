/*!
 * Command-line interface for local-gitingest
 */

use std::env;
use std::io;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::error::ErrorKind;
use clap::CommandFactory;
use clap_complete::generate;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use local_gitingest::config::{Args, Config};
use local_gitingest::error::{Result, ResultExt};
use local_gitingest::git::is_repository_root;
use local_gitingest::report::{ReportFormat, Reporter, ScanReport};
use local_gitingest::scanner::Scanner;
use local_gitingest::writer::TextWriter;

fn main() -> ExitCode {
    let args = match Args::try_parse_normalized(env::args_os()) {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                return ExitCode::from(1);
            }
        },
    };

    init_logging(args.verbose);

    if let Some(shell) = args.generate {
        generate(shell, &mut Args::command(), "local-gitingest", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    let config = Config::from_args(args);
    match run(config) {
        Ok(output) => {
            println!("Successfully generated output to {}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Install the stderr log subscriber; `--verbose` overrides `RUST_LOG`
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Check the environment, scan, and write the snapshot
///
/// Returns the output path as displayed to the user.
fn run(mut config: Config) -> Result<String> {
    let cwd = env::current_dir().with_context(|| "Error getting current directory")?;
    config.target_dir = cwd.join(&config.target_dir);

    config.validate()?;

    // Checked before anything is written
    if !is_repository_root(&config.target_dir) {
        local_gitingest::bail!(
            NotARepository,
            "This tool must be run from the root directory of a Git repository ({})",
            config.target_dir.display()
        );
    }

    debug!(
        root = %config.target_dir.display(),
        output = %config.output_file.display(),
        "starting snapshot"
    );

    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos} files",
    ) {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📂 Scanning");

    let start_time = Instant::now();

    let mut scanner = Scanner::new(config.clone(), progress.clone());
    let scanned = scanner.scan();
    progress.finish_and_clear();
    let snapshot = scanned?;

    TextWriter::new(config.clone()).write(&snapshot)?;

    let output = config.output_file.display().to_string();
    if config.report {
        let report = ScanReport::from_statistics(
            output.clone(),
            start_time.elapsed(),
            scanner.get_statistics(),
        );
        Reporter::new(ReportFormat::ConsoleTable).print_report(&report);
    }

    Ok(output)
}
