use clap::error::ErrorKind;
use clap::Parser;
use opus_torture::cli::Cli;
use opus_torture::error::EXIT_USAGE;
use opus_torture::{execute, TortureError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
        }
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(TortureError::from(err).exit_code());
        }
    };
    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(seed, "random impulses seeded");
    let mut rng = StdRng::seed_from_u64(seed);

    match execute(&config, &mut rng) {
        Ok(report) => {
            println!(
                "wrote {} frames to '{}'",
                report.frames_written,
                config.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
