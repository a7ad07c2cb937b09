// src/main.rs
use std::process::exit;

use clap::Parser;
use tracing::{error, info};

use riptide::cli::{Args, EXIT_USAGE};
use riptide::core::ScanStatus;
use riptide::error::RiptideError;
use riptide::{reporting, AppConfig, Context};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    if let Err(e) = args.validate() {
        error!("{}", e);
        exit(EXIT_USAGE);
    }

    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            exit(1);
        }
    };

    let context = match Context::new(
        config,
        Args::parse_name_filter(&args.detectors_include),
        Args::parse_name_filter(&args.detectors_exclude),
    ) {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            exit(1);
        }
    };

    // Advisory dump mode writes the installed advisories and skips the scan.
    if let Some(path) = &args.dump_advisories {
        match reporting::dump_advisories(&context.registry, path) {
            Ok(()) => {
                info!("Advisories written to {}", path.display());
                exit(0);
            }
            Err(e) => {
                error!("{}", e);
                exit(1);
            }
        }
    }

    let target = match args.build_target().await {
        Ok(target) => target,
        Err(e @ RiptideError::InvalidArgument { .. }) => {
            error!("{}", e);
            exit(EXIT_USAGE);
        }
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    };

    let results = context.workflow().run(&target).await;

    if let Some(path) = &args.output {
        if let Err(e) = reporting::write_scan_results(&results, path) {
            error!("{}", e);
        }
    }
    reporting::print_summary(&results);

    exit(match results.status {
        ScanStatus::Succeeded => 0,
        ScanStatus::Failed => 1,
        ScanStatus::PartiallySucceeded => 2,
    });
}
