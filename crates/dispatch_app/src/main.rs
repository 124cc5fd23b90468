//! `solver-dispatch`: runs one solver invocation per input file through the
//! cluster scheduler and leaves one log per input.
mod cli;
mod config;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use dispatch_engine::{discover_inputs, ensure_log_dir, Dispatcher, RunSummary, StdoutProgressSink};
use dispatch_logging::dispatch_info;

use crate::cli::{Cli, Parsed};

/// Run log kept next to the per-job logs; its name does not end in `_log.txt`.
const DISPATCH_LOG_NAME: &str = "dispatch.log";

fn main() -> ExitCode {
    let cli = match cli::parse(std::env::args_os()) {
        Parsed::Run(cli) => cli,
        Parsed::Exit(code) => return code,
    };

    match run(cli) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<RunSummary> {
    let profile = config::load_profile(&cli.profile)?;
    let log_dir = profile.log_dir();
    ensure_log_dir(&log_dir)
        .with_context(|| format!("preparing log directory {}", log_dir.display()))?;
    logging::initialize(&log_dir.join(DISPATCH_LOG_NAME));
    dispatch_info!(
        "Profile {:?} loaded from {}",
        profile.name,
        cli.profile.display()
    );

    let hosts_file = cli.hosts.clone().or_else(|| profile.hosts_file.clone());
    let hosts = config::load_hosts(hosts_file.as_deref());
    let inputs = discover_inputs(&profile)?;
    dispatch_info!("Discovered {} input files", inputs.len());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let dispatcher = Dispatcher::from_profile(
        &profile,
        cli.parallelism(),
        hosts,
        Arc::new(StdoutProgressSink),
    );
    let summary = runtime.block_on(dispatcher.run(inputs))?;
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Processed {} files; logs in {}",
        summary.total,
        summary.log_dir.display()
    );
    if summary.skipped > 0 {
        println!("Skipped {} inputs with finished logs", summary.skipped);
    }
    if summary.unrecorded > 0 {
        println!(
            "{} jobs finished without a log being written; see {}",
            summary.unrecorded,
            summary.log_dir.join(DISPATCH_LOG_NAME).display()
        );
    }
}
