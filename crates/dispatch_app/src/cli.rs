use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use dispatch_core::DEFAULT_PROFILE_PATH;

/// Dispatch one model-checking solver run per input file to the cluster.
#[derive(Debug, Parser)]
#[command(name = "solver-dispatch", disable_version_flag = true)]
pub struct Cli {
    /// Number of jobs running at the same time.
    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub jobs: u32,

    /// RON profile describing solver, inputs, scheduler and limits.
    #[arg(short = 'p', long = "profile", value_name = "FILE", default_value = DEFAULT_PROFILE_PATH)]
    pub profile: PathBuf,

    /// Host list file; overrides the profile's `hosts_file`.
    #[arg(long = "hosts", value_name = "FILE")]
    pub hosts: Option<PathBuf>,
}

impl Cli {
    pub fn parallelism(&self) -> usize {
        self.jobs as usize
    }
}

pub enum Parsed {
    Run(Cli),
    Exit(ExitCode),
}

/// Help exits 0; any other parse problem prints clap's message and exits 1.
pub fn parse<I, T>(args: I) -> Parsed
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Parsed::Run(cli),
        Err(err) => {
            let _ = err.print();
            Parsed::Exit(ExitCode::from(exit_code_for(err.kind())))
        }
    }
}

fn exit_code_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}
