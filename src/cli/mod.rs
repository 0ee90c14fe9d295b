//! Command line interface for the TypeScript plugin.
//!
//! Library errors are wrapped in `anyhow` context here so the binary can
//! print the whole chain.

mod args;
mod commands;

pub use args::{Args, Command, InitArgs, PackageArgs, ProjectArgs};

use crate::reporter::Reporter;

/// Main CLI entry point
///
/// Returns the process exit code.
pub async fn run(args: Args) -> anyhow::Result<i32> {
    let reporter = Reporter::global();

    match args.command {
        Command::Init(init) => commands::init(init, reporter).await?,
        Command::Generate(project) => commands::generate(project, reporter).await?,
        Command::Package(package) => commands::package(package, reporter).await?,
    }

    Ok(0)
}
