//! rpdk-typescript - TypeScript language plugin for resource provider projects.
//!
//! Scaffolds projects, generates models from the resource schema, and packages
//! the built handler together with its sources.

use cfn_typescript_plugin::cli::{self, Args};
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    // Run CLI and get exit code
    let exit_code = match cli::run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}
