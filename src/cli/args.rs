//! Command line argument parsing.

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// TypeScript language plugin for resource provider projects
#[derive(Parser, Debug)]
#[command(
    name = "rpdk-typescript",
    version,
    about = "TypeScript language plugin for resource provider projects",
    long_about = "Scaffolds, generates and packages TypeScript resource provider projects.

Usage:
  rpdk-typescript init --type-name Org::Service::Resource
  rpdk-typescript generate
  rpdk-typescript package --output org-service-resource.zip

Exit code 0 = the requested files were written."
)]
pub struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project in the given directory
    Init(InitArgs),
    /// Regenerate src/models.ts from the resource schema
    Generate(ProjectArgs),
    /// Build the project and write the deployable archive
    Package(PackageArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ProjectArgs {
    /// Project root directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

#[derive(ClapArgs, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Resource type name, e.g. Org::Service::Resource
    #[arg(short, long, value_name = "TYPE")]
    pub type_name: String,

    /// Build without a container (not recommended for cross-platform packaging)
    #[arg(long)]
    pub no_docker: bool,
}

#[derive(ClapArgs, Debug)]
pub struct PackageArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Path of the archive to create
    ///
    /// Parent directories are created if missing. A partially written
    /// archive is removed when packaging fails.
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Build without a container, overriding the project setting
    #[arg(long)]
    pub no_docker: bool,

    /// Replace the build command configured for the project
    #[arg(long, value_name = "CMD", env = "RPDK_BUILD_COMMAND")]
    pub build_command: Option<String>,

    /// Shell used to run the build command
    #[arg(long, value_name = "PATH", env = "RPDK_SHELL", default_value = crate::package::build::DEFAULT_SHELL)]
    pub shell: PathBuf,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default `env_logger` filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_package_flags() {
        let args = Args::try_parse_from([
            "rpdk-typescript",
            "-vv",
            "package",
            "--root",
            "/proj",
            "--output",
            "out.zip",
            "--no-docker",
            "--build-command",
            "make",
        ])
        .unwrap();

        assert_eq!(args.log_filter(), "trace");
        match args.command {
            Command::Package(p) => {
                assert_eq!(p.project.root, PathBuf::from("/proj"));
                assert_eq!(p.output, PathBuf::from("out.zip"));
                assert!(p.no_docker);
                assert_eq!(p.build_command.as_deref(), Some("make"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn init_requires_type_name() {
        assert!(Args::try_parse_from(["rpdk-typescript", "init"]).is_err());
    }
}
