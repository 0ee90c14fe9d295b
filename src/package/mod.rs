//! Packaging of a built resource provider into a deployable archive.
//!
//! # Module Organization
//!
//! - [`archive`] - writing directory trees into zip archives
//! - [`build`] - composing and running the external build command
//! - [`checksum`] - SHA-256 of the produced archive
//! - [`orchestrator`] - the [`Packager`] pipeline tying the two together
//!
//! # Example
//!
//! ```no_run
//! use cfn_typescript_plugin::package::Packager;
//! use cfn_typescript_plugin::project::Project;
//! use cfn_typescript_plugin::reporter::Reporter;
//!
//! # async fn example() -> cfn_typescript_plugin::Result<()> {
//! let project = Project::load(".").await?;
//! let file = std::fs::File::create("handler.zip")?;
//! let mut archive = zip::ZipWriter::new(file);
//!
//! Packager::with_shell(Reporter::global())
//!     .package(&project, &mut archive)
//!     .await?;
//! archive.finish()?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod build;
pub mod checksum;
pub mod orchestrator;
mod tool_detection;

pub use archive::{write_tree, zip_tree};
pub use build::{BuildCommand, BuildExecutor, BuildFailure, BuildOutput, ShellExecutor};
pub use orchestrator::{PackageReport, PackageStage, Packager};

/// Build tool invoked when no override command is configured.
pub const BUILD_TOOL: &str = "sam";

/// Name of the main handler function; also its build output directory.
pub const HANDLER_FUNCTION: &str = "TypeFunction";

/// Archive entry holding the zipped handler build output.
pub const INNER_ARCHIVE_NAME: &str = "ResourceProvider.zip";
