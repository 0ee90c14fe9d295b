//! Subcommand implementations.

mod generate;
mod init;
mod package;

pub use generate::generate;
pub use init::init;
pub use package::package;
