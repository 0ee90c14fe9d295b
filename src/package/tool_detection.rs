//! External build tool detection.

use super::BUILD_TOOL;
use crate::reporter::Reporter;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Location of the build tool on `PATH`, looked up once per process.
static BUILD_TOOL_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| which::which(BUILD_TOOL).ok());

/// Checks whether the default build tool can be found.
///
/// Only used to warn early; a missing tool still surfaces as a build failure.
pub fn build_tool_available(reporter: &Reporter) -> bool {
    match BUILD_TOOL_PATH.as_ref() {
        Some(path) => {
            reporter.debug(format_args!("Found {BUILD_TOOL} at: {}", path.display()));
            true
        }
        None => {
            reporter.debug(format_args!("{BUILD_TOOL} not found in PATH"));
            false
        }
    }
}
