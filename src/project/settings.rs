//! Plugin settings stored in the `settings` object of `.rpdk-config`.

use serde::{Deserialize, Serialize};

fn default_use_docker() -> bool {
    true
}

/// Typed view of the language plugin settings.
///
/// # Examples
///
/// ```
/// use cfn_typescript_plugin::project::PluginSettings;
///
/// let settings: PluginSettings = serde_json::from_str("{}").unwrap();
/// assert!(settings.use_docker);
/// assert!(settings.build_command.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSettings {
    /// Run the build inside a container (`--use-container`).
    ///
    /// Default: true
    #[serde(default = "default_use_docker")]
    pub use_docker: bool,

    /// Replaces the synthesized `sam build ...` command entirely.
    ///
    /// The container flag and handler token are still appended.
    ///
    /// Default: None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            use_docker: default_use_docker(),
            build_command: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_keys_missing() {
        let settings: PluginSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, PluginSettings::default());
        assert!(settings.use_docker);
    }

    #[test]
    fn reads_camel_case_keys() {
        let settings: PluginSettings =
            serde_json::from_str(r#"{"useDocker": false, "buildCommand": "npx sam build"}"#)
                .unwrap();
        assert!(!settings.use_docker);
        assert_eq!(settings.build_command.as_deref(), Some("npx sam build"));
    }

    #[test]
    fn omits_absent_build_command() {
        let json = serde_json::to_string(&PluginSettings::default()).unwrap();
        assert_eq!(json, r#"{"useDocker":true}"#);
    }
}
