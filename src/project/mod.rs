//! Project descriptor for a resource provider project.
//!
//! A [`Project`] is built once per invocation, either from a type name (for
//! `init`) or by loading `.rpdk-config` from the project root. It exposes the
//! type namespace, the typed [`PluginSettings`] and the paths every other
//! component derives from the root.

mod settings;

pub use settings::PluginSettings;

use crate::error::{ErrorExt, PluginError, Result};
use crate::reporter::Reporter;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::io::AsyncWriteExt;

/// Project configuration file name, relative to the project root.
pub const CONFIG_FILE: &str = ".rpdk-config";

/// Language identifier recorded in the project configuration.
pub const LANGUAGE: &str = "typescript";

static TYPE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]{2,64}::[a-zA-Z0-9]{2,64}::[a-zA-Z0-9]{2,64}$")
        .unwrap_or_else(|e| panic!("type name pattern is invalid: {e}"))
});

/// On-disk shape of `.rpdk-config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectConfig {
    type_name: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    entrypoint: Option<String>,
    #[serde(default)]
    test_entrypoint: Option<String>,
    #[serde(default)]
    settings: PluginSettings,
}

fn default_language() -> String {
    LANGUAGE.to_string()
}

/// Resolved resource provider project.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    type_name: String,
    namespace: Vec<String>,
    /// Language plugin settings.
    pub settings: PluginSettings,
    /// Lambda runtime identifier, set by `init`.
    pub runtime: Option<String>,
    /// Handler entry point, set by `init`.
    pub entrypoint: Option<String>,
    /// Test handler entry point, set by `init`.
    pub test_entrypoint: Option<String>,
}

impl Project {
    /// Creates a project descriptor for `type_name` rooted at `root`.
    ///
    /// A relative `root` is resolved against the current directory, so every
    /// derived path stays valid when a tool runs with the root as its
    /// working directory.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidTypeName`] unless the name has the form
    /// `Org::Service::Resource`.
    pub fn new(root: impl Into<PathBuf>, type_name: &str, settings: PluginSettings) -> Result<Self> {
        if !TYPE_NAME_RE.is_match(type_name) {
            return Err(PluginError::InvalidTypeName(type_name.to_string()));
        }

        let root = root.into();
        let root = std::path::absolute(&root).fs_context("resolving project root", &root)?;
        let namespace = type_name.split("::").map(str::to_lowercase).collect();

        Ok(Self {
            root,
            type_name: type_name.to_string(),
            namespace,
            settings,
            runtime: None,
            entrypoint: None,
            test_entrypoint: None,
        })
    }

    /// Loads the project rooted at `root` from its `.rpdk-config`.
    pub async fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config_path = root.join(CONFIG_FILE);

        let raw = match tokio::fs::read_to_string(&config_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PluginError::Config(format!(
                    "{} not found; run `init` first",
                    config_path.display()
                )));
            }
            Err(e) => return Err(e).fs_context("reading project configuration", &config_path),
        };

        let config: ProjectConfig = serde_json::from_str(&raw)?;
        if config.language != LANGUAGE {
            return Err(PluginError::Config(format!(
                "project language is '{}', expected '{}'",
                config.language, LANGUAGE
            )));
        }

        let mut project = Self::new(root, &config.type_name, config.settings)?;
        project.runtime = config.runtime;
        project.entrypoint = config.entrypoint;
        project.test_entrypoint = config.test_entrypoint;
        Ok(project)
    }

    /// Writes `.rpdk-config`, replacing any previous version.
    pub async fn save(&self) -> Result<()> {
        let config = ProjectConfig {
            type_name: self.type_name.clone(),
            language: LANGUAGE.to_string(),
            runtime: self.runtime.clone(),
            entrypoint: self.entrypoint.clone(),
            test_entrypoint: self.test_entrypoint.clone(),
            settings: self.settings.clone(),
        };
        let mut json = serde_json::to_string_pretty(&config)?;
        json.push('\n');

        let path = self.config_path();
        tokio::fs::write(&path, json)
            .await
            .fs_context("writing project configuration", &path)
    }

    /// Resource type name, e.g. `Org::Service::Resource`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Lowercased type name segments.
    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    /// Namespace joined with `-`, e.g. `org-service-resource`.
    pub fn hyphenated_name(&self) -> String {
        self.namespace.join("-")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding hand-authored and generated TypeScript source.
    pub fn package_root(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Directory the external build writes into.
    pub fn build_path(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Resource schema file.
    pub fn schema_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.hyphenated_name()))
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Writes `contents` to `path` only if the file does not exist yet.
    ///
    /// Returns `false` (and logs a warning) when an existing file was left alone.
    pub async fn safewrite(
        &self,
        path: &Path,
        contents: impl AsRef<[u8]>,
        reporter: &Reporter,
    ) -> Result<bool> {
        let open = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await;

        let mut file = match open {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                reporter.warn(format_args!(
                    "File already exists, not overwriting '{}'",
                    path.display()
                ));
                return Ok(false);
            }
            Err(e) => return Err(e).fs_context("creating file", path),
        };

        file.write_all(contents.as_ref())
            .await
            .fs_context("writing file", path)?;
        file.flush().await.fs_context("flushing file", path)?;
        Ok(true)
    }

    /// Writes `contents` to `path`, replacing any existing file.
    pub async fn overwrite(&self, path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
        tokio::fs::write(path, contents)
            .await
            .fs_context("writing file", path)
    }
}
