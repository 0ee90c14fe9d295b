//! Package assembly pipeline.
//!
//! This module provides the [`Packager`] that turns a project into the
//! archive layout the deployment host consumes:
//!
//! ```text
//! ResourceProvider.zip   <- zipped build/TypeFunction tree
//! src/handlers.ts        <- package root, relative to the project root
//! src/models.ts
//! ```

use std::fmt;
use std::io::{Seek, Write};
use std::path::Path;

use zip::ZipWriter;

use super::archive::{entry_options, write_tree, zip_tree};
use super::build::{BuildExecutor, ShellExecutor, build};
use super::{HANDLER_FUNCTION, INNER_ARCHIVE_NAME};
use crate::error::{ErrorExt, PluginError, Result};
use crate::project::Project;
use crate::reporter::Reporter;

/// Progress of a single [`Packager::package`] run.
///
/// Stages only move forward; a failure stops the run at the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PackageStage {
    NotStarted,
    ArtifactsCleared,
    Built,
    InnerPackaged,
    OuterPackaged,
    Done,
}

impl fmt::Display for PackageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::ArtifactsCleared => "artifacts cleared",
            Self::Built => "built",
            Self::InnerPackaged => "inner archive packaged",
            Self::OuterPackaged => "outer archive packaged",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// What a successful [`Packager::package`] run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    /// Size of the nested `ResourceProvider.zip` entry in bytes.
    pub handler_archive_size: usize,
    /// Number of package root files written next to it.
    pub source_files: usize,
}

/// Package orchestrator.
///
/// Owns the build executor and the reporter; callers must not run two
/// packagers against the same project at once, since both would own
/// `build/`.
#[derive(Debug)]
pub struct Packager<E = ShellExecutor> {
    executor: E,
    reporter: Reporter,
}

impl Packager<ShellExecutor> {
    /// Packager that runs builds through `/bin/bash`.
    pub fn with_shell(reporter: Reporter) -> Self {
        Self::new(ShellExecutor::default(), reporter)
    }
}

impl<E: BuildExecutor> Packager<E> {
    pub fn new(executor: E, reporter: Reporter) -> Self {
        Self { executor, reporter }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Builds the project and writes the deployable layout into `archive`.
    ///
    /// # Process
    ///
    /// 1. Remove `build/` (absent is fine)
    /// 2. Run the external build from the project root
    /// 3. Zip `build/TypeFunction` in memory
    /// 4. Store it as `ResourceProvider.zip`
    /// 5. Write `src/` with paths relative to the project root
    ///
    /// # Errors
    ///
    /// Stops at the first failing step. A failed build surfaces as
    /// [`PluginError::Downstream`] before anything is written to `archive`;
    /// filesystem trouble surfaces as an IO error.
    pub async fn package<W: Write + Seek>(
        &self,
        project: &Project,
        archive: &mut ZipWriter<W>,
    ) -> Result<PackageReport> {
        self.reporter.debug(format_args!("Package started"));

        let mut stage = PackageStage::NotStarted;
        let result = self.run(project, archive, &mut stage).await;

        match &result {
            Ok(_) => self.reporter.debug(format_args!("Package complete")),
            Err(e) => self
                .reporter
                .debug(format_args!("Package stopped at stage '{stage}': {e}")),
        }
        result
    }

    async fn run<W: Write + Seek>(
        &self,
        project: &Project,
        archive: &mut ZipWriter<W>,
        stage: &mut PackageStage,
    ) -> Result<PackageReport> {
        let root = project.root();
        let package_root = project.package_root();
        let build_path = project.build_path();

        self.remove_build_artifacts(&build_path).await?;
        self.advance(stage, PackageStage::ArtifactsCleared);

        build(
            &self.executor,
            root,
            project.settings.build_command.as_deref(),
            project.settings.use_docker,
            &self.reporter,
        )
        .await?;
        self.advance(stage, PackageStage::Built);

        let handler_dir = build_path.join(HANDLER_FUNCTION);
        let inner = tokio::task::spawn_blocking(move || zip_tree(&handler_dir))
            .await
            .map_err(|e| PluginError::Generic(format!("Handler archive task panicked: {e}")))??;
        self.advance(stage, PackageStage::InnerPackaged);

        archive.start_file(INNER_ARCHIVE_NAME, entry_options())?;
        archive
            .write_all(&inner)
            .fs_context("writing nested handler archive", INNER_ARCHIVE_NAME)?;
        let source_files = if tokio::fs::try_exists(&package_root)
            .await
            .fs_context("checking package root", &package_root)?
        {
            write_tree(&package_root, root, archive)?
        } else {
            self.reporter.debug(format_args!(
                "'{}' not found, packaging handler archive only",
                package_root.display()
            ));
            0
        };
        self.advance(stage, PackageStage::OuterPackaged);

        self.advance(stage, PackageStage::Done);
        Ok(PackageReport {
            handler_archive_size: inner.len(),
            source_files,
        })
    }

    fn advance(&self, stage: &mut PackageStage, next: PackageStage) {
        debug_assert!(next > *stage);
        self.reporter
            .trace(format_args!("package stage: {stage} -> {next}"));
        *stage = next;
    }

    /// Removes the build directory and everything in it.
    ///
    /// A missing directory is not an error.
    pub async fn remove_build_artifacts(&self, build_path: &Path) -> Result<()> {
        match tokio::fs::remove_dir_all(build_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.reporter.debug(format_args!(
                    "'{}' not found, skipping removal",
                    build_path.display()
                ));
                Ok(())
            }
            Err(e) => Err(e).fs_context("removing build artifacts", build_path),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::package::build::{BuildCommand, BuildOutput};
    use crate::project::PluginSettings;
    use crate::reporter::MemorySink;
    use std::future::Future;
    use std::io::Cursor;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Executor that records commands and fakes a build by writing files.
    #[derive(Default)]
    struct FakeBuild {
        exit_code: i32,
        outputs: Vec<(&'static str, &'static str)>,
        commands: Mutex<Vec<String>>,
    }

    impl BuildExecutor for FakeBuild {
        fn execute(
            &self,
            command: BuildCommand,
            working_dir: &Path,
        ) -> impl Future<Output = std::io::Result<BuildOutput>> + Send {
            self.commands.lock().unwrap().push(command.to_string());
            let result = self.outputs.iter().try_for_each(|(rel, contents)| {
                let path = working_dir.join(rel);
                std::fs::create_dir_all(path.parent().unwrap())?;
                std::fs::write(path, contents)
            });
            let status = ExitStatus::from_raw(self.exit_code << 8);
            async move {
                result?;
                Ok(BuildOutput {
                    status,
                    stdout: Vec::new(),
                    stderr: b"boom".to_vec(),
                })
            }
        }
    }

    fn project(root: &Path, use_docker: bool) -> Project {
        Project::new(
            root,
            "Org::Svc::Thing",
            PluginSettings {
                use_docker,
                build_command: None,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn removing_missing_build_dir_is_noop() {
        let dir = TempDir::new().unwrap();
        let sink = MemorySink::new();
        let packager = Packager::new(FakeBuild::default(), Reporter::new(sink.clone()));

        packager
            .remove_build_artifacts(&dir.path().join("build"))
            .await
            .unwrap();
        assert!(sink.contains("skipping removal"));
    }

    #[tokio::test]
    async fn stale_artifacts_are_removed_before_build() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("build/TypeFunction")).unwrap();
        std::fs::write(dir.path().join("build/TypeFunction/stale.js"), "old").unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();

        let fake = FakeBuild {
            outputs: vec![("build/TypeFunction/index.js", "new")],
            ..Default::default()
        };
        let packager = Packager::new(fake, Reporter::new(MemorySink::new()));
        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));

        packager
            .package(&project(dir.path(), false), &mut archive)
            .await
            .unwrap();
        assert!(!dir.path().join("build/TypeFunction/stale.js").exists());
    }

    #[tokio::test]
    async fn passes_settings_to_build_command() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        let fake = FakeBuild {
            outputs: vec![("build/TypeFunction/index.js", "x")],
            ..Default::default()
        };
        let packager = Packager::new(fake, Reporter::new(MemorySink::new()));
        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));

        packager
            .package(&project(dir.path(), true), &mut archive)
            .await
            .unwrap();

        let commands = packager.executor().commands.lock().unwrap().clone();
        assert_eq!(
            commands,
            [format!(
                "sam build --build-dir {}/build --use-container TypeFunction",
                dir.path().display()
            )]
        );
    }

    #[tokio::test]
    async fn failed_build_stops_before_archive_writes() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/handlers.ts"), "export {}").unwrap();
        let fake = FakeBuild {
            exit_code: 2,
            ..Default::default()
        };
        let sink = MemorySink::new();
        let packager = Packager::new(fake, Reporter::new(sink.clone()));
        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));

        let err = packager
            .package(&project(dir.path(), false), &mut archive)
            .await
            .unwrap_err();

        assert!(err.is_downstream());
        assert!(sink.contains("stopped at stage 'artifacts cleared'"));
        let bytes = archive.finish().unwrap().into_inner();
        assert_eq!(zip::ZipArchive::new(Cursor::new(bytes)).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn missing_handler_output_is_io_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        let packager = Packager::new(FakeBuild::default(), Reporter::new(MemorySink::new()));
        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));

        let err = packager
            .package(&project(dir.path(), false), &mut archive)
            .await
            .unwrap_err();
        assert!(err.is_io(), "{err:?}");
    }

    #[tokio::test]
    async fn missing_package_root_packages_handler_archive_only() {
        let dir = TempDir::new().unwrap();
        let fake = FakeBuild {
            outputs: vec![("build/TypeFunction/index.js", "x")],
            ..Default::default()
        };
        let sink = MemorySink::new();
        let packager = Packager::new(fake, Reporter::new(sink.clone()));
        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));

        let report = packager
            .package(&project(dir.path(), false), &mut archive)
            .await
            .unwrap();

        assert_eq!(report.source_files, 0);
        assert!(sink.contains("packaging handler archive only"));
        let bytes = archive.finish().unwrap().into_inner();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.file_names().collect::<Vec<_>>(), ["ResourceProvider.zip"]);
    }

    #[test]
    fn stages_are_ordered() {
        assert!(PackageStage::NotStarted < PackageStage::ArtifactsCleared);
        assert!(PackageStage::OuterPackaged < PackageStage::Done);
        assert_eq!(PackageStage::InnerPackaged.to_string(), "inner archive packaged");
    }
}
