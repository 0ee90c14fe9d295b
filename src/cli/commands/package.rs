use crate::cli::args::PackageArgs;
use crate::package::checksum::calculate_sha256;
use crate::package::{Packager, ShellExecutor};
use crate::project::Project;
use crate::reporter::Reporter;
use anyhow::Context;
use std::path::Path;
use zip::ZipWriter;

pub async fn package(args: PackageArgs, reporter: Reporter) -> anyhow::Result<()> {
    let mut project = Project::load(&args.project.root).await?;
    if args.no_docker {
        project.settings.use_docker = false;
    }
    if let Some(command) = args.build_command {
        project.settings.build_command = Some(command);
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let packager = Packager::new(ShellExecutor::new(&args.shell), reporter.clone());
    if let Err(e) = write_archive(&packager, &project, &args.output, &reporter).await {
        discard_partial(&args.output, &reporter).await;
        return Err(e);
    }

    let size = tokio::fs::metadata(&args.output)
        .await
        .with_context(|| format!("reading {}", args.output.display()))?
        .len();
    let checksum = calculate_sha256(&args.output).await?;
    reporter.info(format_args!("Created {} ({} bytes)", args.output.display(), size));
    reporter.info(format_args!("SHA256: {}", checksum));
    Ok(())
}

async fn write_archive(
    packager: &Packager<ShellExecutor>,
    project: &Project,
    output: &Path,
    reporter: &Reporter,
) -> anyhow::Result<()> {
    let file = std::fs::File::create(output)
        .with_context(|| format!("creating {}", output.display()))?;
    let mut archive = ZipWriter::new(file);

    let report = packager
        .package(project, &mut archive)
        .await
        .context("package failed")?;
    archive
        .finish()
        .with_context(|| format!("finalizing {}", output.display()))?;

    reporter.debug(format_args!(
        "Packaged {} source files and a {} byte handler archive",
        report.source_files,
        report.handler_archive_size
    ));
    Ok(())
}

async fn discard_partial(output: &Path, reporter: &Reporter) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => reporter.debug(format_args!("Removed partial archive {}", output.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => reporter.warn(format_args!(
            "Failed to remove partial archive {}: {}",
            output.display(),
            e
        )),
    }
}
