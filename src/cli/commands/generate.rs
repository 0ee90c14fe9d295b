use crate::cli::args::ProjectArgs;
use crate::codegen::Codegen;
use crate::codegen::models::SchemaResolver;
use crate::project::Project;
use crate::reporter::Reporter;
use anyhow::Context;

pub async fn generate(args: ProjectArgs, reporter: Reporter) -> anyhow::Result<()> {
    let project = Project::load(&args.root).await?;
    Codegen::new(reporter.clone())?
        .generate(&project, &SchemaResolver)
        .await
        .context("generate failed")?;

    reporter.info(format_args!(
        "Generated {}",
        project.package_root().join("models.ts").display()
    ));
    Ok(())
}
