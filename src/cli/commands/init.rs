use crate::cli::args::InitArgs;
use crate::codegen::Codegen;
use crate::project::{PluginSettings, Project};
use crate::reporter::Reporter;
use anyhow::Context;

pub async fn init(args: InitArgs, reporter: Reporter) -> anyhow::Result<()> {
    let root = &args.project.root;
    tokio::fs::create_dir_all(root)
        .await
        .with_context(|| format!("creating project root {}", root.display()))?;

    let mut project = Project::new(root, &args.type_name, PluginSettings::default())?;
    let codegen = Codegen::new(reporter.clone())?;
    codegen
        .init(&mut project, !args.no_docker)
        .await
        .context("init failed")?;

    if args.no_docker {
        reporter.warn(format_args!(
            "Container builds disabled; packaging will use the local toolchain, \
             which may not match the deployment platform"
        ));
    }
    reporter.info(format_args!(
        "Initialized {} project in {}",
        project.type_name(),
        project.root().display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::ProjectArgs;
    use crate::reporter::MemorySink;
    use tempfile::TempDir;

    #[tokio::test]
    async fn init_then_generate_report_through_injected_reporter() {
        let dir = TempDir::new().unwrap();
        let sink = MemorySink::new();
        let reporter = Reporter::new(sink.clone());

        init(
            InitArgs {
                project: ProjectArgs {
                    root: dir.path().to_path_buf(),
                },
                type_name: "Org::Svc::Thing".into(),
                no_docker: true,
            },
            reporter.clone(),
        )
        .await
        .unwrap();
        super::super::generate(
            ProjectArgs {
                root: dir.path().to_path_buf(),
            },
            reporter,
        )
        .await
        .unwrap();

        assert!(sink.contains("Container builds disabled"));
        assert!(sink.contains("Initialized Org::Svc::Thing project"));
        assert!(sink.contains("Generated"));
    }
}
