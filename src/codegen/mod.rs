//! Project scaffolding and model generation.
//!
//! - [`Codegen::init`] lays out a new TypeScript resource provider project
//! - [`Codegen::generate`] renders `src/models.ts` from the resource schema

pub mod models;
pub mod templates;

use crate::error::{ErrorExt, PluginError, Result};
use crate::package::HANDLER_FUNCTION;
use crate::project::Project;
use crate::reporter::Reporter;
use models::ModelResolver;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use templates::TemplateRenderer;

/// npm package providing the handler runtime support.
pub const SUPPORT_LIB_NAME: &str = "cfn-rpdk";

/// CLI used to submit the finished provider.
pub const EXECUTABLE: &str = "cfn";

pub const RUNTIME: &str = "nodejs12.x";
pub const ENTRY_POINT: &str = "dist/handlers.entrypoint";
pub const TEST_ENTRY_POINT: &str = "dist/handlers.testEntrypoint";
pub const CODE_URI: &str = "./";

/// SAM function properties rendered into `template.yml`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FunctionParams<'a> {
    handler: &'a str,
    runtime: &'a str,
    code_uri: &'a str,
}

/// Code generator for the TypeScript language plugin.
#[derive(Debug)]
pub struct Codegen {
    renderer: TemplateRenderer,
    reporter: Reporter,
}

impl Codegen {
    pub fn new(reporter: Reporter) -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::new()?,
            reporter,
        })
    }

    /// Scaffolds a new project.
    ///
    /// Existing files are left untouched (a warning is logged for each);
    /// `.rpdk-config` is always rewritten with the new settings.
    pub async fn init(&self, project: &mut Project, use_docker: bool) -> Result<()> {
        self.reporter.debug(format_args!("Init started"));

        project.settings.use_docker = use_docker;
        project.runtime = Some(RUNTIME.to_string());
        project.entrypoint = Some(ENTRY_POINT.to_string());
        project.test_entrypoint = Some(TEST_ENTRY_POINT.to_string());

        let root = project.root().to_path_buf();
        let package_root = project.package_root();
        self.reporter
            .debug(format_args!("Making folder '{}'", package_root.display()));
        tokio::fs::create_dir_all(&package_root)
            .await
            .fs_context("creating package root", &package_root)?;

        self.render_new(
            project,
            &package_root.join("handlers.ts"),
            "handlers.ts",
            &json!({
                "lib_name": SUPPORT_LIB_NAME,
                "type_name": project.type_name(),
            }),
        )
        .await?;

        self.copy_asset(project, &root.join(".gitignore"), templates::GITIGNORE)
            .await?;
        self.copy_asset(project, &root.join(".npmrc"), templates::NPMRC)
            .await?;
        self.copy_asset(project, &root.join("tsconfig.json"), templates::TSCONFIG)
            .await?;

        self.render_new(
            project,
            &root.join("package.json"),
            "package.json",
            &json!({
                "name": project.hyphenated_name(),
                "description": format!("AWS custom resource provider named {}.", project.type_name()),
                "lib_name": SUPPORT_LIB_NAME,
            }),
        )
        .await?;

        let schema_path = project.schema_path();
        self.render_new(
            project,
            &root.join("README.md"),
            "README.md",
            &json!({
                "type_name": project.type_name(),
                "schema_path": schema_path.display().to_string(),
                "project_path": project.namespace().join("-"),
                "executable": EXECUTABLE,
                "lib_name": SUPPORT_LIB_NAME,
            }),
        )
        .await?;

        let main = FunctionParams {
            handler: ENTRY_POINT,
            runtime: RUNTIME,
            code_uri: CODE_URI,
        };
        let test = FunctionParams {
            handler: TEST_ENTRY_POINT,
            ..main.clone()
        };
        let functions = BTreeMap::from([("TestEntrypoint", test), (HANDLER_FUNCTION, main)]);
        self.render_new(
            project,
            &root.join("template.yml"),
            "template.yml",
            &json!({
                "resource_type": project.type_name(),
                "functions": functions,
            }),
        )
        .await?;

        self.render_new(
            project,
            &schema_path,
            "schema.json",
            &json!({ "type_name": project.type_name() }),
        )
        .await?;

        project.save().await?;

        self.reporter.debug(format_args!("Init complete"));
        Ok(())
    }

    /// Renders `src/models.ts` from the project schema, replacing any previous version.
    pub async fn generate<R: ModelResolver>(&self, project: &Project, resolver: &R) -> Result<()> {
        self.reporter.debug(format_args!("Generate started"));

        let schema_path = project.schema_path();
        let raw = tokio::fs::read_to_string(&schema_path)
            .await
            .fs_context("reading resource schema", &schema_path)?;
        let schema: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            PluginError::Config(format!("invalid schema {}: {e}", schema_path.display()))
        })?;

        let models = resolver.resolve(&schema)?;

        let package_root = project.package_root();
        tokio::fs::create_dir_all(&package_root)
            .await
            .fs_context("creating package root", &package_root)?;

        let path = package_root.join("models.ts");
        self.reporter
            .debug(format_args!("Writing file: {}", path.display()));
        let contents = self.renderer.render(
            "models.ts",
            &json!({
                "lib_name": SUPPORT_LIB_NAME,
                "type_name": project.type_name(),
                "models": models,
            }),
        )?;
        project.overwrite(&path, contents).await?;

        self.reporter.debug(format_args!("Generate complete"));
        Ok(())
    }

    async fn render_new<T: Serialize>(
        &self,
        project: &Project,
        path: &Path,
        template: &str,
        data: &T,
    ) -> Result<()> {
        self.reporter
            .debug(format_args!("Writing '{}'", path.display()));
        let contents = self.renderer.render(template, data)?;
        project.safewrite(path, contents, &self.reporter).await?;
        Ok(())
    }

    async fn copy_asset(&self, project: &Project, path: &Path, contents: &str) -> Result<()> {
        self.reporter
            .debug(format_args!("Writing '{}'", path.display()));
        project.safewrite(path, contents, &self.reporter).await?;
        Ok(())
    }
}
