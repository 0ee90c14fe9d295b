//! Embedded templates and static project assets.
//!
//! Templates are rendered with Handlebars with HTML escaping disabled, since
//! none of the outputs are HTML.

use crate::error::Result;
use handlebars::Handlebars;
use serde::Serialize;

macro_rules! template {
    ($file:literal) => {
        ($file, include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/", $file)))
    };
}

macro_rules! asset {
    ($file:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/data/", $file))
    };
}

/// Templates rendered into a project, keyed by file name.
const TEMPLATES: &[(&str, &str)] = &[
    template!("handlers.ts"),
    template!("models.ts"),
    template!("package.json"),
    template!("README.md"),
    template!("template.yml"),
    template!("schema.json"),
];

/// `.gitignore` copied verbatim into new projects.
pub const GITIGNORE: &str = asset!("typescript.gitignore");

/// `.npmrc` copied verbatim into new projects.
pub const NPMRC: &str = asset!(".npmrc");

/// `tsconfig.json` copied verbatim into new projects.
pub const TSCONFIG: &str = asset!("tsconfig.json");

/// Handlebars registry preloaded with every embedded template.
#[derive(Debug)]
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        for (name, source) in TEMPLATES {
            registry.register_template_string(name, source)?;
        }
        Ok(Self { registry })
    }

    /// Renders the template registered under `name`.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        Ok(self.registry.render(name, data)?)
    }
}
