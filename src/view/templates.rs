//! Tera template registry.

use std::path::Path;

use tera::{Context, Tera};
use tracing::info;

use crate::error::Result;

/// Name of the home page template.
pub const HOME_TEMPLATE: &str = "home.html";

const BASE_TEMPLATE: &str = "base.html";

const BUILTIN: [(&str, &str); 2] = [
    (BASE_TEMPLATE, include_str!("../../templates/base.html")),
    (HOME_TEMPLATE, include_str!("../../templates/home.html")),
];

/// Loaded templates.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Templates compiled into the binary.
    pub fn builtin() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN)?;
        Ok(Self { tera })
    }

    /// Load every `*.html` under `dir`. `home.html` must be among them.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let glob = format!("{}/**/*.html", dir.display());
        let tera = Tera::new(&glob)?;

        if !tera.get_template_names().any(|name| name == HOME_TEMPLATE) {
            return Err(tera::Error::template_not_found(HOME_TEMPLATE).into());
        }

        info!("Loaded templates from {}", dir.display());
        Ok(Self { tera })
    }

    /// Built-in templates, or the ones in `dir` when given.
    pub fn load(dir: Option<&str>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::builtin(),
        }
    }

    /// Render a template by name.
    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(name, context)?)
    }
}
