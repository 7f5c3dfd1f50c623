use std::path::Path;

use anyhow::Context;
use neurocell::CellTemplate;

pub mod build;
pub mod template;

pub fn load_template(path: Option<&Path>) -> anyhow::Result<CellTemplate> {
    match path {
        Some(path) => CellTemplate::from_path(path)
            .with_context(|| format!("loading template {}", path.display())),
        None => Ok(CellTemplate::default()),
    }
}
