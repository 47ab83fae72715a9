//! Project and plugin scaffolding, delegated to the build tool

use anyhow::Result;
use std::path::PathBuf;

pub async fn project(project_dir: PathBuf, name: &str) -> Result<()> {
    let facade = super::new_facade(project_dir);
    super::finish(facade.create_project(name).await)
}

pub async fn plugin(project_dir: PathBuf, name: &str) -> Result<()> {
    let facade = super::new_facade(project_dir);
    super::finish(facade.create_plugin(name).await)
}
