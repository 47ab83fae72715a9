//! Pass-through commands that surface the build tool directly

use anyhow::Result;
use std::path::PathBuf;

pub async fn clean(project_dir: PathBuf) -> Result<()> {
    let facade = super::new_facade(project_dir);
    super::finish(facade.clean().await)
}

pub async fn precompile(project_dir: PathBuf) -> Result<()> {
    let facade = super::new_facade(project_dir);
    super::install_stop_handler(&facade);
    super::finish(facade.precompile().await)
}

pub async fn version(project_dir: PathBuf) -> Result<()> {
    let facade = super::new_facade(project_dir);
    super::finish(facade.version().await)
}

pub async fn help(project_dir: PathBuf) -> Result<()> {
    let facade = super::new_facade(project_dir);
    super::finish(facade.help().await)
}
