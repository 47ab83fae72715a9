//! Compile command

use super::CompileFlags;
use anyhow::Result;
use std::path::PathBuf;

pub async fn run(project_dir: PathBuf, flags: CompileFlags) -> Result<()> {
    let facade = super::new_facade(project_dir);
    super::install_stop_handler(&facade);
    super::finish(facade.compile(flags.into_request()).await)
}
