pub mod demo;
pub mod replay;
pub mod serve;

use anyhow::Result;
use gitlane_server::Config;
use std::path::PathBuf;

pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    Ok(Config::load_or_default(path)?)
}
