pub mod check;
pub mod ingress;
pub mod probe;
pub mod triage;
pub mod watch;

use std::path::Path;

use anyhow::{Context, Result};
use sentinel_config::{ConfigLoader, SentinelConfig};

pub fn load_config(env_file: &Path) -> Result<SentinelConfig> {
    let load = ConfigLoader::new()
        .with_env_file(env_file)
        .load()
        .with_context(|| {
            format!("failed to load configuration (env file {})", env_file.display())
        })?;
    Ok(load.config)
}
