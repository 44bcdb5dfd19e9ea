//! Config loading with CLI flag overrides.

use std::path::PathBuf;

use roomrec_config::{Config, config_path, load_config_from};
use roomrec_core::RecorderConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` / `ROOMREC_CONFIG`, else the
/// platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config file and environment, then apply CLI overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_file(global);
    let mut cfg = load_config_from(&path).map_err(|e| CliError::from_config(e, &path))?;

    if let Some(ref dir) = global.output_dir {
        cfg.output_dir.clone_from(dir);
    }
    if let Some(ref base) = global.api_base {
        cfg.api_base.clone_from(base);
    }
    Ok(cfg)
}

/// Runtime configuration for the recorder.
pub fn recorder_config(global: &GlobalOpts, cfg: &Config) -> Result<RecorderConfig, CliError> {
    cfg.to_recorder_config()
        .map_err(|e| CliError::from_config(e, &config_file(global)))
}
