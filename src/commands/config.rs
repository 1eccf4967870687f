use crate::config::{BlurConfig, CrabBlurConfig, DetectionConfig, StitchConfig};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

lazy_static::lazy_static! {
    static ref CONFIG_PATH: RwLock<PathBuf> = RwLock::new(CrabBlurConfig::default_path());
    static ref GLOBAL_CONFIG: Arc<RwLock<CrabBlurConfig>> = Arc::new(RwLock::new(CrabBlurConfig::load_or_default()));
}

/// Snapshot of the process-wide configuration.
pub(crate) fn current_config() -> Result<CrabBlurConfig, String> {
    let config = GLOBAL_CONFIG.read().map_err(|e| e.to_string())?;
    Ok(config.clone())
}

fn config_path() -> Result<PathBuf, String> {
    let path = CONFIG_PATH.read().map_err(|e| e.to_string())?;
    Ok(path.clone())
}

/// Switch the process to the configuration file at `path` and load it.
///
/// Later `update_config`/`reset_config` calls persist to this path.
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<CrabBlurConfig, String> {
    let path = path.as_ref();
    let loaded = CrabBlurConfig::load_from_file(path).map_err(|e| e.to_string())?;
    loaded.validate()?;

    *CONFIG_PATH.write().map_err(|e| e.to_string())? = path.to_path_buf();
    *GLOBAL_CONFIG.write().map_err(|e| e.to_string())? = loaded.clone();

    log::info!("Using configuration file {:?}", path);
    Ok(loaded)
}

/// Get the current configuration
pub fn get_config() -> Result<CrabBlurConfig, String> {
    current_config()
}

/// Update configuration
pub fn update_config(new_config: CrabBlurConfig) -> Result<(), String> {
    new_config.validate()?;

    {
        let mut config = GLOBAL_CONFIG.write().map_err(|e| e.to_string())?;
        *config = new_config.clone();
    }

    new_config
        .save_to_file(config_path()?)
        .map_err(|e| e.to_string())?;

    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<CrabBlurConfig, String> {
    let default_config = CrabBlurConfig::default();

    {
        let mut config = GLOBAL_CONFIG
            .write()
            .map_err(|e| format!("Failed to write config: {}", e))?;
        *config = default_config.clone();
    }

    default_config
        .save_to_file(config_path()?)
        .map_err(|e| e.to_string())?;

    Ok(default_config)
}

pub fn get_blur_config() -> Result<BlurConfig, String> {
    Ok(current_config()?.blur)
}

pub fn get_detection_config() -> Result<DetectionConfig, String> {
    Ok(current_config()?.detection)
}

pub fn get_stitch_config() -> Result<StitchConfig, String> {
    Ok(current_config()?.stitch)
}
