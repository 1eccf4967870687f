use crate::commands::config::current_config;
use crate::CrateInfo;

/// Set up logging, load the configuration and report what is running.
pub fn initialize() -> Result<CrateInfo, String> {
    crate::init_logging();

    let config = current_config()?;
    config.validate().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        format!("Invalid configuration: {}", e)
    })?;

    let info = crate::get_info();
    log::info!(
        "{} {} initialized (threshold={}, flip axis={:?}, parallel={})",
        info.name,
        info.version,
        config.detection.threshold,
        config.flip.axis,
        info.parallel
    );
    Ok(info)
}
