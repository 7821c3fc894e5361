use crate::PpmConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable prefix; `PPM_DATA_FILE` overrides `data_file`.
pub const ENV_PREFIX: &str = "PPM";

/// Load configuration from an optional TOML file layered under `PPM_*`
/// environment variables. Keys missing from both take their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PpmConfig> {
    let path = path.as_ref();
    let settings = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: PpmConfig = settings
        .try_deserialize()
        .with_context(|| format!("Invalid configuration in: {}", path.display()))?;
    Ok(config)
}

/// Logs the effective configuration. Call once the subscriber is installed.
pub fn log_loaded(config: &PpmConfig, path: &Path) {
    crate::log_debug!(
        path = %path.display(),
        data_file = %config.data_file.display(),
        export_dir = %config.export_dir.display(),
        log_filter = %config.log_filter,
        "configuration loaded"
    );
}

/// Save configuration to a file
pub fn save_config<P: AsRef<Path>>(config: &PpmConfig, path: P) -> Result<()> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Create a default configuration template
pub fn create_default_config() -> PpmConfig {
    PpmConfig::default()
}
