mod settings;

use config::{Config, ConfigError, Environment, File};

use crate::config::settings::PartialSettings;

pub use settings::{BrokerSettings, LoggingSettings, Settings, StoreSettings};

/// Prefix for environment overrides, e.g. `CHATRELAY_BROKER__QUEUE_CAPACITY`.
pub const ENV_PREFIX: &str = "CHATRELAY";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the broker, store and logging configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge_with_defaults())
}

#[cfg(test)]
mod tests;
