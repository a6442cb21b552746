use crate::error::ConfigError;
use crate::settings::Settings;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AccountDefaults, DatabaseSettings, MarketDataSettings, Settings};

/// Loads the application configuration.
///
/// This function is the primary entry point for this crate. It layers an
/// optional `crossp.toml` file under `CROSSP_*` environment variables
/// (e.g. `CROSSP_DATABASE__URL`), deserializes the result into our
/// strongly-typed `Settings` struct, and returns it. Every section has
/// defaults, so a missing file yields a usable configuration.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `crossp.toml` (optional).
        .add_source(config::File::with_name("crossp").required(false))
        // Environment overrides, nested keys separated by "__".
        .add_source(config::Environment::with_prefix("CROSSP").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;

    if settings.market_data.quote_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "market_data.quote_timeout_secs must be greater than zero".to_string(),
        ));
    }

    Ok(settings)
}
