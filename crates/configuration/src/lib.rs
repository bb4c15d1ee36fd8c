use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{CacheSettings, DashboardSettings, ServerSettings, Settings};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file if one is present, deserializes it into our
/// strongly-typed `Settings` struct, and validates it. A missing file is not
/// an error; every setting has a sensible default.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        // The file lives next to the binary's working directory and may be absent.
        .add_source(config::File::with_name("config.toml").required(false))
        // An environment-variable source could be layered on here if needed.
        // .add_source(config::Environment::with_prefix("BOTBOARD"));
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
