use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{DatabaseSettings, LoggingSettings, ServerSettings, Settings, StoreBackend};

/// The file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Loads the application settings from `path`, the environment and `.env`.
///
/// Sources are layered, lowest precedence first: built-in defaults, the
/// (optional) config file, `SIS__SECTION__KEY` environment variables,
/// `DATABASE_URL`, and finally `overrides` (dotted keys such as
/// `"server.port"`). Validation runs once everything is merged.
pub fn load_settings_from(path: &Path, overrides: &[(&str, String)]) -> Result<Settings, ConfigError> {
    // A missing .env file is fine; the variables may come from the real environment.
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok();
    let settings = build_settings(path, database_url, overrides)?;
    tracing::debug!(path = %path.display(), backend = ?settings.database.backend, "Settings loaded.");
    Ok(settings)
}

fn build_settings(
    path: &Path,
    database_url: Option<String>,
    overrides: &[(&str, String)],
) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("SIS")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", database_url)?;
    for (key, value) in overrides {
        builder = builder.set_override(*key, value.as_str())?;
    }
    let builder = builder.build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
