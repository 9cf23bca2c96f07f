mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{
    AuthSettings, HubSettings, LogSettings, MAX_TOKEN_TTL_SECS, RoomSeed, ServerSettings,
    Settings, StorageSettings,
};

/// Environment variable prefix, e.g. `CHATHUB__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "CHATHUB";

/// Loads the configuration from `config/default` and environment variables,
/// merged over [`Settings::default`].
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Same as [`load_config`] with an explicit base file (extension optional).
pub fn load_config_from(base: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(base).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;

    let settings = partial.merge(Settings::default());
    settings.validate()?;
    Ok(settings)
}
