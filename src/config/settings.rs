use chrono::Duration;
use config::ConfigError;
use serde::Deserialize;

/// Longest accepted token lifetime: ten years.
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// bcrypt accepts work factors in this range.
pub const PASSWORD_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub hub: HubSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
}

/// Defines the host and port the HTTP/WebSocket server binds to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Token signing and cookie lifetimes.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub secret_key: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub secure_cookies: bool,
    /// bcrypt work factor for stored passwords.
    pub password_cost: u32,
}

/// Hub sizing and room pre-provisioning.
#[derive(Debug, Deserialize, Clone)]
pub struct HubSettings {
    /// Capacity of each connection's outbound queue. A connection whose queue
    /// is full when the hub delivers to it is evicted.
    pub outbound_capacity: usize,
    /// Capacity of the hub's command channel.
    pub command_capacity: usize,
    /// Whether a chat message is also delivered back to its sender.
    pub echo_to_sender: bool,
    pub max_message_bytes: usize,
    pub rooms: Vec<RoomSeed>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RoomSeed {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from [`Settings::default`].
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub auth: Option<PartialAuthSettings>,
    pub hub: Option<PartialHubSettings>,
    pub storage: Option<PartialStorageSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialAuthSettings {
    pub secret_key: Option<String>,
    pub access_token_ttl_secs: Option<u64>,
    pub refresh_token_ttl_secs: Option<u64>,
    pub secure_cookies: Option<bool>,
    pub password_cost: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialHubSettings {
    pub outbound_capacity: Option<usize>,
    pub command_capacity: Option<usize>,
    pub echo_to_sender: Option<bool>,
    pub max_message_bytes: Option<usize>,
    pub rooms: Option<Vec<RoomSeed>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialStorageSettings {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            auth: AuthSettings {
                // Development key; deployments override it through the
                // environment.
                secret_key: "0123456789012345678901234567890123456789".to_string(),
                access_token_ttl_secs: 15 * 60,
                refresh_token_ttl_secs: 7 * 24 * 60 * 60,
                secure_cookies: true,
                password_cost: 12,
            },
            hub: HubSettings {
                outbound_capacity: 25,
                command_capacity: 1024,
                echo_to_sender: true,
                max_message_bytes: 64 * 1024,
                rooms: Vec::new(),
            },
            storage: StorageSettings {
                path: "chathub_db".to_string(),
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl PartialSettings {
    /// Merge with defaults, field by field.
    pub fn merge(self, default: Settings) -> Settings {
        let server = self.server.unwrap_or_default();
        let auth = self.auth.unwrap_or_default();
        let hub = self.hub.unwrap_or_default();
        let storage = self.storage.unwrap_or_default();
        let log = self.log.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(default.server.host),
                port: server.port.unwrap_or(default.server.port),
            },
            auth: AuthSettings {
                secret_key: auth.secret_key.unwrap_or(default.auth.secret_key),
                access_token_ttl_secs: auth
                    .access_token_ttl_secs
                    .unwrap_or(default.auth.access_token_ttl_secs),
                refresh_token_ttl_secs: auth
                    .refresh_token_ttl_secs
                    .unwrap_or(default.auth.refresh_token_ttl_secs),
                secure_cookies: auth.secure_cookies.unwrap_or(default.auth.secure_cookies),
                password_cost: auth.password_cost.unwrap_or(default.auth.password_cost),
            },
            hub: HubSettings {
                outbound_capacity: hub
                    .outbound_capacity
                    .unwrap_or(default.hub.outbound_capacity),
                command_capacity: hub
                    .command_capacity
                    .unwrap_or(default.hub.command_capacity),
                echo_to_sender: hub.echo_to_sender.unwrap_or(default.hub.echo_to_sender),
                max_message_bytes: hub
                    .max_message_bytes
                    .unwrap_or(default.hub.max_message_bytes),
                rooms: hub.rooms.unwrap_or(default.hub.rooms),
            },
            storage: StorageSettings {
                path: storage.path.unwrap_or(default.storage.path),
            },
            log: LogSettings {
                level: log.level.unwrap_or(default.log.level),
            },
        }
    }
}

impl AuthSettings {
    pub fn access_ttl(&self) -> Duration {
        ttl(self.access_token_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Duration {
        ttl(self.refresh_token_ttl_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, secs) in [
            ("auth.access_token_ttl_secs", self.access_token_ttl_secs),
            ("auth.refresh_token_ttl_secs", self.refresh_token_ttl_secs),
        ] {
            if secs == 0 || secs > MAX_TOKEN_TTL_SECS {
                return Err(ConfigError::Message(format!(
                    "{key} must be between 1 and {MAX_TOKEN_TTL_SECS}, got {secs}"
                )));
            }
        }
        if !PASSWORD_COST_RANGE.contains(&self.password_cost) {
            return Err(ConfigError::Message(format!(
                "auth.password_cost must be between 4 and 31, got {}",
                self.password_cost
            )));
        }
        Ok(())
    }
}

/// Lifetimes are capped at [`MAX_TOKEN_TTL_SECS`], so the conversion never
/// overflows.
fn ttl(secs: u64) -> Duration {
    i64::try_from(secs.min(MAX_TOKEN_TTL_SECS))
        .map(Duration::seconds)
        .unwrap_or_default()
}

impl Settings {
    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()
    }
}
