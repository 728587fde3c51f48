use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_database_url")]
    pub database_url: String,

    #[serde(default = "Config::default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default)]
    pub db_sqlx_logging: bool,

    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "Config::default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: Self::default_database_url(),
            db_max_connections: Self::default_db_max_connections(),
            db_sqlx_logging: false,
            log_level: Self::default_log_level(),
        }
    }
}

impl Config {
    pub fn new() -> envy::Result<Self> {
        let config = envy::from_env::<Config>()?;
        Ok(config)
    }

    fn default_database_url() -> String {
        "sqlite://postbot.db?mode=rwc".into()
    }

    fn default_db_max_connections() -> u32 {
        1
    }

    fn default_log_level() -> String {
        "INFO".into()
    }
}
