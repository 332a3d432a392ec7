use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub webhook: WebhookSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// `dev` unlocks the admin reset endpoint
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl ApplicationSettings {
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Keep everything in process memory instead of Postgres
    #[serde(default)]
    pub in_memory: bool,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Access token signing settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings").field("secret", &"[redacted]").finish()
    }
}

/// Billing provider webhook settings
#[derive(serde::Deserialize, Clone)]
pub struct WebhookSettings {
    pub polka_key: String,
}

impl std::fmt::Debug for WebhookSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSettings").field("polka_key", &"[redacted]").finish()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_platform() -> String {
    "production".to_string()
}

fn default_static_dir() -> String {
    "./public".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Settings {
    /// Reject settings the service cannot run safely with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if self.webhook.polka_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired("webhook.polka_key".to_string()));
        }
        Ok(())
    }
}

/// Load `configuration.yaml` (optional) overlaid with `APP_*` environment
/// variables, e.g. `APP_JWT__SECRET` or `APP_DATABASE__IN_MEMORY=true`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
