use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub environment: RuntimeEnvironment,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    Development,
    #[default]
    Production,
}

impl RuntimeEnvironment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_url")]
    pub base_url: String,
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub trato: GatewayAccountConfig,
    #[serde(default)]
    pub andrey: Option<GatewayAccountConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayAccountConfig {
    pub api_key: String,
    /// Overrides `gateway.base_url` for this account.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_gateway_url() -> String {
    "https://api.asaas.com/v3".into()
}
fn default_gateway_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    100
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("TRATO").separator("__"))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        Ok(app_config)
    }
}
