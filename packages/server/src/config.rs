use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
    /// Base URL used to build public feedback links (`{base}/r/{token}`).
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct S3Config {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// `filesystem` or `s3`.
    pub backend: String,
    /// Root directory for the filesystem backend.
    pub filesystem_root: String,
    pub recall_bucket: String,
    pub showing_bucket: String,
    #[serde(default)]
    pub s3: S3Config,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecallConfig {
    /// Log types accepted when creating a log.
    pub compose_log_types: Vec<String>,
    /// Log types accepted when editing a log. Diverges from the compose
    /// list on purpose (the trailing entry is `Invoice`, not `General`).
    pub edit_log_types: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub recall: RecallConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("server.public_base_url", "http://127.0.0.1:3000")?
            .set_default("storage.backend", "filesystem")?
            .set_default("storage.filesystem_root", "./data/objects")?
            .set_default("storage.recall_bucket", "recall")?
            .set_default("storage.showing_bucket", "showing-photos")?
            .set_default(
                "recall.compose_log_types",
                vec![
                    "Before",
                    "During",
                    "After",
                    "Issue",
                    "Resolution",
                    "Call",
                    "Visit",
                    "General",
                ],
            )?
            .set_default(
                "recall.edit_log_types",
                vec![
                    "Before",
                    "During",
                    "After",
                    "Issue",
                    "Resolution",
                    "Call",
                    "Visit",
                    "Invoice",
                ],
            )?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., RECAP__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("RECAP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
