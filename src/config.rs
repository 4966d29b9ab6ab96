//! Application configuration
//!
//! Layered the usual way: coded defaults, then optional `config/` files,
//! then `SALUDPLUS_`-prefixed environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub mysql: MySqlSettings,
    pub mongo: MongoSettings,
    pub uploads: UploadSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MySqlSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoSettings {
    pub url: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub dir: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("SALUDPLUS_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000_i64)?
            .set_default("mysql.url", "mysql://root@localhost:3306/saludplus")?
            .set_default("mongo.url", "mongodb://localhost:27017")?
            .set_default("mongo.database", "saludplus")?
            .set_default("uploads.dir", "uploads")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{env}")).required(false))
            .add_source(Environment::with_prefix("SALUDPLUS").separator("__"))
            .build()?
            .try_deserialize()
    }
}
