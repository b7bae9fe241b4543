use anyhow::{Context, Result};
use std::{env, str::FromStr};

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub bootstrap: Option<BootstrapStaffConfig>,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: env::var("DATABASE_HOST")?,
            port: env::var("DATABASE_PORT")?.parse()?,
            username: env::var("DATABASE_USERNAME")?,
            password: env::var("DATABASE_PASSWORD")?,
            database: env::var("DATABASE_NAME")?,
            max_connections: var_or("DATABASE_MAX_CONNECTIONS", 10)?,
            acquire_timeout_secs: var_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?,
        };
        // 署名鍵はソースに埋め込まず、必ず外部から与える
        let auth = AuthConfig {
            secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl: var_or("AUTH_TOKEN_TTL", 86400)?,
        };
        let server = ServerConfig {
            port: var_or("PORT", 8080)?,
        };
        let bootstrap = match (
            env::var("BOOTSTRAP_STAFF_NAME"),
            env::var("BOOTSTRAP_STAFF_EMAIL"),
            env::var("BOOTSTRAP_STAFF_PASSWORD"),
        ) {
            (Ok(user_name), Ok(email), Ok(password)) => Some(BootstrapStaffConfig {
                user_name,
                email,
                password,
            }),
            _ => None,
        };
        Ok(Self {
            database,
            auth,
            server,
            bootstrap,
        })
    }
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v
            .parse()
            .with_context(|| format!("{key} has an invalid value: {v}")),
        Err(_) => Ok(default),
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub ttl: u64,
}

pub struct ServerConfig {
    pub port: u16,
}

pub struct BootstrapStaffConfig {
    pub user_name: String,
    pub email: String,
    pub password: String,
}
