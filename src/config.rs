use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` means no database is configured; the in-memory store is used.
    pub db: Option<DbConfig>,
    pub host: String,
    pub port: u16,
    /// Emit the list envelope under the historical `"sucess"` key.
    pub legacy_list_key: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DbConfig {
                url,
                max_connections: std::env::var("DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10),
                run_migrations: env_flag("RUN_MIGRATIONS", true),
            }),
            _ => None,
        };
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid APP_PORT {:?}: {}", v, e))?,
            Err(_) => 8080,
        };
        Ok(Self {
            db,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            legacy_list_key: env_flag("LEGACY_LIST_KEY", true),
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            db: None,
            host: "127.0.0.1".into(),
            port: 0,
            legacy_list_key: true,
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
