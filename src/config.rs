use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api/v1";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub email: EmailConfig,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub additional_base_paths: Vec<String>,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    pub from_name: String,
    pub enabled: bool,
}

/// Password lifecycle knobs. The lockout threshold and history depth are
/// fixed model constants; only the time windows are deployment-tunable.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    pub reset_token_ttl_minutes: i64,
    pub password_expiry_days: i64,
    /// Base URL the emailed reset link points at; the token is appended as a
    /// query parameter.
    pub reset_url: String,
}

/// Bootstrap accounts seeded at startup.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    /// Recreate the admin account at startup when it is missing.
    pub auto_recreate: bool,
    pub default_user_username: String,
    pub default_user_password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/offerdesk_db".to_string(),
            max_connections: 16,
            min_connections: 4,
            acquire_timeout: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            additional_base_paths: Vec::new(),
            enable_swagger: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            cookie_secure: true,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "hr@offerdesk.local".to_string(),
            from_name: "Offerdesk HR".to_string(),
            enabled: false,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            reset_token_ttl_minutes: 30,
            password_expiry_days: 90,
            reset_url: "http://localhost:8000/reset-password".to_string(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "Admin".to_string(),
            password: "Admin123!".to_string(),
            auto_recreate: true,
            default_user_username: "User".to_string(),
            default_user_password: "User123!".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Offerdesk.toml
    /// 3. Environment variables prefixed with OFFERDESK_
    /// 4. DATABASE_URL (for deployment platforms that inject it directly)
    pub fn load() -> Result<Self, figment::Error> {
        let defaults = toml::to_string(&Config::default()).map_err(|e| figment::Error::from(e.to_string()))?;

        let figment = Figment::new()
            .merge(Toml::string(&defaults).nested())
            .merge(Toml::file("Offerdesk.toml").nested())
            .merge(Env::prefixed("OFFERDESK_").split("_"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()));

        figment.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_figment() {
        let config = Config::load().expect("default config must load");
        assert_eq!(config.security.reset_token_ttl_minutes, 30);
        assert_eq!(config.security.password_expiry_days, 90);
        assert_eq!(config.admin.username, "Admin");
        assert!(config.api.base_path.starts_with('/'));
    }
}
