//! Server configuration
//!
//! Everything comes from environment variables (a `.env` file is loaded in
//! development). `DATABASE_URL` wins when set; otherwise the URL is composed
//! from the individual `DATABASE_*` variables.

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind host
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Path prefix for all routes, e.g. "/api"
    pub base_path: String,
    /// Comma-separated CORS origins; "*" allows any
    pub allowed_origins: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiration_hours: i64,
    /// Snowflake node id (distinct per instance)
    pub node_id: u16,
    /// Bootstrap admin credentials
    pub admin_username: String,
    pub admin_password: String,
    /// Environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn database_url() -> Result<String, BoxError> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            return Ok(url);
        }

        let host = std::env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".into());
        let port = std::env::var("DATABASE_PORT").unwrap_or_else(|_| "5432".into());
        let username = std::env::var("DATABASE_USERNAME").unwrap_or_else(|_| "postgres".into());
        let password =
            std::env::var("DATABASE_PASSWORD").map_err(|_| "DATABASE_PASSWORD must be set")?;
        let dbname = std::env::var("DATABASE_DBNAME").unwrap_or_else(|_| "shop".into());

        Ok(format!(
            "postgres://{username}:{password}@{host}:{port}/{dbname}"
        ))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_path: std::env::var("SERVER_BASE_PATH").unwrap_or_else(|_| "/api".into()),
            allowed_origins: std::env::var("SERVER_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".into()),
            database_url: Self::database_url()?,
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiration_hours: std::env::var("JWT_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            node_id: std::env::var("NODE_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: Self::require_secret("ADMIN_PASSWORD", &environment)?,
            environment,
        })
    }
}
