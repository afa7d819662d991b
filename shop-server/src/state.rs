//! Shared application state

use std::sync::Arc;

use shared::util::IdGenerator;
use sqlx::PgPool;

use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Snowflake id generator
    pub ids: Arc<IdGenerator>,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiration_hours: i64,
    /// Bootstrap admin credentials
    pub admin_username: String,
    pub admin_password: String,
}

impl AppState {
    /// Connect to the database, run migrations, and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            ids: Arc::new(IdGenerator::new(config.node_id)),
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiration_hours: config.jwt_expiration_hours,
            admin_username: config.admin_username.clone(),
            admin_password: config.admin_password.clone(),
        })
    }
}
