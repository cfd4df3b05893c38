use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;
use crate::services::response::ServiceError;

/// Opens the pool and proves the server answers within the configured timeout.
/// Any failure here is fatal for the process.
pub async fn connection_pool(config: &Config) -> Result<PgPool, ServiceError> {
	let url = config.database_connection_url();
	tracing::info!(database = %config.db_name, timeout = ?config.db_connect_timeout, "Connecting to document store...");

	let pool = PgPoolOptions::new()
		.max_connections(30)
		.acquire_timeout(config.db_connect_timeout)
		.connect(&url)
		.await
		.map_err(|err| ServiceError::StoreUnavailable(err.to_string()))?;

	tokio::time::timeout(config.db_connect_timeout, sqlx::query("SELECT 1").execute(&pool))
		.await
		.map_err(|_| ServiceError::StoreUnavailable("ping timed out".into()))?
		.map_err(|err| ServiceError::StoreUnavailable(err.to_string()))?;

	tracing::info!("Document store connection successful");
	Ok(pool)
}
