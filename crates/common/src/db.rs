use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;

/// Kanboard tables the notifier reads and writes.
pub const REQUIRED_TABLES: &[&str] = &["projects", "user_has_metadata", "project_has_metadata"];

/// Connect to the Kanboard PostgreSQL database.
///
/// The schema belongs to Kanboard, so nothing is migrated here; the pool is
/// only handed out once the tables the notifier depends on are present.
pub async fn connect_kanboard(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&config.database_url)
        .await?;

    let present: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::TEXT FROM information_schema.tables WHERE table_name = ANY($1)",
    )
    .bind(REQUIRED_TABLES)
    .fetch_all(&pool)
    .await?;

    let missing: Vec<&str> = REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|t| !present.iter().any(|p| p == t))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("Kanboard schema is missing tables: {}", missing.join(", "));
    }

    tracing::info!(
        max_connections = config.db_max_connections,
        "Connected to Kanboard PostgreSQL"
    );
    Ok(pool)
}
