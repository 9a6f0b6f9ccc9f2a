use anyhow::Context;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;

use crate::config::Settings;

/// The shared database handle. The `any` engine lets the connection string
/// pick the backend, so tests run on `mem://` while deployments point at
/// an embedded or remote instance.
pub type Db = Surreal<Any>;

pub async fn connect(settings: &Settings) -> anyhow::Result<Db> {
    let db = surrealdb::engine::any::connect(settings.database_url.as_str())
        .await
        .with_context(|| format!("failed to connect to database at {}", settings.database_url))?;
    db.use_ns(&settings.database_ns)
        .use_db(&settings.database_db)
        .await
        .context("failed to select database namespace")?;

    tracing::info!(address = %settings.database_url, "database connection established");

    Ok(db)
}
