use std::sync::Arc;

use crate::config::Settings;
use crate::db::{self, Db};
use crate::email::Mailer;
use crate::revalidate::Revalidator;
use crate::storage::{LocalStorage, ObjectStorage, Storage};

/// Everything a request handler needs, assembled once at startup and
/// shared by reference from then on.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub settings: Arc<Settings>,
    pub storage: Arc<dyn Storage>,
    pub revalidator: Revalidator,
    pub mailer: Option<Arc<Mailer>>,
}

impl AppState {
    pub async fn initialize(settings: Settings) -> anyhow::Result<Self> {
        let db = db::connect(&settings).await?;

        // the storage backend is picked once, here, not per call site
        let storage: Arc<dyn Storage> =
            match (settings.blob_api_url.clone(), settings.blob_token.clone()) {
                (Some(api_url), Some(token)) => {
                    tracing::info!(%api_url, "storing uploads in the blob service");
                    Arc::new(ObjectStorage::new(api_url, token))
                }
                _ => {
                    tracing::info!(directory = %settings.upload_dir.display(), "storing uploads on the local filesystem");
                    Arc::new(LocalStorage::new(
                        settings.upload_dir.clone(),
                        settings.upload_prefix.clone(),
                    ))
                }
            };

        let revalidator = Revalidator::new(settings.revalidate_url.clone());
        let mailer = Mailer::from_settings(&settings).map(Arc::new);

        Ok(Self {
            db,
            settings: Arc::new(settings),
            storage,
            revalidator,
            mailer,
        })
    }
}
