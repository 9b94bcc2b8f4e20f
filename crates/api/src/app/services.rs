use std::sync::Arc;

use anyhow::Context;

use catalog_auth::Hs256TokenService;
use catalog_infra::{
    db, CatalogStore, Config, FileSystemStorage, MediaStorage, SqliteCatalogStore, SqliteUserStore,
    UserStore,
};

/// Shared handles injected into every handler.
pub struct AppServices {
    pub catalog: Arc<dyn CatalogStore>,
    pub users: Arc<dyn UserStore>,
    pub media: Arc<dyn MediaStorage>,
    pub tokens: Arc<Hs256TokenService>,
}

pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let pool = db::open(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    tracing::info!(
        database_url = %config.database_url,
        media_root = %config.media_root.display(),
        debug = config.debug,
        "services ready"
    );

    let tokens = Hs256TokenService::new(
        config.jwt_secret.as_bytes(),
        chrono::Duration::seconds(config.access_token_ttl_secs),
        chrono::Duration::seconds(config.refresh_token_ttl_secs),
    );

    Ok(AppServices {
        catalog: Arc::new(SqliteCatalogStore::new(pool.clone())),
        users: Arc::new(SqliteUserStore::new(pool)),
        media: Arc::new(FileSystemStorage::new(
            config.media_root.clone(),
            config.media_url.clone(),
        )),
        tokens: Arc::new(tokens),
    })
}
