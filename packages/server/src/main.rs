use std::net::SocketAddr;
use std::sync::Arc;

use common::storage::{BucketPolicy, FilesystemStore, ObjectStore, S3Settings, S3Store};
use tracing::{Level, info};

use server::build_router;
use server::config::{AppConfig, StorageConfig};
use server::database::init_db;
use server::sms::UnconfiguredSms;
use server::state::AppState;
use server::trash::PhotoTrash;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    let (recall_store, showing_store) = build_stores(&config.storage).await?;

    let state = AppState {
        db,
        config: config.clone(),
        recall_store,
        showing_store,
        sms: Arc::new(UnconfiguredSms),
        photo_trash: Arc::new(PhotoTrash::new()),
    };

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the recall and showing-photo buckets on the configured backend.
async fn build_stores(
    storage: &StorageConfig,
) -> anyhow::Result<(Arc<dyn ObjectStore>, Arc<dyn ObjectStore>)> {
    match storage.backend.as_str() {
        "filesystem" => {
            let recall: Arc<dyn ObjectStore> = Arc::new(
                FilesystemStore::new(
                    &storage.filesystem_root,
                    &storage.recall_bucket,
                    BucketPolicy::recall(),
                )
                .await?,
            );
            let showing: Arc<dyn ObjectStore> = Arc::new(
                FilesystemStore::new(
                    &storage.filesystem_root,
                    &storage.showing_bucket,
                    BucketPolicy::showing(),
                )
                .await?,
            );
            Ok((recall, showing))
        }
        "s3" => {
            let settings = S3Settings {
                endpoint: storage.s3.endpoint.clone(),
                region: storage.s3.region.clone(),
                access_key: storage.s3.access_key.clone(),
                secret_key: storage.s3.secret_key.clone(),
                path_style: storage.s3.path_style,
            };
            let recall: Arc<dyn ObjectStore> = Arc::new(S3Store::new(
                &settings,
                &storage.recall_bucket,
                BucketPolicy::recall(),
            )?);
            let showing: Arc<dyn ObjectStore> = Arc::new(S3Store::new(
                &settings,
                &storage.showing_bucket,
                BucketPolicy::showing(),
            )?);
            Ok((recall, showing))
        }
        other => anyhow::bail!("Unknown storage backend '{other}' (expected 'filesystem' or 's3')"),
    }
}
