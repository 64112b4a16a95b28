use std::sync::Arc;

use common::storage::ObjectStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::sms::SmsSender;
use crate::trash::PhotoTrash;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    /// Bucket for recall log photos.
    pub recall_store: Arc<dyn ObjectStore>,
    /// Bucket for showing photos.
    pub showing_store: Arc<dyn ObjectStore>,
    pub sms: Arc<dyn SmsSender>,
    pub photo_trash: Arc<PhotoTrash>,
}
