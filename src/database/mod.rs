pub mod memory;
pub mod models;
pub mod postgres;
pub mod search;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::DatabaseConfig;

pub use models::{FeedItem, NewProfile, Profile, ProfileChanges, User};
pub use search::SearchQuery;

pub const DUPLICATE_EMAIL: &str = "user profile with this email already exists.";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict on {field}: {message}")]
    Conflict { field: String, message: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl StoreError {
    pub fn duplicate_email() -> Self {
        StoreError::Conflict {
            field: "email".to_string(),
            message: DUPLICATE_EMAIL.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Identity lookups backing login and token resolution.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;
    /// Case-insensitive match on the identity email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn list_profiles(&self, search: &SearchQuery) -> StoreResult<Vec<Profile>>;
    async fn find_profile_by_id(&self, id: i64) -> StoreResult<Option<Profile>>;
    async fn find_profile_by_user(&self, user_id: i64) -> StoreResult<Option<Profile>>;
    /// Create an identity and its profile atomically
    async fn create_profile(&self, new: NewProfile) -> StoreResult<Profile>;
    /// Apply changes to the profile and mirror email/name/password onto its identity
    async fn save_profile(&self, id: i64, changes: ProfileChanges) -> StoreResult<Profile>;
    /// Remove the profile and its feed items, and deactivate the identity
    async fn delete_profile_by_id(&self, id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn list_feed_items(&self) -> StoreResult<Vec<FeedItem>>;
    async fn find_feed_item_by_id(&self, id: i64) -> StoreResult<Option<FeedItem>>;
    async fn create_feed_item(&self, user_profile: i64, status_text: String) -> StoreResult<FeedItem>;
    async fn save_feed_item(&self, id: i64, status_text: String) -> StoreResult<FeedItem>;
    async fn delete_feed_item_by_id(&self, id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait Store: CredentialStore + ProfileStore + FeedStore {
    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}

/// Open the configured backend: Postgres when a URL is set (schema created on
/// first use), otherwise an empty in-memory store.
pub async fn open_store(config: &DatabaseConfig) -> StoreResult<Arc<dyn Store>> {
    match config.url.as_deref() {
        Some(url) => {
            let store = postgres::PostgresStore::connect(url, config).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
            Ok(Arc::new(memory::InMemoryStore::new()))
        }
    }
}
