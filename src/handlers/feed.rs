// handlers/feed.rs - /feed/ resource
//
// Every action needs a token. Items are readable by any authenticated caller
// and writable only by the identity that owns the item's profile.

use async_trait::async_trait;
use axum::response::IntoResponse;
use serde_json::Value;
use std::sync::Arc;

use super::enforce;
use super::viewset::{parse_id, ListQuery, ViewResult, ViewSet};
use crate::api::{CharField, Payload};
use crate::database::{FeedItem, Store};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::policy::{authorize_feed_item, Requester};
use crate::types::Action;

const STATUS_TEXT: CharField = CharField::required().max_length(255);

pub struct FeedViewSet {
    store: Arc<dyn Store>,
}

impl FeedViewSet {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Load the target and run the feed-item policy against it
    async fn authorized(&self, requester: &Requester, id: &str, action: Action) -> Result<FeedItem, ApiError> {
        let id = parse_id(id)?;
        let item = self
            .store
            .find_feed_item_by_id(id)
            .await?
            .ok_or_else(ApiError::not_found)?;
        enforce(authorize_feed_item(requester, &item, action), requester, action)?;
        Ok(item)
    }

    async fn save(&self, requester: Requester, id: String, body: Value, action: Action) -> ViewResult {
        let item = self.authorized(&requester, &id, action).await?;

        let mut payload = Payload::new(&body, action == Action::PartialUpdate)?;
        let status_text = payload.char_field("status_text", STATUS_TEXT);
        payload.finish()?;

        // user_profile is read-only; a PATCH without status_text changes nothing
        let saved = match status_text {
            Some(text) => self.store.save_feed_item(item.id, text).await?,
            None => item,
        };
        Ok(ApiResponse::success(saved).into_response())
    }
}

#[async_trait]
impl ViewSet for FeedViewSet {
    async fn list(&self, requester: Requester, _query: ListQuery) -> ViewResult {
        let items: Vec<FeedItem> = self
            .store
            .list_feed_items()
            .await?
            .into_iter()
            .filter(|item| authorize_feed_item(&requester, item, Action::List).is_allowed())
            .collect();
        Ok(ApiResponse::success(items).into_response())
    }

    async fn create(&self, requester: Requester, body: Value) -> ViewResult {
        let identity = requester
            .identity()
            .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided."))?;

        let mut payload = Payload::new(&body, false)?;
        let status_text = payload.char_field("status_text", STATUS_TEXT);
        payload.finish()?;

        // Any user_profile in the body is ignored; the owner is always the caller
        let Some(profile_id) = identity.profile_id else {
            return Err(ApiError::forbidden(format!("User {} has no profile", identity.user_id)));
        };
        let Some(status_text) = status_text else {
            return Err(ApiError::internal_server_error("validated feed item is missing status_text"));
        };

        let item = self.store.create_feed_item(profile_id, status_text).await?;
        tracing::info!("Created feed item {} for profile {}", item.id, profile_id);
        Ok(ApiResponse::created(item).into_response())
    }

    async fn retrieve(&self, requester: Requester, id: String) -> ViewResult {
        let item = self.authorized(&requester, &id, Action::Retrieve).await?;
        Ok(ApiResponse::success(item).into_response())
    }

    async fn update(&self, requester: Requester, id: String, body: Value) -> ViewResult {
        self.save(requester, id, body, Action::Update).await
    }

    async fn partial_update(&self, requester: Requester, id: String, body: Value) -> ViewResult {
        self.save(requester, id, body, Action::PartialUpdate).await
    }

    async fn destroy(&self, requester: Requester, id: String) -> ViewResult {
        let item = self.authorized(&requester, &id, Action::Destroy).await?;
        self.store.delete_feed_item_by_id(item.id).await?;
        Ok(ApiResponse::no_content().into_response())
    }
}
