// handlers/profiles.rs - /profiles/ resource
//
// Anyone may list, search, retrieve and register (create). Update and destroy
// need a token and are limited to the profile's owner.

use async_trait::async_trait;
use axum::response::IntoResponse;
use serde_json::Value;
use std::sync::Arc;

use super::enforce;
use super::viewset::{parse_id, ListQuery, ViewResult, ViewSet};
use crate::api::{CharField, Payload};
use crate::auth::password::hash_password;
use crate::database::{NewProfile, Profile, ProfileChanges, SearchQuery, Store};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::policy::{authorize_profile, Requester};
use crate::types::Action;

const EMAIL: CharField = CharField::required().max_length(255);
const NAME: CharField = CharField::required().max_length(255);
const PASSWORD: CharField = CharField::required().max_length(128).untrimmed();
const BIO: CharField = CharField::optional();

pub struct ProfileViewSet {
    store: Arc<dyn Store>,
}

impl ProfileViewSet {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn load(&self, id: &str) -> Result<Profile, ApiError> {
        let id = parse_id(id)?;
        self.store
            .find_profile_by_id(id)
            .await?
            .ok_or_else(ApiError::not_found)
    }

    async fn save(&self, requester: Requester, id: String, body: Value, action: Action) -> ViewResult {
        let profile = self.load(&id).await?;
        enforce(authorize_profile(&requester, &profile, action), &requester, action)?;

        let partial = action == Action::PartialUpdate;
        let mut payload = Payload::new(&body, partial)?;
        let email = payload.email_field("email", EMAIL);
        let name = payload.char_field("name", NAME);
        let bio = payload.char_field("bio", BIO);
        // Passwords are never required on update; absent means unchanged
        let password = payload.char_field("password", CharField { required: false, ..PASSWORD });
        payload.finish()?;

        let password_hash = match password {
            Some(password) => Some(hash_password(&password).await?),
            None => None,
        };
        let changes = ProfileChanges {
            email,
            name,
            bio,
            password_hash,
        };
        let saved = self.store.save_profile(profile.id, changes).await?;

        tracing::info!("Profile {} updated ({})", saved.id, action);
        Ok(ApiResponse::success(saved).into_response())
    }
}

#[async_trait]
impl ViewSet for ProfileViewSet {
    async fn list(&self, _requester: Requester, query: ListQuery) -> ViewResult {
        let search = SearchQuery::parse(query.search.as_deref());
        let profiles = self.store.list_profiles(&search).await?;
        Ok(ApiResponse::success(profiles).into_response())
    }

    async fn create(&self, _requester: Requester, body: Value) -> ViewResult {
        let mut payload = Payload::new(&body, false)?;
        let email = payload.email_field("email", EMAIL);
        let name = payload.char_field("name", NAME);
        let password = payload.char_field("password", PASSWORD);
        let bio = payload.char_field("bio", BIO);
        payload.finish()?;

        let (Some(email), Some(name), Some(password)) = (email, name, password) else {
            return Err(ApiError::internal_server_error("validated profile is missing fields"));
        };

        // The new profile is owned by the identity created with it
        let profile = self
            .store
            .create_profile(NewProfile {
                email,
                name,
                bio: bio.unwrap_or_default(),
                password_hash: hash_password(&password).await?,
                is_staff: false,
            })
            .await?;

        tracing::info!("Registered profile {} for user {}", profile.id, profile.user_id);
        Ok(ApiResponse::created(profile).into_response())
    }

    async fn retrieve(&self, requester: Requester, id: String) -> ViewResult {
        let profile = self.load(&id).await?;
        enforce(authorize_profile(&requester, &profile, Action::Retrieve), &requester, Action::Retrieve)?;
        Ok(ApiResponse::success(profile).into_response())
    }

    async fn update(&self, requester: Requester, id: String, body: Value) -> ViewResult {
        self.save(requester, id, body, Action::Update).await
    }

    async fn partial_update(&self, requester: Requester, id: String, body: Value) -> ViewResult {
        self.save(requester, id, body, Action::PartialUpdate).await
    }

    async fn destroy(&self, requester: Requester, id: String) -> ViewResult {
        let profile = self.load(&id).await?;
        enforce(authorize_profile(&requester, &profile, Action::Destroy), &requester, Action::Destroy)?;

        self.store.delete_profile_by_id(profile.id).await?;
        tracing::info!("Deleted profile {} and deactivated user {}", profile.id, profile.user_id);
        Ok(ApiResponse::no_content().into_response())
    }
}
