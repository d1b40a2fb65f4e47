// handlers/login.rs - POST /login/
//
// Exchanges an email/password pair for a bearer token.

use async_trait::async_trait;
use axum::response::IntoResponse;
use serde_json::{json, Value};
use std::sync::Arc;

use super::viewset::{ViewResult, ViewSet};
use crate::api::validation::normalize_email;
use crate::api::{CharField, Payload};
use crate::auth::password::verify_password;
use crate::auth::TokenService;
use crate::database::Store;
use crate::error::{ApiError, NON_FIELD_ERRORS};
use crate::middleware::ApiResponse;
use crate::policy::Requester;

pub const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

const USERNAME: CharField = CharField::required();
const PASSWORD: CharField = CharField::required().untrimmed();

pub struct LoginViewSet {
    store: Arc<dyn Store>,
    tokens: TokenService,
}

impl LoginViewSet {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }
}

#[async_trait]
impl ViewSet for LoginViewSet {
    const DETAIL_ROUTES: bool = false;

    async fn create(&self, _requester: Requester, body: Value) -> ViewResult {
        let mut payload = Payload::new(&body, false)?;
        // `email` is accepted in place of `username`
        let field = match body.get("username") {
            None if body.get("email").is_some() => "email",
            _ => "username",
        };
        let username = payload.char_field(field, USERNAME);
        let password = payload.char_field("password", PASSWORD);
        payload.finish()?;

        let (Some(username), Some(password)) = (username, password) else {
            return Err(ApiError::validation(NON_FIELD_ERRORS, INVALID_CREDENTIALS));
        };

        let user = match self.store.find_user_by_email(&normalize_email(&username)).await? {
            Some(user) if user.is_active => Some(user),
            _ => None,
        };
        let verified = match &user {
            Some(user) => verify_password(&user.password_hash, &password).await,
            None => false,
        };
        let Some(user) = user.filter(|_| verified) else {
            tracing::warn!("Login failed for {}", username);
            return Err(ApiError::validation(NON_FIELD_ERRORS, INVALID_CREDENTIALS));
        };

        let token = self.tokens.issue(user.id, &user.email)?;
        tracing::info!("Issued token for user {}", user.id);
        Ok(ApiResponse::success(json!({ "token": token })).into_response())
    }
}
