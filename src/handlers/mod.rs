// handlers/mod.rs - Request handlers
//
// Two dispatch styles live side by side:
//   hello::view_*      one function per HTTP verb, wired by hand in app.rs
//   viewset::ViewSet   one method per action, wired by viewset_routes()
//
// Resource viewsets (profiles, feed) follow the same pipeline for every
// object-level action: load target (404) -> authorize (401/403) -> validate (400) -> execute.

pub mod feed;
pub mod hello;
pub mod login;
pub mod profiles;
pub mod system;
pub mod viewset;

pub use feed::FeedViewSet;
pub use hello::HelloViewSet;
pub use login::LoginViewSet;
pub use profiles::ProfileViewSet;
pub use viewset::{viewset_routes, RouteConfig, ViewSet};

use crate::error::ApiError;
use crate::policy::{Decision, Requester};
use crate::types::Action;

/// Turn a policy decision into a response error.
/// Anonymous callers get 401 so they know credentials would help; identified
/// callers get 403.
pub(crate) fn enforce(decision: Decision, requester: &Requester, action: Action) -> Result<(), ApiError> {
    if decision.is_allowed() {
        return Ok(());
    }

    match requester.identity() {
        Some(identity) => {
            tracing::debug!("Denied {} for user {}", action, identity.user_id);
            Err(ApiError::forbidden(format!(
                "You do not have permission to perform {}.",
                action
            )))
        }
        None => Err(ApiError::unauthorized(format!(
            "Authentication credentials were not provided for {}.",
            action
        ))),
    }
}
