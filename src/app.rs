//! HTTP application wiring.
//!
//! Builds the router from the demo handlers and resource viewsets, and layers
//! authentication, body limits, tracing and CORS on top.

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers::viewset::method_not_allowed;
use crate::handlers::{
    hello, system, viewset_routes, FeedViewSet, HelloViewSet, LoginViewSet, ProfileViewSet, RouteConfig,
};
use crate::middleware::authenticate;
use crate::types::Action;

/// Actions anonymous callers may invoke on /profiles/. Create is registration.
const PROFILE_ANONYMOUS_ACTIONS: &[Action] = &[Action::List, Action::Retrieve, Action::Create];

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }
}

pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let hello_view: MethodRouter<AppState> = get(hello::view_get)
        .post(hello::view_post)
        .put(hello::view_put)
        .patch(hello::view_patch)
        .delete(hello::view_delete)
        .fallback(method_not_allowed);

    let mut router = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/hello-view", hello_view.clone())
        .route("/hello-view/", hello_view)
        .merge(viewset_routes::<_, AppState>("hello-viewset", HelloViewSet, RouteConfig::public()))
        .merge(viewset_routes::<_, AppState>(
            "profiles",
            ProfileViewSet::new(state.store.clone()),
            RouteConfig::anonymous(PROFILE_ANONYMOUS_ACTIONS),
        ))
        .merge(viewset_routes::<_, AppState>(
            "feed",
            FeedViewSet::new(state.store.clone()),
            RouteConfig::authenticated(),
        ))
        .merge(viewset_routes::<_, AppState>(
            "login",
            LoginViewSet::new(state.store.clone(), state.tokens.clone()),
            RouteConfig::public(),
        ))
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
                .layer(from_fn_with_state(state.clone(), authenticate)),
        )
        .with_state(state);

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    router
}

/// Permissive when no origins are configured, otherwise restricted to the list
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
