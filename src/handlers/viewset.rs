//! Action-dispatch routing.
//!
//! A `ViewSet` implements logical actions; `viewset_routes` maps them onto a
//! collection path (`/{prefix}/`) and a detail path (`/{prefix}/:id/`):
//!
//! | verb   | collection | detail           |
//! |--------|------------|------------------|
//! | GET    | list       | retrieve         |
//! | POST   | create     |                  |
//! | PUT    |            | update           |
//! | PATCH  |            | partial_update   |
//! | DELETE |            | destroy          |
//!
//! Before an action runs, the route's `RouteConfig` decides whether an
//! anonymous caller may invoke it at all. Object-level permission checks are
//! left to the viewset, which is the only place the target record is loaded.

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::Method,
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::JsonBody;
use crate::error::ApiError;
use crate::policy::Requester;
use crate::types::Action;

pub type ViewResult = Result<Response, ApiError>;

/// Query parameters understood by `list`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// Per-route authentication requirement, fixed at registration.
#[derive(Debug, Clone, Copy)]
pub struct RouteConfig {
    anonymous_actions: &'static [Action],
}

const ALL_ACTIONS: &[Action] = &[
    Action::List,
    Action::Create,
    Action::Retrieve,
    Action::Update,
    Action::PartialUpdate,
    Action::Destroy,
];

impl RouteConfig {
    /// Every action is open to anonymous callers
    pub const fn public() -> Self {
        Self {
            anonymous_actions: ALL_ACTIONS,
        }
    }

    /// Every action needs an authenticated caller
    pub const fn authenticated() -> Self {
        Self {
            anonymous_actions: &[],
        }
    }

    /// Only the listed actions are open to anonymous callers
    pub const fn anonymous(actions: &'static [Action]) -> Self {
        Self {
            anonymous_actions: actions,
        }
    }

    pub fn allows_anonymous(&self, action: Action) -> bool {
        self.anonymous_actions.contains(&action)
    }

    /// 401 for anonymous callers on actions that need an identity
    pub fn check(&self, requester: &Requester, action: Action) -> Result<(), ApiError> {
        if requester.is_authenticated() || self.allows_anonymous(action) {
            Ok(())
        } else {
            Err(ApiError::unauthorized(format!(
                "Authentication credentials were not provided for {}.",
                action
            )))
        }
    }
}

/// Resource handler organised by action. Unimplemented actions answer 405.
#[async_trait]
pub trait ViewSet: Send + Sync + 'static {
    /// Whether `/{prefix}/:id/` routes exist for this viewset
    const DETAIL_ROUTES: bool = true;

    async fn list(&self, _requester: Requester, _query: ListQuery) -> ViewResult {
        Err(ApiError::method_not_allowed(Action::List.http_method()))
    }

    async fn create(&self, _requester: Requester, _body: Value) -> ViewResult {
        Err(ApiError::method_not_allowed(Action::Create.http_method()))
    }

    async fn retrieve(&self, _requester: Requester, _id: String) -> ViewResult {
        Err(ApiError::method_not_allowed(Action::Retrieve.http_method()))
    }

    async fn update(&self, _requester: Requester, _id: String, _body: Value) -> ViewResult {
        Err(ApiError::method_not_allowed(Action::Update.http_method()))
    }

    async fn partial_update(&self, _requester: Requester, _id: String, _body: Value) -> ViewResult {
        Err(ApiError::method_not_allowed(Action::PartialUpdate.http_method()))
    }

    async fn destroy(&self, _requester: Requester, _id: String) -> ViewResult {
        Err(ApiError::method_not_allowed(Action::Destroy.http_method()))
    }
}

struct Dispatch<V> {
    viewset: V,
    config: RouteConfig,
}

type Shared<V> = State<Arc<Dispatch<V>>>;

/// Register a viewset under `/{prefix}/` with its route configuration.
/// Paths are matched with and without the trailing slash.
pub fn viewset_routes<V, S>(prefix: &str, viewset: V, config: RouteConfig) -> Router<S>
where
    V: ViewSet,
    S: Clone + Send + Sync + 'static,
{
    let dispatch = Arc::new(Dispatch { viewset, config });

    let collection = get(list::<V>).post(create::<V>).fallback(method_not_allowed);
    let mut router = Router::new()
        .route(&format!("/{}", prefix), collection.clone())
        .route(&format!("/{}/", prefix), collection);

    if V::DETAIL_ROUTES {
        let detail = get(retrieve::<V>)
            .put(update::<V>)
            .patch(partial_update::<V>)
            .delete(destroy::<V>)
            .fallback(method_not_allowed);
        router = router
            .route(&format!("/{}/:id", prefix), detail.clone())
            .route(&format!("/{}/:id/", prefix), detail);
    }

    router.with_state(dispatch)
}

async fn list<V: ViewSet>(
    State(d): Shared<V>,
    requester: Requester,
    Query(query): Query<ListQuery>,
) -> ViewResult {
    d.config.check(&requester, Action::List)?;
    d.viewset.list(requester, query).await
}

async fn create<V: ViewSet>(State(d): Shared<V>, requester: Requester, JsonBody(body): JsonBody) -> ViewResult {
    d.config.check(&requester, Action::Create)?;
    d.viewset.create(requester, body).await
}

async fn retrieve<V: ViewSet>(State(d): Shared<V>, requester: Requester, Path(id): Path<String>) -> ViewResult {
    d.config.check(&requester, Action::Retrieve)?;
    d.viewset.retrieve(requester, id).await
}

async fn update<V: ViewSet>(
    State(d): Shared<V>,
    requester: Requester,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> ViewResult {
    d.config.check(&requester, Action::Update)?;
    d.viewset.update(requester, id, body).await
}

async fn partial_update<V: ViewSet>(
    State(d): Shared<V>,
    requester: Requester,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> ViewResult {
    d.config.check(&requester, Action::PartialUpdate)?;
    d.viewset.partial_update(requester, id, body).await
}

async fn destroy<V: ViewSet>(State(d): Shared<V>, requester: Requester, Path(id): Path<String>) -> ViewResult {
    d.config.check(&requester, Action::Destroy)?;
    d.viewset.destroy(requester, id).await
}

/// Fallback for verbs a path does not route, so every 405 carries a `detail` body
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(method.as_str())
}

/// Numeric record ids; anything else cannot name a record
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found())
}
