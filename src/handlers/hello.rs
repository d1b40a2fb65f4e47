// handlers/hello.rs - Demonstration endpoints
//
// /hello-view/     verb dispatch, one handler function per HTTP method
// /hello-viewset/  action dispatch through the ViewSet trait
//
// Neither touches the store; the only work is validating `name`.

use async_trait::async_trait;
use axum::response::{IntoResponse, Json};
use serde_json::{json, Value};

use super::viewset::{ListQuery, ViewResult, ViewSet};
use crate::api::{CharField, JsonBody, Payload};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::policy::Requester;

const NAME: CharField = CharField::required().max_length(10);

fn validated_name(body: &Value) -> Result<String, ApiError> {
    let mut payload = Payload::new(body, false)?;
    let name = payload.char_field("name", NAME);
    payload.finish()?;
    name.ok_or_else(|| ApiError::validation("name", crate::api::validation::REQUIRED))
}

pub async fn view_get() -> Json<Value> {
    Json(json!({
        "message": "Hello Dear",
        "an_apiview": [
            "Uses HTTP methods as function (get, post, patch, put, delete)",
            "Is similar to a traditional handler function",
            "Gives you the most control over your application logic",
            "Is mapped manually to URLs",
        ]
    }))
}

pub async fn view_post(JsonBody(body): JsonBody) -> Result<Json<Value>, ApiError> {
    let name = validated_name(&body)?;
    Ok(Json(json!({ "message": format!("Hello {}", name) })))
}

pub async fn view_put() -> Json<Value> {
    Json(json!({ "method": "put" }))
}

pub async fn view_patch() -> Json<Value> {
    Json(json!({ "method": "patch" }))
}

pub async fn view_delete() -> Json<Value> {
    Json(json!({ "method": "delete" }))
}

pub struct HelloViewSet;

#[async_trait]
impl ViewSet for HelloViewSet {
    async fn list(&self, _requester: Requester, _query: ListQuery) -> ViewResult {
        let body = json!({
            "message": "Hello",
            "a_viewset": [
                "Uses actions (list, create, retrieve, update, partial_update, destroy)",
                "Automatically maps to URLs using a router",
                "Provides more functionality with less code",
            ]
        });
        Ok(ApiResponse::success(body).into_response())
    }

    async fn create(&self, _requester: Requester, body: Value) -> ViewResult {
        let name = validated_name(&body)?;
        Ok(ApiResponse::success(json!({ "message": format!("Hello {}!", name) })).into_response())
    }

    async fn retrieve(&self, _requester: Requester, _id: String) -> ViewResult {
        Ok(ApiResponse::success(json!({ "http_method": "GET" })).into_response())
    }

    async fn update(&self, _requester: Requester, _id: String, _body: Value) -> ViewResult {
        Ok(ApiResponse::success(json!({ "http_method": "PUT" })).into_response())
    }

    async fn partial_update(&self, _requester: Requester, _id: String, _body: Value) -> ViewResult {
        Ok(ApiResponse::success(json!({ "http_method": "PATCH" })).into_response())
    }

    async fn destroy(&self, _requester: Requester, _id: String) -> ViewResult {
        Ok(ApiResponse::success(json!({ "http_method": "DELETE" })).into_response())
    }
}
