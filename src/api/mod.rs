//! REST API layer: route handlers, DTOs, extractors and router composition.
//!
//! Diary and auth endpoints are mounted under `/api/v1`; the health check
//! and the OpenAPI document live at the root.

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .merge(openapi::routes())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{
        DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_REFRESH_TOKEN_TTL_SECS, DiaryConfig, Environment,
    };
    use crate::persistence::MemoryStore;

    fn app() -> Router {
        let config = DiaryConfig {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: String::new(),
            database_max_connections: 1,
            database_min_connections: 0,
            database_connect_timeout_secs: 1,
            persistence_enabled: false,
            environment: Environment::Development,
            timezone: chrono_tz::America::Sao_Paulo,
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TOKEN_TTL_SECS,
        };
        build_router().with_state(AppState::new(&config, Arc::new(MemoryStore::new())))
    }

    fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(extractors::USER_ID_HEADER, user);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let Ok(request) = builder.body(body) else {
            panic!("valid request");
        };
        request
    }

    async fn send(app: Router, request: Request<Body>) -> Response {
        match app.oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    async fn json_body(response: Response) -> Value {
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("readable body");
        };
        let Ok(value) = serde_json::from_slice(&bytes) else {
            panic!("json body");
        };
        value
    }

    fn meal_body() -> Value {
        json!({
            "date": "2024-05-20",
            "meal": {
                "type": "lunch",
                "time": "12:30",
                "foods": [{ "foodId": "f-rice", "foodName": "Rice", "quantity_g": 150 }]
            }
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = send(app(), request("GET", "/health", None, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["timezone"], "America/Sao_Paulo");
        assert_eq!(body["utcOffset"], "-03:00");
    }

    #[tokio::test]
    async fn diary_routes_require_a_user() {
        let response = send(app(), request("GET", "/api/v1/diary", None, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], 1003);
    }

    #[tokio::test]
    async fn create_then_fetch_a_meal() {
        let app = app();
        let created = send(
            app.clone(),
            request("POST", "/api/v1/diary/meals", Some("alice"), Some(meal_body())),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = json_body(created).await;
        assert_eq!(created["type"], "meal");
        assert_eq!(created["userId"], "alice");
        let Some(id) = created["id"].as_str() else {
            panic!("id missing");
        };

        let uri = format!("/api/v1/diary/{id}");
        let fetched = send(app.clone(), request("GET", &uri, Some("alice"), None)).await;
        assert_eq!(fetched.status(), StatusCode::OK);

        let other = send(app, request("GET", &uri, Some("bob"), None)).await;
        assert_eq!(other.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_bodies_report_every_field() {
        let body = json!({
            "date": "20-05-2024",
            "meal": { "type": "brunch", "time": "12:30", "foods": [] }
        });
        let response = send(
            app(),
            request("POST", "/api/v1/diary/meals", Some("alice"), Some(body)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        let Some(details) = body["error"]["details"].as_array() else {
            panic!("details missing");
        };
        let fields: Vec<&str> = details.iter().filter_map(|d| d["field"].as_str()).collect();
        assert!(fields.contains(&"date"));
        assert!(fields.contains(&"meal.type"));
        assert!(fields.contains(&"meal.foods"));
    }

    #[tokio::test]
    async fn logout_clears_both_token_cookies() {
        let response = send(app(), request("POST", "/api/v1/auth/logout", None, None)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookies: Vec<&str> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }
}
