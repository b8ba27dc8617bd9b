use axum::{
    body::Bytes,
    extract::State,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::cache::resource::Resource;
use crate::error::ProxyError;
use crate::proxy::service::ServiceStatus;
use crate::server::server::AppState;

static KEYS_PAGE: &str = include_str!("../../assets/keys.html");

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/keys", get(keys_page))
        .route("/save-keys", post(save_keys))
        .route("/flightdata", get(flightdata))
        .route("/updates", get(updates))
        .route("/health", get(health))
        .route("/status", get(status))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveCredentialsRequest {
    pub app_id: String,
    pub app_key: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SaveCredentialsResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn home(State(state): State<AppState>) -> Html<String> {
    let status = state.service.status().await;
    let credentials = if status.credentials_configured {
        "configured"
    } else {
        "missing, go to /keys"
    };
    let refreshed = status
        .last_refreshed_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    Html(format!(
        r#"<h1>Flight operations proxy</h1>
<p>Credentials: {}</p>
<p>Last refresh: {}</p>
<p><a href="/keys">Enter or change app_id and app_key</a></p>
<p><a href="/flightdata">Flight data</a> | <a href="/updates">Updates</a></p>
"#,
        credentials, refreshed
    ))
}

async fn keys_page() -> Html<&'static str> {
    Html(KEYS_PAGE)
}

/// Always answers 200; the outcome travels in `success` / `error`.
async fn save_keys(State(state): State<AppState>, body: Bytes) -> Json<SaveCredentialsResponse> {
    // an unreadable body is handled like one with both fields empty
    let request: SaveCredentialsRequest = serde_json::from_slice(&body).unwrap_or_else(|err| {
        debug!("save-keys body is not valid JSON: {}", err);
        SaveCredentialsRequest::default()
    });

    let response = match state
        .service
        .save_credentials(&request.app_id, &request.app_key)
        .await
    {
        Ok(()) => SaveCredentialsResponse {
            success: true,
            error: None,
        },
        Err(err) => SaveCredentialsResponse {
            success: false,
            error: Some(err.to_string()),
        },
    };
    Json(response)
}

async fn flightdata(State(state): State<AppState>) -> Result<Json<Arc<Value>>, ProxyError> {
    state.service.read(Resource::Primary).await.map(Json)
}

async fn updates(State(state): State<AppState>) -> Result<Json<Arc<Value>>, ProxyError> {
    state.service.read(Resource::Secondary).await.map(Json)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Server is healthy" }))
}

async fn status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.service.status().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use httpmock::Method::GET;
    use httpmock::MockServer;

    use crate::credentials::store::Credentials;
    use crate::error::UNAVAILABLE_MSG;
    use crate::tests::common::{build_reqwest_client, spawn_proxy, test_upstream_config};

    #[tokio::test]
    async fn health_reports_ok() -> anyhow::Result<()> {
        let upstream = MockServer::start_async().await;
        let (handle, addr, _) =
            spawn_proxy(test_upstream_config(&upstream.base_url()), Credentials::default()).await?;

        let res = build_reqwest_client()
            .get(format!("http://{}/health", addr))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body["status"], "ok");

        handle.abort();
        Ok(())
    }

    #[tokio::test]
    async fn data_view_without_credentials_is_500_with_message() -> anyhow::Result<()> {
        let upstream = MockServer::start_async().await;
        let (handle, addr, _) =
            spawn_proxy(test_upstream_config(&upstream.base_url()), Credentials::default()).await?;

        for route in ["flightdata", "updates"] {
            let res = build_reqwest_client()
                .get(format!("http://{}/{}", addr, route))
                .send()
                .await?;
            assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "/{}", route);
            assert_eq!(res.text().await?, UNAVAILABLE_MSG, "/{}", route);
        }

        handle.abort();
        Ok(())
    }

    #[tokio::test]
    async fn data_view_serves_cached_document_verbatim() -> anyhow::Result<()> {
        let upstream = MockServer::start_async().await;
        upstream
            .mock_async(|when, then| {
                when.method(GET).path("/flights");
                then.status(200).json_body(json!({"flights": [{"id": "EI123"}]}));
            })
            .await;
        upstream
            .mock_async(|when, then| {
                when.method(GET).path("/updates");
                then.status(500);
            })
            .await;

        let (handle, addr, _) = spawn_proxy(
            test_upstream_config(&upstream.base_url()),
            Credentials::new("idABC", "keyXYZ"),
        )
        .await?;

        let res = build_reqwest_client()
            .get(format!("http://{}/flightdata", addr))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body, json!({"flights": [{"id": "EI123"}]}));

        handle.abort();
        Ok(())
    }

    #[tokio::test]
    async fn save_keys_with_missing_field_reports_error() -> anyhow::Result<()> {
        let upstream = MockServer::start_async().await;
        let (handle, addr, service) =
            spawn_proxy(test_upstream_config(&upstream.base_url()), Credentials::default()).await?;

        let res = build_reqwest_client()
            .post(format!("http://{}/save-keys", addr))
            .json(&json!({"app_id": "idABC"}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: SaveCredentialsResponse = res.json().await?;
        assert!(!body.success);
        assert!(body.error.unwrap().contains("app_id and app_key"));
        assert!(!service.credentials().is_configured().await);

        handle.abort();
        Ok(())
    }

    #[tokio::test]
    async fn save_keys_with_garbage_body_is_treated_as_empty() -> anyhow::Result<()> {
        let upstream = MockServer::start_async().await;
        let (handle, addr, _) =
            spawn_proxy(test_upstream_config(&upstream.base_url()), Credentials::default()).await?;

        let res = build_reqwest_client()
            .post(format!("http://{}/save-keys", addr))
            .body("app_id=idABC")
            .send()
            .await?;
        let body: SaveCredentialsResponse = res.json().await?;
        assert!(!body.success);
        assert!(body.error.is_some());

        handle.abort();
        Ok(())
    }

    #[tokio::test]
    async fn keys_page_posts_to_save_endpoint() -> anyhow::Result<()> {
        let upstream = MockServer::start_async().await;
        let (handle, addr, _) =
            spawn_proxy(test_upstream_config(&upstream.base_url()), Credentials::default()).await?;

        let res = build_reqwest_client()
            .get(format!("http://{}/keys", addr))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let html = res.text().await?;
        assert!(html.contains("/save-keys"));

        handle.abort();
        Ok(())
    }

    #[tokio::test]
    async fn home_shows_missing_credentials() -> anyhow::Result<()> {
        let upstream = MockServer::start_async().await;
        let (handle, addr, _) =
            spawn_proxy(test_upstream_config(&upstream.base_url()), Credentials::default()).await?;

        let html = build_reqwest_client()
            .get(format!("http://{}/", addr))
            .send()
            .await?
            .text()
            .await?;
        assert!(html.contains("missing, go to /keys"));
        assert!(html.contains("Last refresh: never"));

        handle.abort();
        Ok(())
    }
}
