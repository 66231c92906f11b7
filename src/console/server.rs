// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::http::{HeaderValue, Method, header};
use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::console::{
    routes,
    state::{AppState, ConsoleConfig},
};

/// 启动 Console HTTP Server
pub async fn run(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting workload console on port {}", port);

    let state = AppState::new(ConsoleConfig::from_env());
    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Console server listening on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  - GET  /api/v1/workloads/kinds");
    tracing::info!("  - GET  /api/v1/workloads/{{kind}}/template");
    tracing::info!("  - POST /api/v1/workloads/{{kind}}/yaml");
    tracing::info!("  - POST /api/v1/workloads/form");
    tracing::info!("  - GET  /healthz");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the console application with its middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/readyz", get(ready_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new().merge(routes::workload_routes())
}

fn cors_layer(config: &ConsoleConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match config.allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(error) => {
            warn!(origin = %config.allowed_origin, %error, "ignoring invalid CORS origin");
            cors
        }
    }
}

/// 健康检查
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 就绪检查
async fn ready_check() -> impl IntoResponse {
    (StatusCode::OK, "Ready")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::error::ErrorResponse;
    use crate::console::models::workload::{
        KindListResponse, ParseResponse, RenderResponse, TemplateResponse,
    };
    use crate::tests::create_test_descriptor;
    use crate::types::kind::WorkloadKind;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(ConsoleConfig {
            default_namespace: "apps".to_string(),
            ..Default::default()
        }))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        (status, body.to_vec())
    }

    fn json<T: DeserializeOwned>(body: &[u8]) -> T {
        serde_json::from_slice(body).expect("body should be JSON")
    }

    fn post_json(uri: &str, body: String) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request")
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (status, body) = send(Request::get("/healthz").body(Body::empty()).expect("request")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");

        let (status, _) = send(Request::get("/readyz").body(Body::empty()).expect("request")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_kinds() {
        let (status, body) = send(
            Request::get("/api/v1/workloads/kinds")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let response: KindListResponse = json(&body);
        assert_eq!(response.kinds.len(), 6);
        let rollout = response
            .kinds
            .iter()
            .find(|info| info.kind == WorkloadKind::Rollout)
            .expect("rollout listed");
        assert_eq!(rollout.api_version, "argoproj.io/v1alpha1");
        assert!(rollout.has_replicas);
    }

    #[tokio::test]
    async fn test_template_uses_configured_namespace() {
        let (status, body) = send(
            Request::get("/api/v1/workloads/cronjob/template")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let response: TemplateResponse = json(&body);
        assert_eq!(response.kind, WorkloadKind::CronJob);
        assert_eq!(response.descriptor.name, "example-cronjob");
        assert_eq!(response.descriptor.namespace, "apps");
        assert_eq!(response.descriptor.replicas, None);
        assert!(response.yaml.contains("kind: CronJob"));
    }

    #[tokio::test]
    async fn test_render_descriptor() {
        let body = serde_json::to_string(&create_test_descriptor()).expect("serialize");
        let (status, body) = send(post_json("/api/v1/workloads/StatefulSet/yaml", body)).await;
        assert_eq!(status, StatusCode::OK);

        let response: RenderResponse = json(&body);
        assert_eq!(response.kind, WorkloadKind::StatefulSet);
        assert!(response.yaml.contains("kind: StatefulSet"));
        assert!(response.yaml.contains("serviceName: test-workload"));
    }

    #[tokio::test]
    async fn test_unknown_kind_is_rejected() {
        let (status, body) = send(post_json("/api/v1/workloads/Pod/yaml", "{}".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let response: ErrorResponse = json(&body);
        assert_eq!(response.error, "UnsupportedKind");
    }

    #[tokio::test]
    async fn test_malformed_descriptor_body_is_bad_request() {
        let (status, body) = send(post_json("/api/v1/workloads/Job/yaml", "{not json".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json::<ErrorResponse>(&body).error, "BadRequest");
    }

    #[tokio::test]
    async fn test_parse_manifest() {
        let request = serde_json::json!({
            "yaml": "kind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: 2\n",
        });
        let (status, body) = send(post_json("/api/v1/workloads/form", request.to_string())).await;
        assert_eq!(status, StatusCode::OK);

        let response: ParseResponse = json(&body);
        assert_eq!(response.kind, Some(WorkloadKind::Deployment));
        assert_eq!(response.descriptor.name, "web");
        assert_eq!(response.descriptor.replicas, Some(2));
    }

    #[tokio::test]
    async fn test_parse_malformed_yaml() {
        let request = serde_json::json!({ "yaml": "spec: [oops" });
        let (status, body) = send(post_json("/api/v1/workloads/form", request.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let response: ErrorResponse = json(&body);
        assert_eq!(response.error, "InvalidManifest");
        assert!(response.details.is_some_and(|details| details.starts_with("invalid YAML")));
    }
}
