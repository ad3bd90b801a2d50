use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::stream;
use genforge_relay::{GenerationRequest, Relay, RelayError, RelayStream};

/// Shared handler state.
pub struct AppState {
    /// The relay used for every generation request.
    pub relay: Relay,
}

/// Builds the API router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/generate", post(generate))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/v1/generate` — starts a generation and streams wire
/// events as SSE.
///
/// Pre-stream failures (empty prompt, missing credentials) come back
/// as a synchronous JSON error response, never as a wire event.
async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> Response {
    match state.relay.generate(request).await {
        Ok(relay_stream) => {
            tracing::debug!(request_id = %relay_stream.request_id(), "generation stream started");
            sse_response(relay_stream)
        }
        Err(err) => error_response(err),
    }
}

fn sse_response(relay_stream: RelayStream) -> Response {
    let events = stream::unfold(relay_stream, |mut rs| async move {
        let event = rs.next_event().await?;
        let sse = Event::default().event(event.tag()).data(
            serde_json::to_string(&event).expect("WireEvent serialization should be infallible"),
        );
        Some((Ok::<Event, Infallible>(sse), rs))
    });
    Sse::new(events)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("ping"),
        )
        .into_response()
}

fn error_response(err: RelayError) -> Response {
    let status = match &err {
        RelayError::Validation(_) => StatusCode::BAD_REQUEST,
        RelayError::Config(_) | RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use futures::stream as futures_stream;
    use genforge_relay::{
        CompletionRequest, ProviderId, RelayConfig, UpstreamClient, UpstreamError, UpstreamEvent,
        UpstreamStreamHandle,
    };
    use http_body_util::BodyExt as _;
    use tower::ServiceExt as _;

    struct ScriptedUpstream {
        events: Vec<Result<UpstreamEvent, UpstreamError>>,
    }

    #[async_trait::async_trait]
    impl UpstreamClient for ScriptedUpstream {
        fn id(&self) -> ProviderId {
            ProviderId::new("scripted")
        }

        async fn start_stream(
            &self,
            _request: CompletionRequest,
        ) -> Result<UpstreamStreamHandle, UpstreamError> {
            Ok(UpstreamStreamHandle {
                stream: Box::pin(futures_stream::iter(self.events.clone())),
            })
        }
    }

    fn router_with(events: Vec<Result<UpstreamEvent, UpstreamError>>) -> Router {
        let relay = Relay::new(
            Arc::new(ScriptedUpstream { events }),
            RelayConfig::default(),
        );
        build_router(Arc::new(AppState { relay }))
    }

    fn generate_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_is_ok() {
        let router = router_with(vec![]);
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn generate_streams_deltas_then_done_as_sse() {
        let router = router_with(vec![
            Ok(UpstreamEvent::TextDelta {
                text: "```js\nlet a = 1;\n```".into(),
            }),
            Ok(UpstreamEvent::Completed),
        ]);
        let response = router
            .oneshot(generate_request(r#"{"prompt":"a variable"}"#))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/event-stream"));

        let body = response.into_body().collect().await.expect("body");
        let text = String::from_utf8(body.to_bytes().to_vec()).expect("utf8");
        assert!(text.contains("event: code_delta"));
        assert!(text.contains("event: done"));
        assert!(text.contains(r#""code":"let a = 1;""#));
    }

    #[tokio::test]
    async fn upstream_failure_ends_the_stream_with_an_error_event() {
        let router = router_with(vec![Err(UpstreamError::provider(
            "scripted",
            "overloaded",
            Some(529),
        ))]);
        let response = router
            .oneshot(generate_request(r#"{"prompt":"x"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.expect("body");
        let text = String::from_utf8(body.to_bytes().to_vec()).expect("utf8");
        assert!(text.contains("event: error"));
        assert!(text.contains("overloaded"));
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_any_stream() {
        let router = router_with(vec![]);
        let response = router
            .oneshot(generate_request(r#"{"prompt":""}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.expect("body");
        let text = String::from_utf8(body.to_bytes().to_vec()).expect("utf8");
        assert!(text.contains("prompt"));
    }

    #[tokio::test]
    async fn non_string_prompt_is_a_client_error() {
        let router = router_with(vec![]);
        let response = router
            .oneshot(generate_request(r#"{"prompt":42}"#))
            .await
            .expect("response");
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn missing_prompt_is_a_client_error() {
        let router = router_with(vec![]);
        let response = router
            .oneshot(generate_request(r#"{}"#))
            .await
            .expect("response");
        assert!(response.status().is_client_error());
    }
}
