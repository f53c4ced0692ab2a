//! Sentiment API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Routes:
//! - `GET /` — service info
//! - `GET /health` — readiness
//! - `POST /predict` — single prediction
//! - `POST /predict/batch` — batch prediction
//! - `GET /docs` — API description (when enabled)
//!
//! Layers (outermost → innermost): CORS → request log → handler.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::api::cors::cors_layer;
use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::ServiceConfig;
use crate::inference::SentimentService;

/// Build the sentiment API router.
pub fn sentiment_api_router(service: SentimentService, config: Arc<ServiceConfig>) -> Router {
    build_router(ApiContext::new(service, config))
}

fn build_router(ctx: ApiContext) -> Router {
    let mut routes = Router::new()
        .route("/", get(endpoints::info::root))
        .route("/health", get(endpoints::health::check))
        .route("/predict", post(endpoints::predict::single))
        .route("/predict/batch", post(endpoints::predict::batch));

    if ctx.config.expose_docs {
        routes = routes.route("/docs", get(endpoints::docs::describe));
    }

    let router = routes
        .fallback(endpoints::not_found)
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::request_log::log_request));

    match cors_layer(&ctx.config.allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::inference::BatchMode;
    use crate::predictor::{LinearPipeline, MockPredictor, PredictorAdapter, SentimentLabel};

    fn mock_service(mock: Arc<MockPredictor>) -> SentimentService {
        SentimentService::new(Arc::new(PredictorAdapter::ready(mock)))
    }

    fn test_router(mock: Arc<MockPredictor>) -> Router {
        sentiment_api_router(mock_service(mock), Arc::new(ServiceConfig::default()))
    }

    fn router_with_config(mock: Arc<MockPredictor>, config: ServiceConfig) -> Router {
        sentiment_api_router(mock_service(mock), Arc::new(config))
    }

    fn unavailable_router() -> Router {
        let service =
            SentimentService::new(Arc::new(PredictorAdapter::unavailable("artifact missing")));
        sentiment_api_router(service, Arc::new(ServiceConfig::default()))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_record_invariants(record: &serde_json::Value) {
        let probs = record["probabilities"].as_object().unwrap();
        assert_eq!(probs.len(), 3);
        let sum: f64 = probs.values().map(|v| v.as_f64().unwrap()).sum();
        assert!((sum - 1.0).abs() < 1e-6);

        let (best_key, best) = probs
            .iter()
            .map(|(k, v)| (k.clone(), v.as_f64().unwrap()))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert_eq!(record["confidence"].as_f64().unwrap(), best);
        assert_eq!(record["sentiment"].as_i64().unwrap().to_string(), best_key);
    }

    // ── health / info ───────────────────────────────────────

    #[tokio::test]
    async fn health_reports_loaded_model() {
        let app = test_router(Arc::new(MockPredictor::new()));
        let response = app.oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model_loaded"], true);
        assert!(json["timestamp"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn health_reports_unavailable_model() {
        let response = unavailable_router().oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["model_loaded"], false);
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let app = test_router(Arc::new(MockPredictor::new()));
        let json = json_body(app.oneshot(get_req("/")).await.unwrap()).await;
        assert_eq!(json["model_loaded"], true);
        let endpoints = json["endpoints"].as_array().unwrap();
        assert!(endpoints.iter().any(|e| e == "/predict/batch"));
        assert!(endpoints.iter().any(|e| e == "/docs"));
    }

    #[tokio::test]
    async fn docs_hidden_when_disabled() {
        let config = ServiceConfig {
            expose_docs: false,
            ..ServiceConfig::default()
        };
        let app = router_with_config(Arc::new(MockPredictor::new()), config);
        let response = app.oneshot(get_req("/docs")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn docs_served_when_enabled() {
        let app = test_router(Arc::new(MockPredictor::new()));
        let response = app.oneshot(get_req("/docs")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["operations"].as_array().unwrap().len(), 3);
        assert_eq!(json["errors"]["MODEL_UNAVAILABLE"], 503);
    }

    // ── single prediction ───────────────────────────────────

    #[tokio::test]
    async fn predict_returns_record() {
        let app = test_router(Arc::new(MockPredictor::new()));
        let response = app
            .oneshot(post_json("/predict", serde_json::json!({ "text": "I love this video!" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["sentiment"], 1);
        assert_eq!(json["text"], "I love this video!");
        assert!(json["confidence"].as_f64().unwrap() >= 1.0 / 3.0);
        assert_record_invariants(&json);
    }

    #[tokio::test]
    async fn predict_with_linear_model_end_to_end() {
        let raw = crate::predictor::linear::tests::permuted_artifact().to_string();
        let pipeline = LinearPipeline::from_json_str(&raw).unwrap();
        let service = SentimentService::new(Arc::new(PredictorAdapter::ready(Arc::new(pipeline))));
        let app = sentiment_api_router(service, Arc::new(ServiceConfig::default()));

        let response = app
            .oneshot(post_json("/predict", serde_json::json!({ "text": "I love this video!" })))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["sentiment"], 1);
        assert_record_invariants(&json);
    }

    #[tokio::test]
    async fn predict_whitespace_is_empty_input() {
        let mock = Arc::new(MockPredictor::new());
        let app = test_router(mock.clone());
        let response = app
            .oneshot(post_json("/predict", serde_json::json!({ "text": "   " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "EMPTY_INPUT");
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn predict_empty_string_fails_validation() {
        let mock = Arc::new(MockPredictor::new());
        let app = test_router(mock.clone());
        let response = app
            .oneshot(post_json("/predict", serde_json::json!({ "text": "" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn predict_oversized_text_never_reaches_model() {
        let mock = Arc::new(MockPredictor::new());
        let app = test_router(mock.clone());
        let response = app
            .oneshot(post_json("/predict", serde_json::json!({ "text": "a".repeat(5001) })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn predict_missing_field_is_validation_error() {
        let app = test_router(Arc::new(MockPredictor::new()));
        let response = app
            .oneshot(post_json("/predict", serde_json::json!({ "comment": "hi" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn predict_malformed_json_is_bad_request() {
        let app = test_router(Arc::new(MockPredictor::new()));
        let req = Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"text\": "))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn predict_model_unavailable_is_503() {
        let response = unavailable_router()
            .oneshot(post_json("/predict", serde_json::json!({ "text": "hello" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "MODEL_UNAVAILABLE");
    }

    #[tokio::test]
    async fn predict_inference_failure_is_500() {
        let app = test_router(Arc::new(MockPredictor::new().failing_on("kaboom")));
        let response = app
            .oneshot(post_json("/predict", serde_json::json!({ "text": "kaboom" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "INFERENCE_FAILED");
    }

    #[tokio::test]
    async fn predict_permuted_classes_map_by_label() {
        let mock = Arc::new(MockPredictor::with_classes(vec![
            SentimentLabel::Neutral,
            SentimentLabel::Positive,
            SentimentLabel::Negative,
        ]));
        let app = test_router(mock);
        let response = app
            .oneshot(post_json("/predict", serde_json::json!({ "text": "best tutorial ever" })))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["sentiment"], 1);
        assert_eq!(json["probabilities"]["1"], 0.7);
        assert_eq!(json["probabilities"]["-1"], 0.1);
        assert_eq!(json["probabilities"]["0"], 0.2);
        assert_record_invariants(&json);
    }

    // ── batch prediction ────────────────────────────────────

    #[tokio::test]
    async fn batch_preserves_order() {
        let app = test_router(Arc::new(MockPredictor::new()));
        let texts = ["I love this video!", "This is boring", "Not bad, could be better"];
        let response = app
            .oneshot(post_json("/predict/batch", serde_json::json!({ "texts": texts })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let predictions = json["predictions"].as_array().unwrap();
        assert_eq!(predictions.len(), 3);
        for (prediction, text) in predictions.iter().zip(texts) {
            assert_eq!(prediction["text"], text);
            assert_record_invariants(prediction);
        }
        assert_eq!(predictions[0]["sentiment"], 1);
        assert_eq!(predictions[1]["sentiment"], -1);
        assert!(json["processing_time_ms"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn batch_with_blank_item_fails_whole_batch() {
        let app = test_router(Arc::new(MockPredictor::new()));
        let response = app
            .oneshot(post_json(
                "/predict/batch",
                serde_json::json!({ "texts": ["great", "  ", "awful"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "EMPTY_INPUT");
        assert!(json["error"]["message"].as_str().unwrap().contains("texts[1]"));
        assert!(json.get("predictions").is_none());
    }

    #[tokio::test]
    async fn batch_size_bounds_checked_before_inference() {
        for size in [0usize, 101] {
            let mock = Arc::new(MockPredictor::new());
            let app = test_router(mock.clone());
            let texts = vec!["fine"; size];
            let response = app
                .oneshot(post_json("/predict/batch", serde_json::json!({ "texts": texts })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "size {size}");
            let json = json_body(response).await;
            assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
            assert_eq!(mock.calls(), 0, "size {size}");
        }
    }

    #[tokio::test]
    async fn batch_oversized_item_rejected_before_inference() {
        let mock = Arc::new(MockPredictor::new());
        let app = test_router(mock.clone());
        let response = app
            .oneshot(post_json(
                "/predict/batch",
                serde_json::json!({ "texts": ["fine", "b".repeat(5001)] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn batch_model_unavailable_is_503() {
        let response = unavailable_router()
            .oneshot(post_json("/predict/batch", serde_json::json!({ "texts": ["a", "b"] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn collect_mode_returns_per_item_results() {
        let config = ServiceConfig {
            batch_mode: BatchMode::Collect,
            ..ServiceConfig::default()
        };
        let app = router_with_config(Arc::new(MockPredictor::new().failing_on("bad")), config);
        let response = app
            .oneshot(post_json(
                "/predict/batch",
                serde_json::json!({ "texts": ["great", " ", "bad input"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["ok"]["sentiment"], 1);
        assert_eq!(results[1]["error"]["code"], "EMPTY_INPUT");
        assert_eq!(results[2]["error"]["code"], "INFERENCE_FAILED");
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["failed"], 2);
    }

    // ── boundary concerns ───────────────────────────────────

    #[tokio::test]
    async fn unknown_route_is_structured_404() {
        let app = test_router(Arc::new(MockPredictor::new()));
        let response = app.oneshot(get_req("/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn cors_allows_configured_wildcard_origin() {
        let config = ServiceConfig::for_profile(crate::config::DeploymentProfile::Hosted);
        let app = router_with_config(Arc::new(MockPredictor::new()), config);
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/predict")
            .header(header::ORIGIN, "https://demo.hf.space")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://demo.hf.space"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn cors_rejects_unlisted_origin() {
        let config = ServiceConfig::for_profile(crate::config::DeploymentProfile::Hosted);
        let app = router_with_config(Arc::new(MockPredictor::new()), config);
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = test_router(Arc::new(MockPredictor::new()));
        let response = app.oneshot(get_req("/health")).await.unwrap();
        assert!(response
            .headers()
            .contains_key(middleware::request_log::REQUEST_ID_HEADER));
    }
}
