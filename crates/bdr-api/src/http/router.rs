//! Axum router configuration with middleware.
//!
//! Routes:
//! - `GET /`, `GET /health` -- liveness
//! - `POST /webhook/hubspot` -- CRM event deliveries
//! - `POST /webhook/slack` -- Slack Events API
//!
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route("/webhook/hubspot", post(handlers::webhook::hubspot_webhook))
        .route("/webhook/slack", post(handlers::webhook::slack_webhook))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use bdr_core::dispatch::{BoxFailureSink, Dispatcher, LogFailureSink, OutcomeTally, log_outcomes};
    use bdr_core::routing::Router as RuleRouter;
    use bdr_infra::workflow::dry_run_registry;
    use bdr_types::config::AppConfig;
    use bdr_types::outcome::DispatchStatus;

    use super::*;
    use crate::http::handlers::webhook::HubSpotAck;

    fn test_state() -> AppState {
        let config = AppConfig::default();
        let rules = Arc::new(config.rules.clone());
        let registry = Arc::new(dry_run_registry(rules.workflows()));
        let dispatcher = Dispatcher::new(
            RuleRouter::new(rules),
            registry,
            BoxFailureSink::new(LogFailureSink),
        )
        .unwrap();
        AppState::from_parts(config, dispatcher)
    }

    async fn post_json(state: AppState, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();

        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_service() {
        for uri in ["/", "/health"] {
            let response = build_router(test_state())
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["status"], "healthy");
            assert_eq!(json["service"], "BDR Assistant");
        }
    }

    #[tokio::test]
    async fn hubspot_delivery_is_classified_and_acknowledged() {
        let state = test_state();
        let mut outcomes = state.dispatcher.outcomes().subscribe();

        let delivery = json!([
            {"subscriptionType": "contact.creation", "objectId": 101, "occurredAt": 1_700_000_000_000_i64},
            {"subscriptionType": "deal.propertyChange", "objectId": 202,
             "propertyName": "dealstage", "propertyValue": "closedwon"},
            {"subscriptionType": "company.creation", "objectId": 303},
            {"subscriptionType": "contact.propertyChange", "objectId": 404}
        ]);

        let (status, json) =
            post_json(state.clone(), "/webhook/hubspot", delivery.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        let ack: HubSpotAck = serde_json::from_value(json).unwrap();
        assert_eq!(ack.status, "received");
        assert_eq!(ack.scheduled, 2);
        assert_eq!(ack.skipped, 1);
        assert_eq!(ack.rejected, 1);

        let mut succeeded = 0;
        while succeeded < 2 {
            let outcome = tokio::time::timeout(Duration::from_secs(5), outcomes.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(outcome.delivery_id, ack.delivery_id);
            if outcome.status == DispatchStatus::Succeeded {
                succeeded += 1;
            }
        }
    }

    #[tokio::test]
    async fn outcome_log_records_the_whole_delivery() {
        let state = test_state();
        let log = tokio::spawn(log_outcomes(state.dispatcher.outcomes().subscribe()));

        let delivery = json!([
            {"subscriptionType": "contact.creation", "objectId": 1},
            {"subscriptionType": "company.creation", "objectId": 2}
        ]);
        let (status, _) = post_json(state.clone(), "/webhook/hubspot", delivery.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        assert!(state.dispatcher.shutdown(Duration::from_secs(5)).await);
        drop(state);

        let tally = tokio::time::timeout(Duration::from_secs(5), log)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            tally,
            OutcomeTally {
                scheduled: 1,
                skipped: 1,
                succeeded: 1,
                failed: 0,
                lagged: 0,
            }
        );
    }

    #[tokio::test]
    async fn path_like_object_id_is_rejected_before_dispatch() {
        let delivery = json!([
            {"subscriptionType": "contact.creation", "objectId": "1/../../owners/v2?x="},
            {"subscriptionType": "contact.creation", "objectId": "12"}
        ]);
        let (status, json) = post_json(test_state(), "/webhook/hubspot", delivery.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rejected"], 1);
        assert_eq!(json["scheduled"], 1);
    }

    #[tokio::test]
    async fn single_object_delivery_is_accepted() {
        let delivery = json!({"subscriptionType": "contact.creation", "objectId": "55"});
        let (status, json) = post_json(test_state(), "/webhook/hubspot", delivery.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["scheduled"], 1);
    }

    #[tokio::test]
    async fn non_json_delivery_is_rejected() {
        let (status, json) = post_json(test_state(), "/webhook/hubspot", "not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn slack_url_verification_echoes_challenge() {
        let body = json!({"type": "url_verification", "challenge": "abc123", "token": "t"});
        let (status, json) = post_json(test_state(), "/webhook/slack", body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"challenge": "abc123"}));
    }

    #[tokio::test]
    async fn slack_event_is_acknowledged() {
        let body = json!({"type": "event_callback", "event": {"type": "app_mention"}});
        let (status, json) = post_json(test_state(), "/webhook/slack", body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "received");
    }
}
