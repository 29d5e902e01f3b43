use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Install the global `tracing` subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn app(state: AppState, enable_cors: bool) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .merge(sip_routes(state.clone()))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn sip_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/sips", post(protected::sip_create))
        .route("/sips/", post(protected::sip_create))
        .route("/sips/summary", get(protected::sip_summary))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// Open the store, bind and serve until ctrl-c.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await?;
    let app = app(state, config.security.enable_cors);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("SIP Tracker API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, Months, NaiveDate, Utc};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::{issue_token, IdentityVerifier};
    use crate::database::models::SipPlan;
    use crate::database::MemorySipStore;

    const SECRET: &str = "router-test-secret";
    const ALICE: &str = "00000000-0000-0000-0000-000000000001";
    const BOB: &str = "00000000-0000-0000-0000-000000000002";

    fn setup() -> (Router, MemorySipStore) {
        let store = MemorySipStore::new();
        let state = AppState::new(
            IdentityVerifier::new(SECRET, None).unwrap(),
            Arc::new(store.clone()),
        );
        (app(state, false), store)
    }

    fn bearer(user: &str) -> String {
        format!("Bearer {}", issue_token(user, SECRET, Duration::hours(1)).unwrap())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_sip(auth: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::post("/sips/").header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_summary(auth: Option<&str>, query: &str) -> Request<Body> {
        let mut builder = Request::get(format!("/sips/summary{}", query));
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn seeded(user: &str, scheme: &str, amount: i64, start: NaiveDate) -> SipPlan {
        let now = Utc::now();
        SipPlan {
            id: Uuid::new_v4(),
            user_id: user.to_string(),
            scheme_name: scheme.to_string(),
            monthly_amount: Decimal::from(amount),
            start_date: start,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_returns_created_record() {
        let (app, store) = setup();
        let auth = bearer(ALICE);

        let (status, body) = send(
            &app,
            post_sip(
                Some(&auth),
                json!({
                    "scheme_name": "Axis Bluechip Fund",
                    "monthly_amount": 7500.00,
                    "start_date": "2023-03-15"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["scheme_name"], "Axis Bluechip Fund");
        assert_eq!(body["monthly_amount"].as_f64(), Some(7500.0));
        assert_eq!(body["user_id"], ALICE);
        assert_eq!(body["start_date"], "2023-03-15");
        assert!(body["id"].is_string());
        assert!(body["created_at"].is_string());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn create_without_slash_is_routed() {
        let (app, _) = setup();
        let request = Request::post("/sips")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, bearer(ALICE))
            .body(Body::from(
                json!({"scheme_name": "A", "monthly_amount": 1, "start_date": "2024-01-01"}).to_string(),
            ))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn missing_or_bad_token_is_unauthorized() {
        let (app, store) = setup();
        let body = json!({"scheme_name": "A", "monthly_amount": 1000, "start_date": "2024-05-01"});

        let (status, err) = send(&app, post_sip(None, body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(err["code"], "UNAUTHORIZED");

        let (status, _) = send(&app, get_summary(None, "")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let forged = format!(
            "Bearer {}",
            issue_token(ALICE, "wrong-secret", Duration::hours(1)).unwrap()
        );
        let (status, _) = send(&app, post_sip(Some(&forged), body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let expired = format!(
            "Bearer {}",
            issue_token(ALICE, SECRET, Duration::seconds(-1)).unwrap()
        );
        let (status, err) = send(&app, get_summary(Some(&expired), "")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(err["message"], "Token has expired");

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn invalid_plan_is_a_validation_error() {
        let (app, store) = setup();
        let auth = bearer(ALICE);

        let (status, body) = send(
            &app,
            post_sip(
                Some(&auth),
                json!({"scheme_name": "A", "monthly_amount": 0, "start_date": "2024-01-01"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["field_errors"]["monthly_amount"].is_string());

        let (status, body) = send(
            &app,
            post_sip(Some(&auth), json!({"scheme_name": "A", "start_date": "2024-01-01"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let (app, _) = setup();
        let request = Request::post("/sips/")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, bearer(ALICE))
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn summary_is_empty_without_records() {
        let (app, _) = setup();
        let (status, body) = send(&app, get_summary(Some(&bearer(ALICE)), "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn summary_groups_only_callers_records() {
        let (app, store) = setup();
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();

        store.insert(seeded(ALICE, "A", 5000, as_of - Months::new(6))).await;
        store.insert(seeded(BOB, "A", 9999, as_of - Months::new(12))).await;
        store.insert(seeded(ALICE, "A", 1000, as_of - Months::new(3))).await;
        store.insert(seeded(ALICE, "B", 2000, as_of - Months::new(1))).await;

        let (status, body) =
            send(&app, get_summary(Some(&bearer(ALICE)), "?as_of=2025-06-10")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"scheme_name": "A", "total_invested": 33000.0, "months_invested": 6},
                {"scheme_name": "B", "total_invested": 2000.0, "months_invested": 1}
            ])
        );

        let (_, body) = send(&app, get_summary(Some(&bearer(BOB)), "?as_of=2025-06-10")).await;
        assert_eq!(
            body,
            json!([{"scheme_name": "A", "total_invested": 119988.0, "months_invested": 12}])
        );
    }

    #[tokio::test]
    async fn bad_as_of_is_bad_request() {
        let (app, _) = setup();
        let (status, body) =
            send(&app, get_summary(Some(&bearer(ALICE)), "?as_of=June")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn public_routes_need_no_token() {
        let (app, _) = setup();

        let (status, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["version"].is_string());

        let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&app, Request::get("/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
