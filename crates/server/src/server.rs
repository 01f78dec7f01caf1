use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{catalog, centers, customers, payments, sessions, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/centers", post(centers::center_new).get(centers::list))
        .route("/centers/{id}/discount", patch(centers::update_discount))
        .route("/catalog", get(catalog::get))
        .route("/catalog/services", post(catalog::service_new))
        .route("/catalog/services/{id}/price", patch(catalog::update_price))
        .route("/catalog/vehicleTypes", post(catalog::vehicle_new))
        .route(
            "/catalog/vehicleTypes/{id}/multiplier",
            patch(catalog::update_multiplier),
        )
        .route("/bookings", post(sessions::book))
        .route("/sessions", get(sessions::list))
        .route("/sessions/get", post(sessions::get_detail))
        .route("/sessions/{id}/start", post(sessions::start))
        .route("/sessions/{id}/complete", post(sessions::complete))
        .route("/sessions/{id}/cancel", post(sessions::cancel))
        .route("/sessions/{id}/discount", patch(sessions::discount))
        .route("/sessions/{id}/feedback", post(sessions::feedback))
        .route("/sessions/{id}/payment", post(payments::payment_new))
        .route("/sessions/{id}/payment/verify", post(payments::verify))
        .route(
            "/customers",
            get(customers::get).delete(customers::deactivate),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let backend = db.get_database_backend();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec!["ama".into(), "password".into()],
        ))
        .await
        .unwrap();
        let engine = Engine::builder()
            .database(db.clone())
            .build()
            .await
            .unwrap();
        router(ServerState {
            engine: Arc::new(engine),
            db,
        })
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let credentials = STANDARD.encode("ama:password");
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Basic {credentials}"))
            .header("content-type", "application/json");
        match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn rejects_bad_credentials() {
        let router = test_router().await;

        let credentials = STANDARD.encode("ama:wrong");
        let request = Request::builder()
            .method("GET")
            .uri("/centers")
            .header("authorization", format!("Basic {credentials}"))
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let missing = Request::builder()
            .method("GET")
            .uri("/centers")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(missing).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn booking_flow_over_http() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/centers",
                Some(json!({"name": "Main", "currency": null, "loyalty_discount_percent": null})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let center_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/catalog/services",
                Some(json!({
                    "center_id": center_id,
                    "name": "basic wash",
                    "base_price_minor": 2000,
                    "currency": null
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .clone()
            .oneshot(request(
                "GET",
                "/catalog",
                Some(json!({"center_id": center_id})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let catalog = body_json(response).await;
        let service_id = catalog["services"][0]["id"].as_str().unwrap().to_string();
        let suv_id = catalog["vehicle_types"]
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["name"] == "suv")
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/bookings",
                Some(json!({
                    "center_id": center_id,
                    "service_id": service_id,
                    "vehicle_type_id": suv_id,
                    "customer_phone": "+233 20 123 4567",
                    "customer_name": "Kofi Mensah",
                    "plate": "GR 1234-20",
                    "brand": null,
                    "color": null,
                    "apply_loyalty_discount": null,
                    "scheduled_start": "2026-07-20T09:00:00+00:00"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let booking = body_json(response).await;
        let session_id = booking["id"].as_str().unwrap().to_string();
        assert_eq!(booking["quote"]["final_price_minor"], 2600);

        // Completing before starting is an invalid transition.
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/sessions/{session_id}/complete"),
                Some(json!({"center_id": center_id, "duration_minutes": 30, "rating": null, "feedback": null})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        // Mobile money without a reference is rejected by the validity
        // predicate.
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/sessions/{session_id}/payment"),
                Some(json!({
                    "center_id": center_id,
                    "amount_minor": 2600,
                    "method": "mobile_money",
                    "transaction_ref": null
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/sessions/{session_id}/payment"),
                Some(json!({
                    "center_id": center_id,
                    "amount_minor": 2600,
                    "method": "cash",
                    "transaction_ref": null
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let paid = body_json(response).await;
        assert_eq!(paid["status"], "paid_pending");

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/sessions/{session_id}/start"),
                Some(json!({"center_id": center_id})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/sessions/{session_id}/complete"),
                Some(json!({"center_id": center_id, "duration_minutes": 45, "rating": 5, "feedback": null})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let completed = body_json(response).await;
        assert_eq!(completed["session"]["status"], "completed");
        assert_eq!(completed["total_completed_bookings"], 1);

        let response = router
            .clone()
            .oneshot(request(
                "GET",
                "/customers",
                Some(json!({"phone": "+233201234567"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let customer = body_json(response).await;
        assert_eq!(customer["loyalty"]["tier"], 0);
        assert_eq!(customer["total_completed_bookings"], 1);
        assert_eq!(customer["vehicle_plates"][0], "GR1234-20");
    }

    #[tokio::test]
    async fn cancelled_session_reports_cancelled_status() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/centers",
                Some(json!({"name": "Main", "currency": null, "loyalty_discount_percent": null})),
            ))
            .await
            .unwrap();
        let center_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/catalog/services",
                Some(json!({
                    "center_id": center_id,
                    "name": "basic wash",
                    "base_price_minor": 2000,
                    "currency": null
                })),
            ))
            .await
            .unwrap();
        let service_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(request(
                "GET",
                "/catalog",
                Some(json!({"center_id": center_id})),
            ))
            .await
            .unwrap();
        let catalog = body_json(response).await;
        let sedan_id = catalog["vehicle_types"]
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["name"] == "sedan")
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/bookings",
                Some(json!({
                    "center_id": center_id,
                    "service_id": service_id,
                    "vehicle_type_id": sedan_id,
                    "customer_phone": "0200000009",
                    "customer_name": null,
                    "plate": "AS 555-21",
                    "brand": null,
                    "color": null,
                    "apply_loyalty_discount": null,
                    "scheduled_start": "2030-01-01T09:00:00+00:00"
                })),
            ))
            .await
            .unwrap();
        let session_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/sessions/{session_id}/cancel"),
                Some(json!({"center_id": center_id, "reason": "rain"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cancelled = body_json(response).await;
        assert_eq!(cancelled["session"]["status"], "cancelled");
        // Cancelled ahead of the scheduled start: negative lost minutes.
        assert!(cancelled["lost_minutes"].as_i64().unwrap() < 0);

        // A second cancel is rejected.
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/sessions/{session_id}/cancel"),
                Some(json!({"center_id": center_id, "reason": "again"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
