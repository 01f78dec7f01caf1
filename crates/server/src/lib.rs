use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod catalog;
mod centers;
mod customers;
mod payments;
mod server;
mod sessions;
mod user;

pub mod types {
    pub mod center {
        pub use api_types::center::{
            CenterCreated, CenterDiscountUpdate, CenterNew, CenterView, CentersResponse,
        };
    }

    pub mod catalog {
        pub use api_types::catalog::{
            CatalogEntryCreated, CatalogGet, CatalogResponse, ServicePriceUpdate, ServiceTypeNew,
            ServiceTypeView, VehicleMultiplierUpdate, VehicleTypeNew, VehicleTypeView,
        };
    }

    pub mod booking {
        pub use api_types::booking::{BookingCreated, BookingNew, QuoteView};
    }

    pub mod session {
        pub use api_types::session::{
            DiscountUpdate, FeedbackUpdate, SessionCancel, SessionCancelled, SessionComplete,
            SessionCompleted, SessionGet, SessionList, SessionListResponse, SessionStart,
            SessionView,
        };
    }

    pub mod payment {
        pub use api_types::payment::{PaymentNew, PaymentVerify, PaymentView};
    }

    pub mod customer {
        pub use api_types::customer::{CustomerDeactivate, CustomerGet, CustomerView, LoyaltyView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidTransition(_)
        | EngineError::ValidationFailed(_)
        | EngineError::PaymentInvalid(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidId(_)
        | EngineError::CurrencyMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res =
            ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_domain_violations_map_to_422() {
        for err in [
            EngineError::InvalidTransition("x".to_string()),
            EngineError::ValidationFailed(vec!["x".to_string()]),
            EngineError::PaymentInvalid("x".to_string()),
            EngineError::InvalidAmount("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
