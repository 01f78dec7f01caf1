//! Center management API endpoints.

use api_types::center::{
    CenterCreated, CenterDiscountUpdate, CenterNew, CenterView, CentersResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, user};

fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Ghs => api_types::Currency::Ghs,
    }
}

fn parse_currency(currency: Option<api_types::Currency>) -> Option<engine::Currency> {
    currency.map(|c| match c {
        api_types::Currency::Ghs => engine::Currency::Ghs,
    })
}

pub async fn center_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CenterNew>,
) -> Result<(StatusCode, Json<CenterCreated>), ServerError> {
    let id = state
        .engine
        .new_center(
            &payload.name,
            &user.username,
            parse_currency(payload.currency),
            payload.loyalty_discount_percent,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CenterCreated { id })))
}

pub async fn update_discount(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CenterDiscountUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_center_discount_percent(&id, &user.username, payload.loyalty_discount_percent)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CentersResponse>, ServerError> {
    let centers = state.engine.centers(&user.username).await?;
    Ok(Json(CentersResponse {
        centers: centers
            .into_iter()
            .map(|center| CenterView {
                id: center.id,
                name: center.name,
                currency: map_currency(center.currency),
                loyalty_discount_percent: center.loyalty_discount_percent,
            })
            .collect(),
    }))
}
