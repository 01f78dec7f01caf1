//! Catalog administration API endpoints.

use api_types::catalog::{
    CatalogEntryCreated, CatalogGet, CatalogResponse, ServicePriceUpdate, ServiceTypeNew,
    ServiceTypeView, VehicleMultiplierUpdate, VehicleTypeNew, VehicleTypeView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::MoneyCents;

fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Ghs => api_types::Currency::Ghs,
    }
}

pub async fn service_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ServiceTypeNew>,
) -> Result<(StatusCode, Json<CatalogEntryCreated>), ServerError> {
    let currency = payload.currency.map(|c| match c {
        api_types::Currency::Ghs => engine::Currency::Ghs,
    });
    let id = state
        .engine
        .new_service_type(
            &payload.center_id,
            &user.username,
            &payload.name,
            MoneyCents::new(payload.base_price_minor),
            currency,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CatalogEntryCreated { id })))
}

pub async fn vehicle_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<VehicleTypeNew>,
) -> Result<(StatusCode, Json<CatalogEntryCreated>), ServerError> {
    let id = state
        .engine
        .new_vehicle_type(
            &payload.center_id,
            &user.username,
            &payload.name,
            payload.multiplier,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CatalogEntryCreated { id })))
}

pub async fn update_price(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ServicePriceUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_service_price(
            &payload.center_id,
            &user.username,
            id,
            MoneyCents::new(payload.base_price_minor),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_multiplier(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VehicleMultiplierUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_vehicle_multiplier(&payload.center_id, &user.username, id, payload.multiplier)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CatalogGet>,
) -> Result<Json<CatalogResponse>, ServerError> {
    let snapshot = state
        .engine
        .catalog(&payload.center_id, &user.username)
        .await?;
    Ok(Json(CatalogResponse {
        services: snapshot
            .services
            .into_iter()
            .map(|service| ServiceTypeView {
                id: service.id,
                name: service.name,
                base_price_minor: service.base_price.cents(),
                currency: map_currency(service.currency),
            })
            .collect(),
        vehicle_types: snapshot
            .vehicle_types
            .into_iter()
            .map(|vehicle| VehicleTypeView {
                id: vehicle.id,
                name: vehicle.name,
                multiplier: vehicle.multiplier,
            })
            .collect(),
    }))
}
