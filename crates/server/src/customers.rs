//! Customer and loyalty API endpoints.

use api_types::customer::{CustomerDeactivate, CustomerGet, CustomerView, LoyaltyView};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, sessions::utc_offset, user};

pub async fn get(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CustomerGet>,
) -> Result<Json<CustomerView>, ServerError> {
    let customer = state.engine.customer(&payload.phone).await?;
    let utc = utc_offset()?;
    Ok(Json(CustomerView {
        phone: customer.phone.clone(),
        name: customer.name.clone(),
        email: customer.email.clone(),
        total_completed_bookings: customer.total_completed_bookings,
        total_amount_spent_minor: customer.total_amount_spent.cents(),
        is_active: customer.is_active,
        vehicle_plates: customer.vehicle_plates.clone(),
        last_visit: customer.last_visit.map(|t| t.with_timezone(&utc)),
        loyalty: LoyaltyView {
            tier: customer.loyalty_tier(),
            is_vip: customer.is_vip(),
            is_discount_eligible: customer.is_discount_eligible(),
            average_spend_minor: customer.average_spending_per_visit().cents(),
        },
    }))
}

pub async fn deactivate(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CustomerDeactivate>,
) -> Result<StatusCode, ServerError> {
    state.engine.deactivate_customer(&payload.phone).await?;
    Ok(StatusCode::ACCEPTED)
}
