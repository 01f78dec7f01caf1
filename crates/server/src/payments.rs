//! Payment API endpoints.

use api_types::payment::{PaymentNew, PaymentVerify, PaymentView};
use api_types::session::SessionView;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, sessions::map_session, sessions::utc_offset, user};
use engine::{MoneyCents, RecordPayment};

fn parse_method(method: api_types::PaymentMethod) -> engine::PaymentMethod {
    match method {
        api_types::PaymentMethod::Cash => engine::PaymentMethod::Cash,
        api_types::PaymentMethod::MobileMoney => engine::PaymentMethod::MobileMoney,
        api_types::PaymentMethod::Card => engine::PaymentMethod::Card,
        api_types::PaymentMethod::BankTransfer => engine::PaymentMethod::BankTransfer,
    }
}

fn map_method(method: engine::PaymentMethod) -> api_types::PaymentMethod {
    match method {
        engine::PaymentMethod::Cash => api_types::PaymentMethod::Cash,
        engine::PaymentMethod::MobileMoney => api_types::PaymentMethod::MobileMoney,
        engine::PaymentMethod::Card => api_types::PaymentMethod::Card,
        engine::PaymentMethod::BankTransfer => api_types::PaymentMethod::BankTransfer,
    }
}

fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Ghs => api_types::Currency::Ghs,
    }
}

pub async fn payment_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentNew>,
) -> Result<Json<SessionView>, ServerError> {
    let mut cmd = RecordPayment::new(
        MoneyCents::new(payload.amount_minor),
        parse_method(payload.method),
        user.username.clone(),
        Utc::now(),
    );
    cmd.transaction_ref = payload.transaction_ref;

    let session = state
        .engine
        .record_payment(&payload.center_id, id, &user.username, cmd)
        .await?;
    Ok(Json(map_session(&session)?))
}

pub async fn verify(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentVerify>,
) -> Result<Json<PaymentView>, ServerError> {
    let payment = state
        .engine
        .verify_payment(&payload.center_id, id, &user.username)
        .await?;
    let utc = utc_offset()?;
    Ok(Json(PaymentView {
        session_id: payment.session_id,
        amount_minor: payment.amount.cents(),
        method: map_method(payment.method),
        transaction_ref: payment.transaction_ref,
        paid_at: payment.paid_at.with_timezone(&utc),
        received_by: payment.received_by,
        is_verified: payment.is_verified,
        currency: map_currency(payment.currency),
    }))
}
