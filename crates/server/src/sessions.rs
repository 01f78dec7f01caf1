//! Session lifecycle API endpoints.

use api_types::booking::{BookingCreated, BookingNew, QuoteView};
use api_types::session::{
    DiscountUpdate, FeedbackUpdate, SessionCancel, SessionCancelled, SessionComplete,
    SessionCompleted, SessionGet, SessionList, SessionListResponse, SessionStart, SessionView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{BookSession, CompleteSession, PriceCalculationResult, SessionListFilter, WashSession};

pub(crate) fn utc_offset() -> Result<FixedOffset, ServerError> {
    FixedOffset::east_opt(0).ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))
}

fn map_status(status: engine::SessionStatus) -> api_types::SessionStatus {
    match status {
        engine::SessionStatus::Cancelled => api_types::SessionStatus::Cancelled,
        engine::SessionStatus::Completed => api_types::SessionStatus::Completed,
        engine::SessionStatus::InProgress => api_types::SessionStatus::InProgress,
        engine::SessionStatus::PaidPending => api_types::SessionStatus::PaidPending,
        engine::SessionStatus::Unpaid => api_types::SessionStatus::Unpaid,
    }
}

pub(crate) fn map_session(session: &WashSession) -> Result<SessionView, ServerError> {
    let utc = utc_offset()?;
    Ok(SessionView {
        id: session.id,
        status: map_status(session.status()),
        customer_phone: session.customer_phone.clone(),
        plate: session.plate.clone(),
        price_minor: session.price.cents(),
        loyalty_discount_minor: session.loyalty_discount.cents(),
        amount_paid_minor: session.amount_paid.cents(),
        is_paid: session.is_paid,
        scheduled_start: session.scheduled_start.with_timezone(&utc),
        actual_start: session.actual_start.map(|t| t.with_timezone(&utc)),
        actual_end: session.actual_end.map(|t| t.with_timezone(&utc)),
        duration_minutes: session.duration_minutes,
        rating: session.rating,
        cancellation_reason: session.cancellation_reason.clone(),
    })
}

fn map_quote(result: &PriceCalculationResult) -> QuoteView {
    QuoteView {
        base_price_minor: result.base_price.cents(),
        vehicle_multiplier: result.vehicle_multiplier,
        sub_total_minor: result.sub_total.cents(),
        loyalty_discount_minor: result.loyalty_discount.cents(),
        final_price_minor: result.final_price.cents(),
        loyalty_discount_applied: result.loyalty_discount_applied,
        customer_wash_count: result.customer_wash_count,
    }
}

pub async fn book(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BookingNew>,
) -> Result<(StatusCode, Json<BookingCreated>), ServerError> {
    let mut cmd = BookSession::new(
        payload.center_id,
        payload.service_id,
        payload.vehicle_type_id,
        payload.customer_phone,
        payload.plate,
        payload.scheduled_start.with_timezone(&Utc),
        Utc::now(),
    );
    cmd.customer_name = payload.customer_name;
    cmd.brand = payload.brand;
    cmd.color = payload.color;
    cmd.apply_loyalty_discount = payload.apply_loyalty_discount.unwrap_or(false);

    let (id, result) = state.engine.book_session(&user.username, cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookingCreated {
            id,
            quote: map_quote(&result),
        }),
    ))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SessionList>,
) -> Result<Json<SessionListResponse>, ServerError> {
    let limit = payload.limit.unwrap_or(50);
    let filter = SessionListFilter {
        from: payload.from.map(|dt| dt.with_timezone(&Utc)),
        to: payload.to.map(|dt| dt.with_timezone(&Utc)),
        include_cancelled: payload.include_cancelled.unwrap_or(false),
    };

    let (sessions, next_cursor) = state
        .engine
        .list_sessions(
            &payload.center_id,
            &user.username,
            limit,
            payload.cursor.as_deref(),
            &filter,
        )
        .await?;

    let mut views = Vec::with_capacity(sessions.len());
    for session in &sessions {
        views.push(map_session(session)?);
    }

    Ok(Json(SessionListResponse {
        sessions: views,
        next_cursor,
    }))
}

pub async fn get_detail(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SessionGet>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state
        .engine
        .session(&payload.center_id, payload.id, &user.username)
        .await?;
    Ok(Json(map_session(&session)?))
}

pub async fn start(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SessionStart>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state
        .engine
        .start_session(&payload.center_id, id, &user.username, Utc::now())
        .await?;
    Ok(Json(map_session(&session)?))
}

pub async fn complete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SessionComplete>,
) -> Result<Json<SessionCompleted>, ServerError> {
    let mut cmd = CompleteSession::new(Utc::now());
    cmd.duration_minutes = payload.duration_minutes;
    cmd.rating = payload.rating;
    cmd.feedback = payload.feedback;

    let (session, customer) = state
        .engine
        .complete_session(&payload.center_id, id, &user.username, cmd)
        .await?;
    Ok(Json(SessionCompleted {
        session: map_session(&session)?,
        loyalty_tier: customer.loyalty_tier(),
        total_completed_bookings: customer.total_completed_bookings,
    }))
}

pub async fn cancel(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SessionCancel>,
) -> Result<Json<SessionCancelled>, ServerError> {
    let (session, lost_minutes) = state
        .engine
        .cancel_session(
            &payload.center_id,
            id,
            &user.username,
            &payload.reason,
            Utc::now(),
        )
        .await?;
    Ok(Json(SessionCancelled {
        session: map_session(&session)?,
        lost_minutes,
    }))
}

pub async fn discount(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DiscountUpdate>,
) -> Result<Json<QuoteView>, ServerError> {
    let (_, result) = state
        .engine
        .set_loyalty_discount(
            &payload.center_id,
            id,
            &user.username,
            payload.apply,
            Utc::now(),
        )
        .await?;
    Ok(Json(map_quote(&result)))
}

pub async fn feedback(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FeedbackUpdate>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state
        .engine
        .update_feedback(
            &payload.center_id,
            id,
            &user.username,
            payload.rating,
            payload.feedback,
            Utc::now(),
        )
        .await?;
    Ok(Json(map_session(&session)?))
}
