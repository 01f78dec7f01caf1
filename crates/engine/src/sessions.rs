//! Wash-session primitives.
//!
//! A [`WashSession`] is one booking instance. Its lifecycle is a small state
//! machine: Scheduled → InProgress → Completed | Cancelled (cancellation is
//! also reachable straight from Scheduled). Payment status is orthogonal to
//! the wash status; both feed the derived display [`SessionStatus`].
//!
//! Every transition checks its preconditions before touching any field, so a
//! rejected transition leaves the session untouched.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, MoneyCents, ResultEngine, payments::PaymentMethod,
    pricing::PriceCalculationResult,
};

/// Derived display status.
///
/// The priority order is a hard contract: cancelled > completed >
/// in-progress > paid-pending > unpaid. Cancellation always dominates,
/// regardless of the other flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Cancelled,
    Completed,
    InProgress,
    PaidPending,
    Unpaid,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::InProgress => "in_progress",
            Self::PaidPending => "paid_pending",
            Self::Unpaid => "unpaid",
        }
    }
}

/// A single violated pre-submit invariant, collected by
/// [`WashSession::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingCenter,
    MissingService,
    MissingVehicleType,
    MissingPlate,
    MissingCustomerPhone,
    NonPositivePrice,
    NegativeAmountPaid,
}

impl ValidationIssue {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingCenter => "center is required",
            Self::MissingService => "service is required",
            Self::MissingVehicleType => "vehicle type is required",
            Self::MissingPlate => "vehicle plate is required",
            Self::MissingCustomerPhone => "customer phone is required",
            Self::NonPositivePrice => "price must be > 0",
            Self::NegativeAmountPaid => "amount paid must be >= 0",
        }
    }
}

impl core::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WashSession {
    pub id: Uuid,
    pub center_id: String,
    pub service_id: Uuid,
    pub vehicle_type_id: Uuid,
    pub customer_phone: String,
    pub customer_name: Option<String>,
    pub plate: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    /// Catalog base price captured at booking time.
    pub base_price: MoneyCents,
    /// Vehicle multiplier captured at booking time.
    pub vehicle_multiplier: f64,
    /// Computed price (final, after any loyalty discount).
    pub price: MoneyCents,
    pub loyalty_discount: MoneyCents,
    pub loyalty_discount_applied: bool,
    pub amount_paid: MoneyCents,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_ref: Option<String>,
    pub is_paid: bool,
    pub is_completed: bool,
    pub is_cancelled: bool,
    pub scheduled_start: DateTime<Utc>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    /// Completion rating, 1..=5.
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub cancellation_reason: Option<String>,
    pub currency: Currency,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WashSession {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        center_id: String,
        service_id: Uuid,
        vehicle_type_id: Uuid,
        customer_phone: String,
        plate: String,
        scheduled_start: DateTime<Utc>,
        currency: Currency,
        created_by: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            center_id,
            service_id,
            vehicle_type_id,
            customer_phone,
            customer_name: None,
            plate,
            brand: None,
            color: None,
            base_price: MoneyCents::ZERO,
            vehicle_multiplier: 1.0,
            price: MoneyCents::ZERO,
            loyalty_discount: MoneyCents::ZERO,
            loyalty_discount_applied: false,
            amount_paid: MoneyCents::ZERO,
            payment_method: None,
            transaction_ref: None,
            is_paid: false,
            is_completed: false,
            is_cancelled: false,
            scheduled_start,
            actual_start: None,
            actual_end: None,
            duration_minutes: None,
            rating: None,
            feedback: None,
            cancellation_reason: None,
            currency,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while the wash is running (started, not ended, not terminal).
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.actual_start.is_some()
            && self.actual_end.is_none()
            && !self.is_completed
            && !self.is_cancelled
    }

    /// True once the session reached Completed or Cancelled.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_completed || self.is_cancelled
    }

    /// Derives the display status (see [`SessionStatus`] for the priority
    /// contract).
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.is_cancelled {
            SessionStatus::Cancelled
        } else if self.is_completed {
            SessionStatus::Completed
        } else if self.is_in_progress() {
            SessionStatus::InProgress
        } else if self.is_paid {
            SessionStatus::PaidPending
        } else {
            SessionStatus::Unpaid
        }
    }

    /// Collects every violated required-field/positivity invariant.
    ///
    /// Never throws: this is the pre-submit gate, not a runtime guard.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.center_id.trim().is_empty() {
            issues.push(ValidationIssue::MissingCenter);
        }
        if self.service_id.is_nil() {
            issues.push(ValidationIssue::MissingService);
        }
        if self.vehicle_type_id.is_nil() {
            issues.push(ValidationIssue::MissingVehicleType);
        }
        if self.plate.trim().is_empty() {
            issues.push(ValidationIssue::MissingPlate);
        }
        if self.customer_phone.trim().is_empty() {
            issues.push(ValidationIssue::MissingCustomerPhone);
        }
        if !self.price.is_positive() {
            issues.push(ValidationIssue::NonPositivePrice);
        }
        if self.amount_paid.is_negative() {
            issues.push(ValidationIssue::NegativeAmountPaid);
        }
        issues
    }

    /// Starts the wash. Allowed only from Scheduled.
    pub fn start(&mut self, now: DateTime<Utc>) -> ResultEngine<()> {
        if self.is_cancelled {
            return Err(EngineError::InvalidTransition(
                "cannot start a cancelled session".to_string(),
            ));
        }
        if self.is_completed {
            return Err(EngineError::InvalidTransition(
                "cannot start a completed session".to_string(),
            ));
        }
        if self.actual_start.is_some() {
            return Err(EngineError::InvalidTransition(
                "session already started".to_string(),
            ));
        }
        self.actual_start = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Completes the wash. Allowed only from InProgress.
    ///
    /// When `duration_minutes` is given, `actual_end` is derived from
    /// `actual_start` so the two stay consistent; otherwise the duration is
    /// derived from `now`.
    pub fn complete(
        &mut self,
        now: DateTime<Utc>,
        duration_minutes: Option<i64>,
        rating: Option<u8>,
        feedback: Option<String>,
    ) -> ResultEngine<()> {
        if self.is_terminal() {
            return Err(EngineError::InvalidTransition(
                "session already completed or cancelled".to_string(),
            ));
        }
        let Some(started) = self.actual_start else {
            return Err(EngineError::InvalidTransition(
                "cannot complete a session that was never started".to_string(),
            ));
        };
        validate_rating(rating)?;

        let (end, duration) = match duration_minutes {
            Some(minutes) => (started + chrono::Duration::minutes(minutes), minutes),
            None => (now, (now - started).num_minutes()),
        };
        self.actual_end = Some(end);
        self.duration_minutes = Some(duration);
        self.is_completed = true;
        self.rating = rating;
        self.feedback = feedback;
        self.updated_at = now;
        Ok(())
    }

    /// Cancels the session. Allowed from Scheduled or InProgress; a second
    /// cancel fails and the first reason is retained.
    ///
    /// For a session that never started, returns the signed minutes between
    /// `now` and the scheduled start (negative when cancelled ahead of
    /// schedule). Diagnostic only; not stored and not used by any rule.
    pub fn cancel(&mut self, now: DateTime<Utc>, reason: String) -> ResultEngine<Option<i64>> {
        if self.is_terminal() {
            return Err(EngineError::InvalidTransition(
                "session already completed or cancelled".to_string(),
            ));
        }
        let lost_minutes = self
            .actual_start
            .is_none()
            .then(|| (now - self.scheduled_start).num_minutes());
        self.is_cancelled = true;
        self.cancellation_reason = Some(reason);
        self.updated_at = now;
        Ok(lost_minutes)
    }

    /// Records a payment on the session. Allowed at any non-cancelled state;
    /// before completion a second call overwrites the previous one (last
    /// write wins). Once the session is both completed and paid it is
    /// closed and further payments are rejected.
    pub fn apply_payment(
        &mut self,
        now: DateTime<Utc>,
        amount: MoneyCents,
        method: PaymentMethod,
        transaction_ref: Option<String>,
    ) -> ResultEngine<()> {
        if self.is_cancelled {
            return Err(EngineError::InvalidTransition(
                "cannot record a payment on a cancelled session".to_string(),
            ));
        }
        if self.is_completed && self.is_paid {
            return Err(EngineError::InvalidTransition(
                "session is closed; payment cannot change".to_string(),
            ));
        }
        self.amount_paid = amount;
        self.payment_method = Some(method);
        self.transaction_ref = transaction_ref;
        self.is_paid = true;
        self.updated_at = now;
        Ok(())
    }

    /// Replaces the price fields from a freshly computed result.
    ///
    /// The price is locked once a payment has been recorded, and terminal
    /// sessions cannot be re-priced.
    pub fn reprice(
        &mut self,
        result: &PriceCalculationResult,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        if self.is_paid {
            return Err(EngineError::InvalidTransition(
                "price is locked after payment".to_string(),
            ));
        }
        if self.is_terminal() {
            return Err(EngineError::InvalidTransition(
                "cannot re-price a completed or cancelled session".to_string(),
            ));
        }
        self.base_price = result.base_price;
        self.vehicle_multiplier = result.vehicle_multiplier;
        self.price = result.final_price;
        self.loyalty_discount = result.loyalty_discount;
        self.loyalty_discount_applied = result.loyalty_discount_applied;
        self.updated_at = now;
        Ok(())
    }

    /// Updates the completion rating/feedback.
    ///
    /// These are the only fields that stay mutable after the session is
    /// closed (completed and paid).
    pub fn update_feedback(
        &mut self,
        rating: Option<u8>,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        if !self.is_completed {
            return Err(EngineError::InvalidTransition(
                "feedback is only accepted on completed sessions".to_string(),
            ));
        }
        validate_rating(rating)?;
        if rating.is_some() {
            self.rating = rating;
        }
        if feedback.is_some() {
            self.feedback = feedback;
        }
        self.updated_at = now;
        Ok(())
    }
}

fn validate_rating(rating: Option<u8>) -> ResultEngine<()> {
    if let Some(r) = rating
        && !(1..=5).contains(&r)
    {
        return Err(EngineError::InvalidAmount(
            "rating must be within 1..=5".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wash_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub center_id: String,
    pub service_id: String,
    pub vehicle_type_id: String,
    pub customer_phone: String,
    pub customer_name: Option<String>,
    pub plate: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub base_price_minor: i64,
    pub vehicle_multiplier: f64,
    pub price_minor: i64,
    pub loyalty_discount_minor: i64,
    pub loyalty_discount_applied: bool,
    pub amount_paid_minor: i64,
    pub payment_method: Option<String>,
    pub transaction_ref: Option<String>,
    pub is_paid: bool,
    pub is_completed: bool,
    pub is_cancelled: bool,
    pub scheduled_start: DateTimeUtc,
    pub actual_start: Option<DateTimeUtc>,
    pub actual_end: Option<DateTimeUtc>,
    pub duration_minutes: Option<i64>,
    pub rating: Option<i32>,
    pub feedback: Option<String>,
    pub cancellation_reason: Option<String>,
    pub currency: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::centers::Entity",
        from = "Column::CenterId",
        to = "super::centers::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Centers,
    #[sea_orm(has_one = "super::payments::Entity")]
    Payments,
}

impl Related<super::centers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Centers.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&WashSession> for ActiveModel {
    fn from(session: &WashSession) -> Self {
        Self {
            id: ActiveValue::Set(session.id.to_string()),
            center_id: ActiveValue::Set(session.center_id.clone()),
            service_id: ActiveValue::Set(session.service_id.to_string()),
            vehicle_type_id: ActiveValue::Set(session.vehicle_type_id.to_string()),
            customer_phone: ActiveValue::Set(session.customer_phone.clone()),
            customer_name: ActiveValue::Set(session.customer_name.clone()),
            plate: ActiveValue::Set(session.plate.clone()),
            brand: ActiveValue::Set(session.brand.clone()),
            color: ActiveValue::Set(session.color.clone()),
            base_price_minor: ActiveValue::Set(session.base_price.cents()),
            vehicle_multiplier: ActiveValue::Set(session.vehicle_multiplier),
            price_minor: ActiveValue::Set(session.price.cents()),
            loyalty_discount_minor: ActiveValue::Set(session.loyalty_discount.cents()),
            loyalty_discount_applied: ActiveValue::Set(session.loyalty_discount_applied),
            amount_paid_minor: ActiveValue::Set(session.amount_paid.cents()),
            payment_method: ActiveValue::Set(
                session.payment_method.map(|m| m.as_str().to_string()),
            ),
            transaction_ref: ActiveValue::Set(session.transaction_ref.clone()),
            is_paid: ActiveValue::Set(session.is_paid),
            is_completed: ActiveValue::Set(session.is_completed),
            is_cancelled: ActiveValue::Set(session.is_cancelled),
            scheduled_start: ActiveValue::Set(session.scheduled_start),
            actual_start: ActiveValue::Set(session.actual_start),
            actual_end: ActiveValue::Set(session.actual_end),
            duration_minutes: ActiveValue::Set(session.duration_minutes),
            rating: ActiveValue::Set(session.rating.map(i32::from)),
            feedback: ActiveValue::Set(session.feedback.clone()),
            cancellation_reason: ActiveValue::Set(session.cancellation_reason.clone()),
            currency: ActiveValue::Set(session.currency.code().to_string()),
            created_by: ActiveValue::Set(session.created_by.clone()),
            created_at: ActiveValue::Set(session.created_at),
            updated_at: ActiveValue::Set(session.updated_at),
        }
    }
}

impl TryFrom<Model> for WashSession {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("session not exists".to_string()))?,
            center_id: model.center_id,
            service_id: Uuid::parse_str(&model.service_id)
                .map_err(|_| EngineError::InvalidId("invalid service id".to_string()))?,
            vehicle_type_id: Uuid::parse_str(&model.vehicle_type_id)
                .map_err(|_| EngineError::InvalidId("invalid vehicle type id".to_string()))?,
            customer_phone: model.customer_phone,
            customer_name: model.customer_name,
            plate: model.plate,
            brand: model.brand,
            color: model.color,
            base_price: MoneyCents::new(model.base_price_minor),
            vehicle_multiplier: model.vehicle_multiplier,
            price: MoneyCents::new(model.price_minor),
            loyalty_discount: MoneyCents::new(model.loyalty_discount_minor),
            loyalty_discount_applied: model.loyalty_discount_applied,
            amount_paid: MoneyCents::new(model.amount_paid_minor),
            payment_method: model
                .payment_method
                .as_deref()
                .map(PaymentMethod::try_from)
                .transpose()?,
            transaction_ref: model.transaction_ref,
            is_paid: model.is_paid,
            is_completed: model.is_completed,
            is_cancelled: model.is_cancelled,
            scheduled_start: model.scheduled_start,
            actual_start: model.actual_start,
            actual_end: model.actual_end,
            duration_minutes: model.duration_minutes,
            rating: model.rating.and_then(|r| u8::try_from(r).ok()),
            feedback: model.feedback,
            cancellation_reason: model.cancellation_reason,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing;

    fn session() -> WashSession {
        let now = Utc::now();
        let mut session = WashSession::new(
            "center-1".to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "+233201234567".to_string(),
            "GR1234-20".to_string(),
            now + chrono::Duration::hours(1),
            Currency::Ghs,
            "ama".to_string(),
            now,
        );
        session.price = MoneyCents::new(2000);
        session.base_price = MoneyCents::new(2000);
        session
    }

    #[test]
    fn start_then_complete() {
        let mut s = session();
        let now = Utc::now();
        s.start(now).unwrap();
        assert!(s.is_in_progress());

        s.complete(now + chrono::Duration::minutes(45), Some(45), Some(5), None)
            .unwrap();
        assert!(s.is_completed);
        assert!(!s.is_in_progress());
        let start = s.actual_start.unwrap();
        let end = s.actual_end.unwrap();
        assert_eq!((end - start).num_minutes(), 45);
        assert_eq!(s.duration_minutes, Some(45));
    }

    #[test]
    fn complete_without_start_fails() {
        let mut s = session();
        let result = s.complete(Utc::now(), Some(30), None, None);
        assert!(matches!(result, Err(EngineError::InvalidTransition(_))));
        assert!(!s.is_completed);
    }

    #[test]
    fn start_twice_fails() {
        let mut s = session();
        s.start(Utc::now()).unwrap();
        assert!(matches!(
            s.start(Utc::now()),
            Err(EngineError::InvalidTransition(_))
        ));
    }

    #[test]
    fn cancelled_dominates_status() {
        let mut s = session();
        let now = Utc::now();
        s.apply_payment(now, MoneyCents::new(2000), PaymentMethod::Cash, None)
            .unwrap();
        assert_eq!(s.status(), SessionStatus::PaidPending);

        s.cancel(now, "customer no-show".to_string()).unwrap();
        assert_eq!(s.status(), SessionStatus::Cancelled);
        assert!(s.is_paid);
    }

    #[test]
    fn second_cancel_fails_and_keeps_first_reason() {
        let mut s = session();
        s.cancel(Utc::now(), "rain".to_string()).unwrap();
        let result = s.cancel(Utc::now(), "changed my mind".to_string());
        assert!(matches!(result, Err(EngineError::InvalidTransition(_))));
        assert_eq!(s.cancellation_reason.as_deref(), Some("rain"));
    }

    #[test]
    fn cancel_before_schedule_reports_negative_lost_minutes() {
        let mut s = session();
        // Scheduled one hour from "now" in the fixture.
        let lost = s.cancel(s.created_at, "overbooked".to_string()).unwrap();
        assert_eq!(lost, Some(-60));
    }

    #[test]
    fn cancel_after_start_has_no_lost_minutes() {
        let mut s = session();
        let now = Utc::now();
        s.start(now).unwrap();
        let lost = s.cancel(now, "pump failure".to_string()).unwrap();
        assert_eq!(lost, None);
        assert_eq!(s.status(), SessionStatus::Cancelled);
    }

    #[test]
    fn payment_overwrites_until_closed() {
        let mut s = session();
        let now = Utc::now();
        s.apply_payment(now, MoneyCents::new(1000), PaymentMethod::Cash, None)
            .unwrap();
        s.apply_payment(
            now,
            MoneyCents::new(2000),
            PaymentMethod::MobileMoney,
            Some("MM-1".to_string()),
        )
        .unwrap();
        assert_eq!(s.amount_paid.cents(), 2000);
        assert_eq!(s.payment_method, Some(PaymentMethod::MobileMoney));

        s.start(now).unwrap();
        s.complete(now, Some(30), None, None).unwrap();
        let result = s.apply_payment(now, MoneyCents::new(500), PaymentMethod::Cash, None);
        assert!(matches!(result, Err(EngineError::InvalidTransition(_))));
        assert_eq!(s.amount_paid.cents(), 2000);
    }

    #[test]
    fn reprice_locked_after_payment() {
        let mut s = session();
        let now = Utc::now();
        s.apply_payment(now, MoneyCents::new(2000), PaymentMethod::Cash, None)
            .unwrap();
        let result = pricing::calculate(MoneyCents::new(2000), 1.0);
        assert!(matches!(
            s.reprice(&result, now),
            Err(EngineError::InvalidTransition(_))
        ));
    }

    #[test]
    fn validate_collects_all_issues() {
        let now = Utc::now();
        let draft = WashSession::new(
            String::new(),
            Uuid::nil(),
            Uuid::nil(),
            String::new(),
            String::new(),
            now,
            Currency::Ghs,
            "ama".to_string(),
            now,
        );
        let issues = draft.validate();
        assert_eq!(issues.len(), 6);
        assert!(issues.contains(&ValidationIssue::MissingCenter));
        assert!(issues.contains(&ValidationIssue::NonPositivePrice));
    }

    #[test]
    fn feedback_stays_mutable_after_close() {
        let mut s = session();
        let now = Utc::now();
        s.apply_payment(now, MoneyCents::new(2000), PaymentMethod::Cash, None)
            .unwrap();
        s.start(now).unwrap();
        s.complete(now, Some(30), None, None).unwrap();

        s.update_feedback(Some(4), Some("spotless".to_string()), now)
            .unwrap();
        assert_eq!(s.rating, Some(4));

        assert!(matches!(
            s.update_feedback(Some(9), None, now),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
