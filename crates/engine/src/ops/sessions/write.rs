use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BookSession, CompleteSession, Customer, EngineError, ResultEngine, WashSession,
    pricing::{self, PriceCalculationResult},
    sessions, util,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Books a wash session.
    ///
    /// Resolves the catalog inputs, runs the pricing engine (applying the
    /// center's loyalty discount when requested and the customer is
    /// eligible), validates the draft, creates the customer on first
    /// contact and persists the session as Scheduled.
    pub async fn book_session(
        &self,
        user_id: &str,
        cmd: BookSession,
    ) -> ResultEngine<(Uuid, PriceCalculationResult)> {
        let phone = util::normalize_phone(&cmd.customer_phone)?;
        let plate = util::normalize_plate(&cmd.plate)?;

        with_tx!(self, |db_tx| {
            let center = self.require_center(&db_tx, &cmd.center_id, user_id).await?;
            let currency = util::model_currency(&center.currency)?;

            let base_price = self
                .base_price_for(&db_tx, &cmd.center_id, cmd.service_id, cmd.now)
                .await?;
            let multiplier = self
                .multiplier_for(&db_tx, &cmd.center_id, cmd.vehicle_type_id, cmd.now)
                .await?;

            let customer = self.find_customer(&db_tx, &phone).await?;
            let wash_count = customer
                .as_ref()
                .map_or(0, |c| c.total_completed_bookings);
            let eligible = customer
                .as_ref()
                .is_some_and(Customer::is_discount_eligible);

            let mut result = pricing::calculate(base_price, multiplier).with_wash_count(wash_count);
            if cmd.apply_loyalty_discount && eligible {
                let percent = u8::try_from(center.loyalty_discount_percent).unwrap_or(0);
                result = result.apply_loyalty_discount(percent);
            }

            let mut session = WashSession::new(
                cmd.center_id.clone(),
                cmd.service_id,
                cmd.vehicle_type_id,
                phone.clone(),
                plate.clone(),
                cmd.scheduled_start,
                currency,
                user_id.to_string(),
                cmd.now,
            );
            session.customer_name = cmd.customer_name.clone();
            session.brand = cmd.brand.clone();
            session.color = cmd.color.clone();
            session.reprice(&result, cmd.now)?;

            let issues = session.validate();
            if !issues.is_empty() {
                return Err(EngineError::ValidationFailed(
                    issues.iter().map(|i| i.as_str().to_string()).collect(),
                ));
            }

            self.ensure_customer(
                &db_tx,
                &phone,
                cmd.customer_name.as_deref(),
                &plate,
                cmd.now,
            )
            .await?;

            let session_id = session.id;
            let model: sessions::ActiveModel = (&session).into();
            model.insert(&db_tx).await?;

            Ok((session_id, result))
        })
    }

    /// Starts a scheduled session.
    pub async fn start_session(
        &self,
        center_id: &str,
        session_id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<WashSession> {
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            let model = self.require_session(&db_tx, center_id, session_id).await?;
            let mut session = WashSession::try_from(model)?;
            session.start(now)?;

            let update = sessions::ActiveModel {
                id: ActiveValue::Set(session.id.to_string()),
                actual_start: ActiveValue::Set(session.actual_start),
                updated_at: ActiveValue::Set(session.updated_at),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(session)
        })
    }

    /// Completes a running session and applies the loyalty side effect.
    ///
    /// The customer counters move with an atomic SQL increment inside the
    /// same transaction, so two sessions completing concurrently for the
    /// same customer cannot lose an update.
    pub async fn complete_session(
        &self,
        center_id: &str,
        session_id: Uuid,
        user_id: &str,
        cmd: CompleteSession,
    ) -> ResultEngine<(WashSession, Customer)> {
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            let model = self.require_session(&db_tx, center_id, session_id).await?;
            let mut session = WashSession::try_from(model)?;
            session.complete(cmd.at, cmd.duration_minutes, cmd.rating, cmd.feedback)?;

            let mut customer = self
                .find_customer(&db_tx, &session.customer_phone)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("customer not exists".to_string()))?;

            let update = sessions::ActiveModel {
                id: ActiveValue::Set(session.id.to_string()),
                actual_end: ActiveValue::Set(session.actual_end),
                duration_minutes: ActiveValue::Set(session.duration_minutes),
                is_completed: ActiveValue::Set(true),
                rating: ActiveValue::Set(session.rating.map(i32::from)),
                feedback: ActiveValue::Set(session.feedback.clone()),
                updated_at: ActiveValue::Set(session.updated_at),
                ..Default::default()
            };
            update.update(&db_tx).await?;

            let backend = self.database.get_database_backend();
            db_tx
                .execute(sea_orm::Statement::from_sql_and_values(
                    backend,
                    "UPDATE customers \
                     SET total_completed_bookings = total_completed_bookings + 1, \
                         total_amount_spent_minor = total_amount_spent_minor + ?, \
                         last_visit = ? \
                     WHERE phone = ?;",
                    vec![
                        session.amount_paid.cents().into(),
                        cmd.at.into(),
                        session.customer_phone.clone().into(),
                    ],
                ))
                .await?;
            // Mirror the increment on the snapshot we return.
            customer.increment_bookings(session.amount_paid, cmd.at);

            Ok((session, customer))
        })
    }

    /// Cancels a scheduled or running session.
    ///
    /// For a never-started session, returns the diagnostic "lost minutes"
    /// (signed distance from the scheduled start; negative when cancelled
    /// ahead of schedule).
    pub async fn cancel_session(
        &self,
        center_id: &str,
        session_id: Uuid,
        user_id: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<(WashSession, Option<i64>)> {
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            let model = self.require_session(&db_tx, center_id, session_id).await?;
            let mut session = WashSession::try_from(model)?;
            let lost_minutes = session.cancel(now, reason.to_string())?;

            let update = sessions::ActiveModel {
                id: ActiveValue::Set(session.id.to_string()),
                is_cancelled: ActiveValue::Set(true),
                cancellation_reason: ActiveValue::Set(session.cancellation_reason.clone()),
                updated_at: ActiveValue::Set(session.updated_at),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok((session, lost_minutes))
        })
    }

    /// Toggles the loyalty discount on an unpaid session, re-running the
    /// pricing from the captured base inputs.
    pub async fn set_loyalty_discount(
        &self,
        center_id: &str,
        session_id: Uuid,
        user_id: &str,
        apply: bool,
        now: DateTime<Utc>,
    ) -> ResultEngine<(WashSession, PriceCalculationResult)> {
        with_tx!(self, |db_tx| {
            let center = self.require_center(&db_tx, center_id, user_id).await?;
            let model = self.require_session(&db_tx, center_id, session_id).await?;
            let mut session = WashSession::try_from(model)?;

            let customer = self.find_customer(&db_tx, &session.customer_phone).await?;
            let wash_count = customer
                .as_ref()
                .map_or(0, |c| c.total_completed_bookings);
            let eligible = customer
                .as_ref()
                .is_some_and(Customer::is_discount_eligible);

            let mut result = pricing::calculate(session.base_price, session.vehicle_multiplier)
                .with_wash_count(wash_count);
            if apply && eligible {
                let percent = u8::try_from(center.loyalty_discount_percent).unwrap_or(0);
                result = result.apply_loyalty_discount(percent);
            }
            session.reprice(&result, now)?;

            let update = sessions::ActiveModel {
                id: ActiveValue::Set(session.id.to_string()),
                price_minor: ActiveValue::Set(session.price.cents()),
                loyalty_discount_minor: ActiveValue::Set(session.loyalty_discount.cents()),
                loyalty_discount_applied: ActiveValue::Set(session.loyalty_discount_applied),
                updated_at: ActiveValue::Set(session.updated_at),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok((session, result))
        })
    }

    /// Updates the rating/feedback of a completed session.
    pub async fn update_feedback(
        &self,
        center_id: &str,
        session_id: Uuid,
        user_id: &str,
        rating: Option<u8>,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<WashSession> {
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            let model = self.require_session(&db_tx, center_id, session_id).await?;
            let mut session = WashSession::try_from(model)?;
            session.update_feedback(rating, feedback, now)?;

            let update = sessions::ActiveModel {
                id: ActiveValue::Set(session.id.to_string()),
                rating: ActiveValue::Set(session.rating.map(i32::from)),
                feedback: ActiveValue::Set(session.feedback.clone()),
                updated_at: ActiveValue::Set(session.updated_at),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(session)
        })
    }
}
