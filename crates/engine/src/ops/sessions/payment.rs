use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CustomerPayment, EngineError, RecordPayment, ResultEngine, WashSession, payments, sessions,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Records a payment against a session.
    ///
    /// The payment-validity predicate runs **before** anything is applied:
    /// an invalid payment (for example mobile money without a transaction
    /// reference) is rejected with `PaymentInvalid` and the session stays
    /// untouched. Before completion a new call overwrites the previous
    /// payment (last write wins); once the session is completed and paid it
    /// is closed.
    pub async fn record_payment(
        &self,
        center_id: &str,
        session_id: Uuid,
        user_id: &str,
        cmd: RecordPayment,
    ) -> ResultEngine<WashSession> {
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            let model = self.require_session(&db_tx, center_id, session_id).await?;
            let mut session = WashSession::try_from(model)?;

            let mut payment = CustomerPayment::new(
                session.id,
                center_id.to_string(),
                cmd.amount,
                cmd.method,
                cmd.received_by.clone(),
                cmd.at,
                session.currency,
            );
            payment.transaction_ref = cmd.transaction_ref.clone();
            payment.validate()?;

            session.apply_payment(cmd.at, cmd.amount, cmd.method, cmd.transaction_ref.clone())?;

            let exists = payments::Entity::find_by_id(session.id.to_string())
                .one(&db_tx)
                .await?
                .is_some();
            let payment_model: payments::ActiveModel = (&payment).into();
            if exists {
                payment_model.update(&db_tx).await?;
            } else {
                payment_model.insert(&db_tx).await?;
            }

            let update = sessions::ActiveModel {
                id: ActiveValue::Set(session.id.to_string()),
                amount_paid_minor: ActiveValue::Set(session.amount_paid.cents()),
                payment_method: ActiveValue::Set(
                    session.payment_method.map(|m| m.as_str().to_string()),
                ),
                transaction_ref: ActiveValue::Set(session.transaction_ref.clone()),
                is_paid: ActiveValue::Set(true),
                updated_at: ActiveValue::Set(session.updated_at),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(session)
        })
    }

    /// Returns the payment recorded for a session.
    pub async fn payment(
        &self,
        center_id: &str,
        session_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<CustomerPayment> {
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            self.require_session(&db_tx, center_id, session_id).await?;
            let model = payments::Entity::find_by_id(session_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("payment not exists".to_string()))?;
            CustomerPayment::try_from(model)
        })
    }

    /// Marks a session's payment as verified after re-running the validity
    /// predicate.
    pub async fn verify_payment(
        &self,
        center_id: &str,
        session_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<CustomerPayment> {
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            self.require_session(&db_tx, center_id, session_id).await?;
            let model = payments::Entity::find_by_id(session_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("payment not exists".to_string()))?;
            let mut payment = CustomerPayment::try_from(model)?;
            payment.validate()?;
            payment.is_verified = true;

            let update = payments::ActiveModel {
                session_id: ActiveValue::Set(payment.session_id.to_string()),
                is_verified: ActiveValue::Set(true),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(payment)
        })
    }
}
