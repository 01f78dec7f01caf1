//! Payment primitives.
//!
//! A [`CustomerPayment`] is the 1:1 record of money received for a wash
//! session. Electronic methods (mobile money, card, bank transfer) require a
//! transaction reference before the record is considered valid; cash does
//! not.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    Card,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::MobileMoney => "mobile_money",
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
        }
    }

    /// Everything except cash needs a transaction reference.
    #[must_use]
    pub fn is_electronic(self) -> bool {
        !matches!(self, Self::Cash)
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "mobile_money" => Ok(Self::MobileMoney),
            "card" => Ok(Self::Card),
            "bank_transfer" => Ok(Self::BankTransfer),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerPayment {
    pub session_id: Uuid,
    pub center_id: String,
    pub amount: MoneyCents,
    pub method: PaymentMethod,
    pub transaction_ref: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub received_by: String,
    pub is_verified: bool,
    pub currency: Currency,
}

impl CustomerPayment {
    pub fn new(
        session_id: Uuid,
        center_id: String,
        amount: MoneyCents,
        method: PaymentMethod,
        received_by: String,
        paid_at: DateTime<Utc>,
        currency: Currency,
    ) -> Self {
        Self {
            session_id,
            center_id,
            amount,
            method,
            transaction_ref: None,
            paid_at,
            received_by,
            is_verified: false,
            currency,
        }
    }

    /// Payment-validity predicate.
    ///
    /// A payment is valid iff the amount is positive, session/center ids and
    /// `received_by` are non-empty, and electronic methods carry a non-empty
    /// transaction reference.
    pub fn validate(&self) -> ResultEngine<()> {
        if !self.amount.is_positive() {
            return Err(EngineError::PaymentInvalid(
                "amount must be > 0".to_string(),
            ));
        }
        if self.session_id.is_nil() {
            return Err(EngineError::PaymentInvalid(
                "missing session reference".to_string(),
            ));
        }
        if self.center_id.trim().is_empty() {
            return Err(EngineError::PaymentInvalid(
                "missing center reference".to_string(),
            ));
        }
        if self.received_by.trim().is_empty() {
            return Err(EngineError::PaymentInvalid(
                "received_by must not be empty".to_string(),
            ));
        }
        if self.method.is_electronic()
            && self
                .transaction_ref
                .as_deref()
                .is_none_or(|r| r.trim().is_empty())
        {
            return Err(EngineError::PaymentInvalid(format!(
                "{} payments require a transaction reference",
                self.method.as_str()
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: String,
    pub center_id: String,
    pub amount_minor: i64,
    pub method: String,
    pub transaction_ref: Option<String>,
    pub paid_at: DateTimeUtc,
    pub received_by: String,
    pub is_verified: bool,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sessions::Entity",
        from = "Column::SessionId",
        to = "super::sessions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Sessions,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CustomerPayment> for ActiveModel {
    fn from(payment: &CustomerPayment) -> Self {
        Self {
            session_id: ActiveValue::Set(payment.session_id.to_string()),
            center_id: ActiveValue::Set(payment.center_id.clone()),
            amount_minor: ActiveValue::Set(payment.amount.cents()),
            method: ActiveValue::Set(payment.method.as_str().to_string()),
            transaction_ref: ActiveValue::Set(payment.transaction_ref.clone()),
            paid_at: ActiveValue::Set(payment.paid_at),
            received_by: ActiveValue::Set(payment.received_by.clone()),
            is_verified: ActiveValue::Set(payment.is_verified),
            currency: ActiveValue::Set(payment.currency.code().to_string()),
        }
    }
}

impl TryFrom<Model> for CustomerPayment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            session_id: Uuid::parse_str(&model.session_id)
                .map_err(|_| EngineError::InvalidId("invalid payment session id".to_string()))?,
            center_id: model.center_id,
            amount: MoneyCents::new(model.amount_minor),
            method: PaymentMethod::try_from(model.method.as_str())?,
            transaction_ref: model.transaction_ref,
            paid_at: model.paid_at,
            received_by: model.received_by,
            is_verified: model.is_verified,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(method: PaymentMethod) -> CustomerPayment {
        CustomerPayment::new(
            Uuid::new_v4(),
            "center-1".to_string(),
            MoneyCents::new(1500),
            method,
            "kwame".to_string(),
            Utc::now(),
            Currency::Ghs,
        )
    }

    #[test]
    fn cash_needs_no_reference() {
        assert!(payment(PaymentMethod::Cash).validate().is_ok());
    }

    #[test]
    fn electronic_without_reference_is_invalid() {
        let result = payment(PaymentMethod::MobileMoney).validate();
        assert!(matches!(result, Err(EngineError::PaymentInvalid(_))));
    }

    #[test]
    fn electronic_with_reference_is_valid() {
        let mut p = payment(PaymentMethod::MobileMoney);
        p.transaction_ref = Some("MM-12345".to_string());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn blank_reference_counts_as_missing() {
        let mut p = payment(PaymentMethod::Card);
        p.transaction_ref = Some("   ".to_string());
        assert!(matches!(
            p.validate(),
            Err(EngineError::PaymentInvalid(_))
        ));
    }

    #[test]
    fn non_positive_amount_is_invalid() {
        let mut p = payment(PaymentMethod::Cash);
        p.amount = MoneyCents::ZERO;
        assert!(matches!(
            p.validate(),
            Err(EngineError::PaymentInvalid(_))
        ));
    }

    #[test]
    fn missing_receiver_is_invalid() {
        let mut p = payment(PaymentMethod::Cash);
        p.received_by = String::new();
        assert!(matches!(
            p.validate(),
            Err(EngineError::PaymentInvalid(_))
        ));
    }

    #[test]
    fn method_roundtrip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::MobileMoney,
            PaymentMethod::Card,
            PaymentMethod::BankTransfer,
        ] {
            assert_eq!(PaymentMethod::try_from(method.as_str()).unwrap(), method);
        }
        assert!(PaymentMethod::try_from("cheque").is_err());
    }
}
