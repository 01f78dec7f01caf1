//! Command structs for engine operations.
//!
//! These types group parameters for write operations (booking, completion,
//! payment), keeping call sites readable and avoiding long argument lists.
//! Each operation has its own struct with its own validation downstream.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{MoneyCents, payments::PaymentMethod};

/// Create a wash session (a booking).
#[derive(Clone, Debug)]
pub struct BookSession {
    pub center_id: String,
    pub service_id: Uuid,
    pub vehicle_type_id: Uuid,
    pub customer_phone: String,
    pub customer_name: Option<String>,
    pub plate: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    /// Request the loyalty discount; applied only if the customer is
    /// eligible.
    pub apply_loyalty_discount: bool,
    pub scheduled_start: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

impl BookSession {
    #[must_use]
    pub fn new(
        center_id: impl Into<String>,
        service_id: Uuid,
        vehicle_type_id: Uuid,
        customer_phone: impl Into<String>,
        plate: impl Into<String>,
        scheduled_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            center_id: center_id.into(),
            service_id,
            vehicle_type_id,
            customer_phone: customer_phone.into(),
            customer_name: None,
            plate: plate.into(),
            brand: None,
            color: None,
            apply_loyalty_discount: false,
            scheduled_start,
            now,
        }
    }

    #[must_use]
    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_loyalty_discount(mut self) -> Self {
        self.apply_loyalty_discount = true;
        self
    }
}

/// Complete a wash session.
#[derive(Clone, Debug)]
pub struct CompleteSession {
    pub duration_minutes: Option<i64>,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub at: DateTime<Utc>,
}

impl CompleteSession {
    #[must_use]
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            duration_minutes: None,
            rating: None,
            feedback: None,
            at,
        }
    }

    #[must_use]
    pub fn duration_minutes(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    #[must_use]
    pub fn rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    #[must_use]
    pub fn feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}

/// Record a payment against a session.
#[derive(Clone, Debug)]
pub struct RecordPayment {
    pub amount: MoneyCents,
    pub method: PaymentMethod,
    pub transaction_ref: Option<String>,
    pub received_by: String,
    pub at: DateTime<Utc>,
}

impl RecordPayment {
    #[must_use]
    pub fn new(
        amount: MoneyCents,
        method: PaymentMethod,
        received_by: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            method,
            transaction_ref: None,
            received_by: received_by.into(),
            at,
        }
    }

    #[must_use]
    pub fn transaction_ref(mut self, reference: impl Into<String>) -> Self {
        self.transaction_ref = Some(reference.into());
        self
    }
}
