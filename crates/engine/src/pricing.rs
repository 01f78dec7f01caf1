//! Deterministic price derivation for a (service, vehicle type, customer)
//! triple.
//!
//! The result is a value object that is **rebuilt** on every input change:
//! `final_price` is always re-derived from `sub_total` and
//! `loyalty_discount` via [`recompute`] and is never independently settable.

use serde::{Deserialize, Serialize};

use crate::MoneyCents;

/// Re-derives the final price from its inputs.
///
/// This is the single place the `final_price = sub_total - loyalty_discount`
/// relation lives; every discount change goes through it.
#[must_use]
pub fn recompute(sub_total: MoneyCents, loyalty_discount: MoneyCents) -> MoneyCents {
    sub_total - loyalty_discount
}

/// Outcome of a price calculation.
///
/// Produced by [`calculate`] and consumed when creating or re-pricing a wash
/// session. Not persisted as a standalone entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceCalculationResult {
    pub base_price: MoneyCents,
    pub vehicle_multiplier: f64,
    pub sub_total: MoneyCents,
    pub loyalty_discount: MoneyCents,
    pub final_price: MoneyCents,
    pub loyalty_discount_applied: bool,
    /// Completed-booking count of the customer at calculation time.
    pub customer_wash_count: i64,
}

impl PriceCalculationResult {
    /// Attaches the customer's completed-booking count.
    #[must_use]
    pub fn with_wash_count(mut self, count: i64) -> Self {
        self.customer_wash_count = count;
        self
    }

    /// Returns a copy with the loyalty discount applied.
    ///
    /// `discount_percentage` is **not** clamped here; values outside
    /// `0..=100` must be rejected by the caller before invocation.
    #[must_use]
    pub fn apply_loyalty_discount(self, discount_percentage: u8) -> Self {
        let loyalty_discount = self.sub_total.percent(discount_percentage);
        Self {
            loyalty_discount,
            final_price: recompute(self.sub_total, loyalty_discount),
            loyalty_discount_applied: true,
            ..self
        }
    }

    /// Returns a copy with the loyalty discount removed.
    #[must_use]
    pub fn remove_loyalty_discount(self) -> Self {
        Self {
            loyalty_discount: MoneyCents::ZERO,
            final_price: recompute(self.sub_total, MoneyCents::ZERO),
            loyalty_discount_applied: false,
            ..self
        }
    }
}

/// Combines a catalog base price with a vehicle-size multiplier.
///
/// Pure: always produces a result, with the discount unapplied. Negative
/// inputs are not validated here and propagate a nonsensical price; the
/// catalog operations guard against them upstream.
#[must_use]
pub fn calculate(base_price: MoneyCents, vehicle_multiplier: f64) -> PriceCalculationResult {
    let sub_total = base_price.scale(vehicle_multiplier);
    PriceCalculationResult {
        base_price,
        vehicle_multiplier,
        sub_total,
        loyalty_discount: MoneyCents::ZERO,
        final_price: recompute(sub_total, MoneyCents::ZERO),
        loyalty_discount_applied: false,
        customer_wash_count: 0,
    }
}
