//! Core engine for a car-wash-center service: the wash-session lifecycle and
//! the pricing & loyalty rules, backed by sqlite via sea-orm.
//!
//! The [`Engine`] owns the database connection and exposes one operation per
//! use case (booking, start/complete/cancel, payment, discount toggling,
//! catalog maintenance). All timestamps are supplied by the caller; the
//! engine itself never reads the clock.

pub use catalog::{CatalogCache, ServiceType, VehicleType};
pub use centers::Center;
pub use commands::{BookSession, CompleteSession, RecordPayment};
pub use currency::Currency;
pub use customers::{Customer, loyalty_tier};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{CatalogSnapshot, Engine, EngineBuilder, SessionListFilter};
pub use payments::{CustomerPayment, PaymentMethod};
pub use pricing::{PriceCalculationResult, calculate, recompute};
pub use sessions::{SessionStatus, ValidationIssue, WashSession};

mod catalog;
mod centers;
mod commands;
mod currency;
mod customer_vehicles;
mod customers;
mod error;
mod money;
mod ops;
mod payments;
mod pricing;
mod sessions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
