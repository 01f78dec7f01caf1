//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! normalization and parsing so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value)
        .map_err(|_| EngineError::InvalidAmount(format!("invalid currency: {value}")))
}

/// Normalize a customer phone number into the canonical storage key.
///
/// Strips spaces, dashes and parentheses; keeps an optional leading `+`
/// followed by digits only.
pub(crate) fn normalize_phone(value: &str) -> ResultEngine<String> {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(EngineError::InvalidId(format!(
            "invalid customer phone: {value}"
        )));
    }
    Ok(cleaned)
}

/// Normalize a vehicle plate: uppercase, alphanumeric and dashes only.
pub(crate) fn normalize_plate(value: &str) -> ResultEngine<String> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.is_empty() {
        return Err(EngineError::InvalidId(format!(
            "invalid vehicle plate: {value}"
        )));
    }
    Ok(cleaned)
}
