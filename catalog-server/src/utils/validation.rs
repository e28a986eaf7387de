//! Input validation helpers
//!
//! Boundary checks shared by the HTTP handlers and the catalog service.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use shared::error::{AppError, AppResult};
use shared::models::{ProductCreate, ProductId, ProductUpdate};

// ── Limits ──────────────────────────────────────────────────────────

/// Product names
pub const MAX_NAME_LEN: usize = 200;

/// Category and brand names
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Largest page size accepted by list endpoints
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Largest accepted unit price
pub const MAX_PRICE: f64 = 1_000_000_000_000.0;

// ── Text ────────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate an optional string: if present it follows the required rules.
pub fn validate_optional_text(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    match value {
        Some(v) => validate_required_text(v, field, max_len),
        None => Ok(()),
    }
}

// ── Numbers ─────────────────────────────────────────────────────────

/// Price must be a finite positive number no larger than [`MAX_PRICE`]
pub fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::validation(format!(
            "price must be a positive number, got {price}"
        ))
        .with_detail("field", "price"));
    }
    if price > MAX_PRICE || Decimal::from_f64(price).is_none() {
        return Err(
            AppError::validation(format!("price must not exceed {MAX_PRICE}"))
                .with_detail("field", "price"),
        );
    }
    Ok(())
}

/// Required positive integer query parameter
pub fn require_positive(value: Option<u64>, field: &str) -> AppResult<u64> {
    match value {
        Some(v) if v > 0 => Ok(v),
        Some(_) => Err(AppError::invalid_pagination(format!("{field} must be a positive integer"))
            .with_detail("field", field)),
        None => Err(AppError::invalid_pagination(format!("{field} is required"))
            .with_detail("field", field)),
    }
}

/// Positive page size within [`MAX_PAGE_LIMIT`]
pub fn require_limit(value: Option<u64>) -> AppResult<u64> {
    let limit = require_positive(value, "limit")?;
    if limit > MAX_PAGE_LIMIT {
        return Err(AppError::invalid_pagination(format!(
            "limit must not exceed {MAX_PAGE_LIMIT}"
        ))
        .with_detail("field", "limit"));
    }
    Ok(limit)
}

// ── Identity ────────────────────────────────────────────────────────

/// Parse a 24-hex-digit product id
pub fn parse_product_id(raw: &str) -> AppResult<ProductId> {
    raw.parse().map_err(|_| AppError::invalid_product_id(raw))
}

// ── Payloads ────────────────────────────────────────────────────────

pub fn validate_product_create(data: &ProductCreate) -> AppResult<()> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&data.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&data.brand, "brand", MAX_SHORT_TEXT_LEN)?;
    validate_price(data.price)
}

/// An empty patch is valid (it is a no-op update)
pub fn validate_product_update(data: &ProductUpdate) -> AppResult<()> {
    validate_optional_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.brand, "brand", MAX_SHORT_TEXT_LEN)?;
    if let Some(price) = data.price {
        validate_price(price)?;
    }
    Ok(())
}
