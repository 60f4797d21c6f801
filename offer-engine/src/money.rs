//! Money calculation utilities using rust_decimal for precision
//!
//! Models store `f64`; all arithmetic is done with `Decimal` internally and
//! converted back for storage/serialization, rounded to two decimal places
//! with half-up rounding.

use rust_decimal::prelude::*;
use shared::cart::CartLineItem;
use shared::error::AppError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price per line item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line item
const MAX_QUANTITY: i32 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a Decimal to the currency's minor-unit precision (half-up)
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `percent`% of `base`, rounded to money precision
#[inline]
pub fn percentage_of(base: Decimal, percent: f64) -> Decimal {
    round_money(base * to_decimal(percent) / Decimal::ONE_HUNDRED)
}

/// Post-product-discount subtotal: sum of effective unit price x quantity
pub fn effective_subtotal(items: &[CartLineItem]) -> Decimal {
    items
        .iter()
        .map(|i| to_decimal(i.effective_unit_price()) * Decimal::from(i.quantity))
        .sum()
}

/// Pre-discount subtotal: sum of unit list price x quantity
pub fn list_subtotal(items: &[CartLineItem]) -> Decimal {
    items
        .iter()
        .map(|i| to_decimal(i.unit_list_price) * Decimal::from(i.quantity))
        .sum()
}

/// Validate a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a line item before it enters a cart
pub fn validate_line_item(item: &CartLineItem) -> Result<(), AppError> {
    require_finite(item.unit_list_price, "unit_list_price")?;
    if item.unit_list_price < 0.0 || item.unit_list_price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "unit_list_price must be between 0 and {}, got {}",
            MAX_PRICE, item.unit_list_price
        )));
    }

    if let Some(dp) = item.unit_discounted_price {
        require_finite(dp, "unit_discounted_price")?;
        if dp < 0.0 || dp > item.unit_list_price {
            return Err(AppError::validation(format!(
                "unit_discounted_price must be between 0 and the list price, got {}",
                dp
            )));
        }
    }

    if item.quantity < 1 {
        return Err(AppError::validation(format!(
            "quantity must be at least 1, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(list: f64, discounted: Option<f64>, quantity: i32) -> CartLineItem {
        CartLineItem {
            product_id: "p1".to_string(),
            name: "Item".to_string(),
            quantity,
            unit_list_price: list,
            unit_discounted_price: discounted,
        }
    }

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_rounding_half_up() {
        // 0.005 rounds up to 0.01, 0.004 rounds down to 0.00
        assert_eq!(to_f64(Decimal::new(5, 3)), 0.01);
        assert_eq!(to_f64(Decimal::new(4, 3)), 0.0);
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(to_f64(percentage_of(to_decimal(1000.0), 20.0)), 200.0);
        // 33% of 100 = 33.00
        assert_eq!(to_f64(percentage_of(to_decimal(100.0), 33.0)), 33.0);
        // 10% of 0.05 = 0.005 -> 0.01 half-up
        assert_eq!(to_f64(percentage_of(to_decimal(0.05), 10.0)), 0.01);
    }

    #[test]
    fn test_effective_subtotal_uses_discounted_price() {
        let items = vec![item(100.0, Some(80.0), 2), item(50.0, None, 1)];
        assert_eq!(to_f64(effective_subtotal(&items)), 210.0);
        assert_eq!(to_f64(list_subtotal(&items)), 250.0);
    }

    #[test]
    fn test_to_decimal_nan_becomes_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
    }

    #[test]
    fn test_validate_line_item_bounds() {
        assert!(validate_line_item(&item(10.0, None, 1)).is_ok());
        assert!(validate_line_item(&item(-1.0, None, 1)).is_err());
        assert!(validate_line_item(&item(f64::NAN, None, 1)).is_err());
        assert!(validate_line_item(&item(10.0, None, 0)).is_err());
        assert!(validate_line_item(&item(10.0, None, 10_000)).is_err());
        assert!(validate_line_item(&item(MAX_PRICE + 1.0, None, 1)).is_err());
    }

    #[test]
    fn test_validate_discounted_price_never_above_list() {
        assert!(validate_line_item(&item(10.0, Some(12.0), 1)).is_err());
        assert!(validate_line_item(&item(10.0, Some(8.0), 1)).is_ok());
        assert!(validate_line_item(&item(10.0, Some(-1.0), 1)).is_err());
    }

    #[test]
    fn test_accumulation_precision() {
        // Sum 0.01 one thousand times
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }
}
