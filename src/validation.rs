// Validation utilities module
// Provides custom validation functions for domain-specific rules

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validates that a monetary amount is strictly positive
pub fn validate_positive_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        Err(ValidationError::new("amount_must_be_positive"))
    } else {
        Ok(())
    }
}

/// Validates that a monetary amount is zero or more
pub fn validate_non_negative_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        Err(ValidationError::new("amount_must_not_be_negative"))
    } else {
        Ok(())
    }
}

/// Validates that a size multiplier is zero or more
pub fn validate_price_multiplier(multiplier: Decimal) -> Result<(), ValidationError> {
    if multiplier < Decimal::ZERO {
        Err(ValidationError::new("multiplier_must_not_be_negative"))
    } else {
        Ok(())
    }
}

/// Validates that a percentage discount stays within 0-100
pub fn validate_percentage(value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > Decimal::from(100) {
        Err(ValidationError::new("percentage_out_of_range"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_positive_amount_rejects_zero() {
        assert!(validate_positive_amount(Decimal::ZERO).is_err());
        assert!(validate_positive_amount(dec!(-1.00)).is_err());
        assert!(validate_positive_amount(dec!(0.01)).is_ok());
    }

    #[test]
    fn test_non_negative_amount_accepts_zero() {
        assert!(validate_non_negative_amount(Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(dec!(-0.01)).is_err());
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(validate_percentage(Decimal::ZERO).is_ok());
        assert!(validate_percentage(dec!(100)).is_ok());
        assert!(validate_percentage(dec!(100.01)).is_err());
        assert!(validate_percentage(dec!(-5)).is_err());
    }
}
