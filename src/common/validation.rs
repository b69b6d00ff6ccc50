// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

// Validador customizado para valores monetários
pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// Nota de 0 a 5, com uma casa decimal
pub fn validate_rating(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO || *val > Decimal::from(5) {
        let mut err = ValidationError::new("range");
        err.message = Some("A avaliação deve estar entre 0 e 5.".into());
        return Err(err);
    }
    Ok(())
}

// Taxa de comissão como fração (0.40 = 40%)
pub fn validate_rate(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO || *val > Decimal::ONE {
        let mut err = ValidationError::new("range");
        err.message = Some("A taxa deve estar entre 0 e 1.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn negative_money_is_rejected() {
        assert!(validate_not_negative(&dec("-0.01")).is_err());
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&dec("35.00")).is_ok());
    }

    #[test]
    fn rating_and_rate_bounds() {
        assert!(validate_rating(&dec("4.8")).is_ok());
        assert!(validate_rating(&dec("5.1")).is_err());
        assert!(validate_rate(&dec("0.40")).is_ok());
        assert!(validate_rate(&dec("1.5")).is_err());
    }
}
