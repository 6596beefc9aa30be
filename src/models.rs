pub mod auth;
pub mod collection;
pub mod dashboard;
pub mod farm;
pub mod finance;
pub mod stock;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use utoipa::IntoParams;
use validator::ValidationError;

pub const DEFAULT_LIST_LIMIT: i64 = 10;
pub const MAX_LIST_LIMIT: i64 = 500;

// Limites das colunas NUMERIC(10,2) e NUMERIC(12,2)
pub const MAX_EGG_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

fn check_money(val: &Decimal, max: Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if *val > max {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &max.to_string());
        err.message = Some(format!("O valor não pode passar de {}.", max).into());
        return Err(err);
    }
    Ok(())
}

/// Preço da dúzia: não negativo e dentro de NUMERIC(10,2).
pub fn validate_egg_price(val: &Decimal) -> Result<(), ValidationError> {
    check_money(val, MAX_EGG_PRICE)
}

/// Valor de movimentação financeira: não negativo e dentro de NUMERIC(12,2).
pub fn validate_amount(val: &Decimal) -> Result<(), ValidationError> {
    check_money(val, MAX_AMOUNT)
}

/// Campo de PATCH parcial: ausente vira `None` (via `#[serde(default)]`),
/// `null` vira `Some(None)` e valor vira `Some(Some(v))`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Valor final de um campo anulável num update parcial.
pub fn patched<'a>(patch: &'a Option<Option<String>>, current: &'a Option<String>) -> Option<&'a str> {
    match patch {
        Some(value) => value.as_deref(),
        None => current.as_deref(),
    }
}

/// `?limit=` das listagens. Ausente = 10, e nunca passa de 500.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn list_limit_defaults_and_clamps() {
        assert_eq!(ListQuery { limit: None }.limit(), 10);
        assert_eq!(ListQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(ListQuery { limit: Some(25) }.limit(), 25);
        assert_eq!(ListQuery { limit: Some(10_000) }.limit(), 500);
    }

    #[test]
    fn patched_keeps_clears_or_replaces() {
        let current = Some("antigo".to_string());
        assert_eq!(patched(&None, &current), Some("antigo"));
        assert_eq!(patched(&Some(None), &current), None);
        assert_eq!(patched(&Some(Some("novo".to_string())), &current), Some("novo"));
    }

    #[test]
    fn money_limits_match_the_columns() {
        assert_eq!(MAX_EGG_PRICE, dec!(99999999.99));
        assert_eq!(MAX_AMOUNT, dec!(9999999999.99));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(validate_amount(&dec!(0)).is_ok());
        assert!(validate_amount(&dec!(12.50)).is_ok());
        assert!(validate_amount(&dec!(-0.01)).is_err());
        assert!(validate_egg_price(&dec!(-0.01)).is_err());
    }

    #[test]
    fn amounts_beyond_the_column_are_rejected() {
        assert!(validate_egg_price(&dec!(99999999.99)).is_ok());
        assert!(validate_egg_price(&dec!(100000000)).is_err());
        assert!(validate_egg_price(&dec!(1000000000000)).is_err());
        assert!(validate_amount(&dec!(9999999999.99)).is_ok());
        assert!(validate_amount(&dec!(10000000000)).is_err());
    }
}
