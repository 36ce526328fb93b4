use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CATEGORY;
use crate::errors::ValidationError;

/// A single portfolio position.
///
/// The ingestion layer replaces the whole snapshot on every portfolio
/// update, so at most one live record exists per `coin_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub amount: Decimal,
    pub category: Option<String>,
}

impl Holding {
    /// Category label used for portfolio aggregation.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    /// Checks the record against the ingestion contract. A failing record
    /// is rejected individually; the rest of the batch still computes.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.coin_id.trim().is_empty() {
            return Err(ValidationError::MissingField("coin_id".to_string()));
        }
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }
        if self.amount.is_sign_negative() {
            return Err(ValidationError::InvalidInput(format!(
                "holding '{}' has a negative amount ({})",
                self.coin_id, self.amount
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn holding(coin_id: &str, amount: Decimal, category: Option<&str>) -> Holding {
        Holding {
            coin_id: coin_id.to_string(),
            symbol: "BTC".to_string(),
            name: "Bitcoin".to_string(),
            amount,
            category: category.map(|c| c.to_string()),
        }
    }

    #[test]
    fn test_category_defaults_to_other() {
        assert_eq!(holding("bitcoin", dec!(1), None).category_label(), "Other");
        assert_eq!(
            holding("bitcoin", dec!(1), Some("L1")).category_label(),
            "L1"
        );
    }

    #[test]
    fn test_validate_accepts_zero_amount() {
        assert!(holding("bitcoin", Decimal::ZERO, None).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_coin_id() {
        let err = holding("  ", dec!(1), None).validate().unwrap_err();
        assert!(matches!(err, ValidationError::MissingField(field) if field == "coin_id"));
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        let err = holding("bitcoin", dec!(-0.5), None).validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidInput(_)));
    }
}
