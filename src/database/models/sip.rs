use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Longest scheme label accepted on create.
pub const MAX_SCHEME_NAME_CHARS: usize = 100;

/// Upper bound of a `NUMERIC(10,2)` column: 99_999_999.99.
pub fn max_monthly_amount() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Row of the `sips` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SipPlan {
    pub id: Uuid,
    pub user_id: String,
    pub scheme_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_amount: Decimal,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /sips/`. `monthly_amount` accepts a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSipPlan {
    pub scheme_name: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub monthly_amount: Decimal,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid SIP plan")]
pub struct PlanValidationError {
    pub field_errors: HashMap<String, String>,
}

impl NewSipPlan {
    /// Check field constraints and round the amount to cents.
    pub fn validate(self) -> Result<Self, PlanValidationError> {
        let mut field_errors = HashMap::new();

        let name_len = self.scheme_name.chars().count();
        if self.scheme_name.trim().is_empty() {
            field_errors.insert("scheme_name".to_string(), "This field is required".to_string());
        } else if name_len > MAX_SCHEME_NAME_CHARS {
            field_errors.insert(
                "scheme_name".to_string(),
                format!("Must be at most {} characters", MAX_SCHEME_NAME_CHARS),
            );
        }

        let monthly_amount = self.monthly_amount.round_dp(2);
        if monthly_amount <= Decimal::ZERO {
            field_errors.insert("monthly_amount".to_string(), "Must be greater than 0".to_string());
        } else if monthly_amount > max_monthly_amount() {
            field_errors.insert(
                "monthly_amount".to_string(),
                format!("Must be at most {}", max_monthly_amount()),
            );
        }

        if !field_errors.is_empty() {
            return Err(PlanValidationError { field_errors });
        }

        Ok(Self {
            monthly_amount,
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn new_plan(name: &str, amount: &str) -> NewSipPlan {
        NewSipPlan {
            scheme_name: name.to_string(),
            monthly_amount: Decimal::from_str(amount).unwrap(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn max_amount_constant_matches_column() {
        assert_eq!(max_monthly_amount(), Decimal::from_str("99999999.99").unwrap());
    }

    #[test]
    fn valid_plan_is_rounded_to_cents() {
        let plan = new_plan("Axis Bluechip Fund", "7500.005").validate().unwrap();
        assert_eq!(plan.monthly_amount, Decimal::from_str("7500.00").unwrap());
        assert_eq!(plan.scheme_name, "Axis Bluechip Fund");
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        for amount in ["0", "-10", "0.004"] {
            let err = new_plan("A", amount).validate().unwrap_err();
            assert!(err.field_errors.contains_key("monthly_amount"), "amount {amount}");
        }
    }

    #[test]
    fn oversized_amount_is_rejected() {
        let err = new_plan("A", "100000000").validate().unwrap_err();
        assert!(err.field_errors.contains_key("monthly_amount"));
    }

    #[test]
    fn scheme_name_bounds() {
        assert!(new_plan("", "1").validate().is_err());
        assert!(new_plan("   ", "1").validate().is_err());
        assert!(new_plan(&"x".repeat(100), "1").validate().is_ok());

        let err = new_plan(&"x".repeat(101), "0").validate().unwrap_err();
        assert_eq!(err.field_errors.len(), 2);
    }

    #[test]
    fn request_body_accepts_number_or_string_amount() {
        let from_number: NewSipPlan = serde_json::from_value(serde_json::json!({
            "scheme_name": "A",
            "monthly_amount": 7500.0,
            "start_date": "2023-03-15"
        }))
        .unwrap();
        let from_string: NewSipPlan = serde_json::from_value(serde_json::json!({
            "scheme_name": "A",
            "monthly_amount": "7500.00",
            "start_date": "2023-03-15"
        }))
        .unwrap();
        assert_eq!(from_number.monthly_amount, from_string.monthly_amount);
    }

    #[test]
    fn plan_serializes_amount_as_number_and_iso_dates() {
        let now = Utc::now();
        let plan = SipPlan {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            scheme_name: "A".to_string(),
            monthly_amount: Decimal::from_str("7500.50").unwrap(),
            start_date: NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["monthly_amount"].as_f64(), Some(7500.5));
        assert_eq!(json["start_date"], "2023-03-15");
        assert!(json["created_at"].as_str().unwrap().contains('T'));
    }
}
