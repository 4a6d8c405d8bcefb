//! Budget entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::storage::StorageEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Quarterly => write!(f, "quarterly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(DomainError::validation(format!(
                "Invalid budget period: {}",
                other
            ))),
        }
    }
}

/// A spending cap for an organization, in USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub organization_id: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl StorageEntity for Budget {
    type Key = String;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

impl Budget {
    pub fn new(
        organization_id: impl Into<String>,
        amount: f64,
        period: BudgetPeriod,
    ) -> Result<Self, DomainError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DomainError::validation("Budget amount must be positive"));
        }

        Ok(Self {
            id: format!("budget-{}", uuid::Uuid::new_v4()),
            organization_id: organization_id.into(),
            amount,
            period,
            is_active: true,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parsing() {
        assert_eq!("MONTHLY".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Monthly);
        assert_eq!("quarterly".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Quarterly);
        assert!("fortnightly".parse::<BudgetPeriod>().is_err());
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(Budget::new("org1", 1000.0, BudgetPeriod::Monthly).is_ok());
        assert!(matches!(
            Budget::new("org1", 0.0, BudgetPeriod::Monthly),
            Err(DomainError::Validation { .. })
        ));
        assert!(Budget::new("org1", f64::NAN, BudgetPeriod::Monthly).is_err());
    }
}
