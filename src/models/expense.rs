//! Expense record model.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The fixed set of expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Office supplies and equipment.
    Office,
    /// Travel.
    Travel,
    /// Meals and entertainment.
    Meals,
    /// Utilities.
    Utilities,
    /// Marketing and advertising.
    Marketing,
    /// Software subscriptions.
    Software,
    /// Rent.
    Rent,
    /// Insurance.
    Insurance,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Returns the wire name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseCategory::Office => "office",
            ExpenseCategory::Travel => "travel",
            ExpenseCategory::Meals => "meals",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Marketing => "marketing",
            ExpenseCategory::Software => "software",
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Insurance => "insurance",
            ExpenseCategory::Other => "other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A business expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier.
    pub id: String,
    /// Expense category.
    pub category: ExpenseCategory,
    /// Amount spent.
    pub amount: Decimal,
    /// The date the expense was incurred.
    pub date: NaiveDate,
    /// What the money was spent on.
    pub description: String,
    /// Who was paid.
    #[serde(default)]
    pub vendor: Option<String>,
}

impl ExpenseRecord {
    /// Checks the id, description and amount.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: &str| EngineError::InvalidExpense {
            expense_id: self.id.clone(),
            message: message.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(invalid("description must not be empty"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(invalid("amount must be greater than zero"));
        }
        Ok(())
    }
}
