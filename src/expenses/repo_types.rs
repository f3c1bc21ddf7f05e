use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Fixed set of expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Rent,
    Transport,
    Groceries,
    Entertainment,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Rent,
        Category::Transport,
        Category::Groceries,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Rent => "Rent",
            Category::Transport => "Transport",
            Category::Groceries => "Groceries",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid category")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Ordering for expense listings. Both orders are descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    DateDesc,
    AmountDesc,
}

impl SortBy {
    /// Unknown or missing values fall back to `DateDesc`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some("amount_desc") => SortBy::AmountDesc,
            _ => SortBy::DateDesc,
        }
    }
}

/// Expense owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Row shape as stored; `category` is kept as text in the table.
#[derive(Debug, FromRow)]
pub struct ExpenseRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = UnknownCategory;

    fn try_from(r: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            owner_id: r.owner_id,
            description: r.description,
            amount: r.amount,
            category: r.category.parse()?,
            date: r.date,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Validated fields for a new expense. The owner comes from the caller's
/// identity, never from the request body.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub owner_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub date: OffsetDateTime,
}

/// Validated partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ExpenseChanges {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<Category>,
}

/// One row of the per-category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    #[serde(rename = "_id")]
    pub category: Category,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
}
