//! Expense operations, always scoped to the authenticated caller.

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    expenses::{
        dto::{parse_date, CreateExpenseRequest, ListQuery, SummaryResponse, UpdateExpenseRequest},
        repo::ExpenseRepo,
        repo_types::{Category, Expense, ExpenseChanges, ExpenseFilter, NewExpense, SortBy},
    },
};

pub const MIN_AMOUNT: f64 = 0.01;
/// Keeps per-user sums finite.
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

fn check_description(raw: &str) -> ApiResult<String> {
    let description = raw.trim();
    if description.is_empty() {
        return Err(ApiError::validation("description", "Description is required"));
    }
    Ok(description.to_string())
}

fn check_amount(amount: f64) -> ApiResult<f64> {
    if !amount.is_finite() || amount < MIN_AMOUNT {
        return Err(ApiError::validation("amount", "Amount must be positive"));
    }
    if amount > MAX_AMOUNT {
        return Err(ApiError::validation(
            "amount",
            format!("Amount must not exceed {MAX_AMOUNT}"),
        ));
    }
    Ok(amount)
}

fn check_category(raw: &str) -> ApiResult<Category> {
    raw.parse::<Category>()
        .map_err(|e| ApiError::validation("category", e.to_string()))
}

fn check_date(raw: &str) -> ApiResult<Option<OffsetDateTime>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date(raw)
        .map(Some)
        .ok_or_else(|| ApiError::validation("date", "Date is invalid"))
}

/// Validates in field order and reports the first failure.
pub fn validate_new(owner_id: Uuid, req: CreateExpenseRequest) -> ApiResult<NewExpense> {
    let description = check_description(req.description.as_deref().unwrap_or_default())?;
    let amount = req
        .amount
        .ok_or_else(|| ApiError::validation("amount", "Amount is required"))
        .and_then(check_amount)?;
    let category = match req.category.as_deref() {
        None | Some("") => return Err(ApiError::validation("category", "Category is required")),
        Some(raw) => check_category(raw)?,
    };
    let date = match req.date.as_deref() {
        Some(raw) => check_date(raw)?,
        None => None,
    }
    .unwrap_or_else(OffsetDateTime::now_utc);

    Ok(NewExpense {
        owner_id,
        description,
        amount,
        category,
        date,
    })
}

/// Same field rules as creation, applied only to the fields present.
pub fn validate_changes(req: UpdateExpenseRequest) -> ApiResult<ExpenseChanges> {
    Ok(ExpenseChanges {
        description: req.description.as_deref().map(check_description).transpose()?,
        amount: req.amount.map(check_amount).transpose()?,
        category: req.category.as_deref().map(check_category).transpose()?,
        date: match req.date.as_deref() {
            Some(raw) => check_date(raw)?,
            None => None,
        },
    })
}

/// Path ids that are not UUIDs cannot name any expense.
pub fn parse_expense_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

pub async fn create(
    repo: &dyn ExpenseRepo,
    owner_id: Uuid,
    req: CreateExpenseRequest,
) -> ApiResult<Expense> {
    let new = validate_new(owner_id, req)?;
    let expense = repo.insert(new).await?;
    info!(user_id = %owner_id, expense_id = %expense.id, "expense created");
    Ok(expense)
}

pub async fn list(
    repo: &dyn ExpenseRepo,
    owner_id: Uuid,
    query: ListQuery,
) -> ApiResult<Vec<Expense>> {
    let sort = SortBy::parse_lenient(query.sort_by.as_deref());
    let filter = match query.category.as_deref().map(str::trim) {
        None | Some("") => ExpenseFilter::default(),
        Some(raw) => match raw.parse::<Category>() {
            Ok(category) => ExpenseFilter {
                category: Some(category),
            },
            // No stored expense can carry an unknown category.
            Err(_) => return Ok(Vec::new()),
        },
    };
    let expenses = repo.list(owner_id, &filter, sort).await?;
    debug!(user_id = %owner_id, count = expenses.len(), ?sort, "expenses listed");
    Ok(expenses)
}

pub async fn update(
    repo: &dyn ExpenseRepo,
    owner_id: Uuid,
    expense_id: &str,
    req: UpdateExpenseRequest,
) -> ApiResult<Expense> {
    let id = parse_expense_id(expense_id)?;
    let changes = validate_changes(req)?;
    let expense = repo
        .update(owner_id, id, changes)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(user_id = %owner_id, expense_id = %id, "expense updated");
    Ok(expense)
}

pub async fn delete(repo: &dyn ExpenseRepo, owner_id: Uuid, expense_id: &str) -> ApiResult<()> {
    let id = parse_expense_id(expense_id)?;
    if !repo.delete(owner_id, id).await? {
        return Err(ApiError::NotFound);
    }
    info!(user_id = %owner_id, expense_id = %id, "expense deleted");
    Ok(())
}

pub async fn summary(repo: &dyn ExpenseRepo, owner_id: Uuid) -> ApiResult<SummaryResponse> {
    let category_breakdown = repo.category_totals(owner_id).await?;
    let grand_total = repo.grand_total(owner_id).await?;
    let all_finite = grand_total.is_finite()
        && category_breakdown.iter().all(|t| t.total_amount.is_finite());
    if !all_finite {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "non-finite expense total for user {owner_id}"
        )));
    }
    Ok(SummaryResponse {
        category_breakdown,
        grand_total,
    })
}
