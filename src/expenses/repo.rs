use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::expenses::repo_types::{
    CategoryTotal, Expense, ExpenseChanges, ExpenseFilter, ExpenseRow, NewExpense, SortBy,
};

/// Expense persistence. Every read and write is scoped to `owner_id`; a record
/// owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait ExpenseRepo: Send + Sync {
    async fn insert(&self, expense: NewExpense) -> anyhow::Result<Expense>;

    async fn list(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
        sort: SortBy,
    ) -> anyhow::Result<Vec<Expense>>;

    /// `None` when no expense matches both `id` and `owner_id`.
    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> anyhow::Result<Option<Expense>>;

    /// `false` when no expense matches both `id` and `owner_id`.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    /// Sum of amounts per category, largest first.
    async fn category_totals(&self, owner_id: Uuid) -> anyhow::Result<Vec<CategoryTotal>>;

    /// Sum of all amounts; zero when the owner has no expenses.
    async fn grand_total(&self, owner_id: Uuid) -> anyhow::Result<f64>;
}

#[derive(Clone)]
pub struct PgExpenseRepo {
    db: PgPool,
}

impl PgExpenseRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_expense(row: ExpenseRow) -> anyhow::Result<Expense> {
    let id = row.id;
    Expense::try_from(row).with_context(|| format!("expense {id} has an unknown category"))
}

#[async_trait]
impl ExpenseRepo for PgExpenseRepo {
    async fn insert(&self, e: NewExpense) -> anyhow::Result<Expense> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            INSERT INTO expenses (owner_id, description, amount, category, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, description, amount, category, date, created_at, updated_at
            "#,
        )
        .bind(e.owner_id)
        .bind(&e.description)
        .bind(e.amount)
        .bind(e.category.as_str())
        .bind(e.date)
        .fetch_one(&self.db)
        .await
        .context("insert expense")?;
        into_expense(row)
    }

    async fn list(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
        sort: SortBy,
    ) -> anyhow::Result<Vec<Expense>> {
        // Only two fixed ORDER BY clauses exist, both chosen here.
        let order_by = match sort {
            SortBy::DateDesc => "date DESC, created_at DESC",
            SortBy::AmountDesc => "amount DESC, created_at DESC",
        };
        let sql = format!(
            r#"
            SELECT id, owner_id, description, amount, category, date, created_at, updated_at
              FROM expenses
             WHERE owner_id = $1
               AND ($2::text IS NULL OR category = $2)
             ORDER BY {order_by}
            "#
        );
        let rows = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(owner_id)
            .bind(filter.category.map(|c| c.as_str()))
            .fetch_all(&self.db)
            .await
            .context("list expenses")?;
        rows.into_iter().map(into_expense).collect()
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> anyhow::Result<Option<Expense>> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            UPDATE expenses
               SET description = COALESCE($3, description),
                   amount      = COALESCE($4, amount),
                   category    = COALESCE($5, category),
                   date        = COALESCE($6, date),
                   updated_at  = now()
             WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, description, amount, category, date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(changes.description)
        .bind(changes.amount)
        .bind(changes.category.map(|c| c.as_str()))
        .bind(changes.date)
        .fetch_optional(&self.db)
        .await
        .context("update expense")?;
        row.map(into_expense).transpose()
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM expenses WHERE id = $1 AND owner_id = $2"#)
            .bind(id)
            .bind(owner_id)
            .execute(&self.db)
            .await
            .context("delete expense")?;
        Ok(res.rows_affected() > 0)
    }

    async fn category_totals(&self, owner_id: Uuid) -> anyhow::Result<Vec<CategoryTotal>> {
        let rows = sqlx::query_as::<_, (String, f64)>(
            r#"
            SELECT category, SUM(amount)::float8 AS total_amount
              FROM expenses
             WHERE owner_id = $1
             GROUP BY category
             ORDER BY total_amount DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await
        .context("category totals")?;

        rows.into_iter()
            .map(|(category, total_amount)| -> anyhow::Result<CategoryTotal> {
                Ok(CategoryTotal {
                    category: category.parse()?,
                    total_amount,
                })
            })
            .collect()
    }

    async fn grand_total(&self, owner_id: Uuid) -> anyhow::Result<f64> {
        let total: f64 = sqlx::query_scalar(
            r#"SELECT COALESCE(SUM(amount), 0)::float8 FROM expenses WHERE owner_id = $1"#,
        )
        .bind(owner_id)
        .fetch_one(&self.db)
        .await
        .context("grand total")?;
        Ok(total)
    }
}
