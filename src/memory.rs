//! In-process store used when no database is configured, and by tests.

use std::{cmp::Ordering, collections::HashMap};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::{CreateUserError, UserRepo},
        repo_types::{NewUser, User},
    },
    expenses::{
        repo::ExpenseRepo,
        repo_types::{
            Category, CategoryTotal, Expense, ExpenseChanges, ExpenseFilter, NewExpense, SortBy,
        },
    },
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    expenses: RwLock<HashMap<Uuid, Expense>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, CreateUserError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new.email) {
            return Err(CreateUserError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

fn compare(sort: SortBy, a: &Expense, b: &Expense) -> Ordering {
    let primary = match sort {
        SortBy::DateDesc => b.date.cmp(&a.date),
        SortBy::AmountDesc => b.amount.total_cmp(&a.amount),
    };
    primary.then_with(|| b.created_at.cmp(&a.created_at))
}

#[async_trait]
impl ExpenseRepo for MemoryStore {
    async fn insert(&self, new: NewExpense) -> anyhow::Result<Expense> {
        let now = OffsetDateTime::now_utc();
        let expense = Expense {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            description: new.description,
            amount: new.amount,
            category: new.category,
            date: new.date,
            created_at: now,
            updated_at: now,
        };
        self.expenses
            .write()
            .await
            .insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn list(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
        sort: SortBy,
    ) -> anyhow::Result<Vec<Expense>> {
        let expenses = self.expenses.read().await;
        let mut out: Vec<Expense> = expenses
            .values()
            .filter(|e| e.owner_id == owner_id)
            .filter(|e| filter.category.map_or(true, |c| e.category == c))
            .cloned()
            .collect();
        out.sort_by(|a, b| compare(sort, a, b));
        Ok(out)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> anyhow::Result<Option<Expense>> {
        let mut expenses = self.expenses.write().await;
        let Some(e) = expenses.get_mut(&id).filter(|e| e.owner_id == owner_id) else {
            return Ok(None);
        };
        if let Some(description) = changes.description {
            e.description = description;
        }
        if let Some(amount) = changes.amount {
            e.amount = amount;
        }
        if let Some(category) = changes.category {
            e.category = category;
        }
        if let Some(date) = changes.date {
            e.date = date;
        }
        e.updated_at = OffsetDateTime::now_utc();
        Ok(Some(e.clone()))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut expenses = self.expenses.write().await;
        match expenses.get(&id) {
            Some(e) if e.owner_id == owner_id => {
                expenses.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn category_totals(&self, owner_id: Uuid) -> anyhow::Result<Vec<CategoryTotal>> {
        let expenses = self.expenses.read().await;
        let mut totals: HashMap<Category, f64> = HashMap::new();
        for e in expenses.values().filter(|e| e.owner_id == owner_id) {
            *totals.entry(e.category).or_default() += e.amount;
        }
        let mut out: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, total_amount)| CategoryTotal {
                category,
                total_amount,
            })
            .collect();
        out.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
        Ok(out)
    }

    async fn grand_total(&self, owner_id: Uuid) -> anyhow::Result<f64> {
        let expenses = self.expenses.read().await;
        Ok(expenses
            .values()
            .filter(|e| e.owner_id == owner_id)
            .map(|e| e.amount)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn new_expense(owner_id: Uuid, amount: f64, category: Category, date: OffsetDateTime) -> NewExpense {
        NewExpense {
            owner_id,
            description: format!("{category} {amount}"),
            amount,
            category,
            date,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_at_store() {
        let store = MemoryStore::new();
        let new = NewUser {
            name: "Al".into(),
            email: "al@x.com".into(),
            password_hash: "hash".into(),
        };
        store.create(new.clone()).await.unwrap();
        let err = store.create(new).await.unwrap_err();
        assert!(matches!(err, CreateUserError::DuplicateEmail));
    }

    #[tokio::test]
    async fn list_sorts_descending() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store
            .insert(new_expense(owner, 5.0, Category::Food, datetime!(2024-01-03 0:00 UTC)))
            .await
            .unwrap();
        store
            .insert(new_expense(owner, 50.0, Category::Rent, datetime!(2024-01-01 0:00 UTC)))
            .await
            .unwrap();
        store
            .insert(new_expense(owner, 20.0, Category::Food, datetime!(2024-01-02 0:00 UTC)))
            .await
            .unwrap();

        let by_date = store
            .list(owner, &ExpenseFilter::default(), SortBy::DateDesc)
            .await
            .unwrap();
        let amounts: Vec<f64> = by_date.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![5.0, 20.0, 50.0]);

        let by_amount = store
            .list(owner, &ExpenseFilter::default(), SortBy::AmountDesc)
            .await
            .unwrap();
        let amounts: Vec<f64> = by_amount.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![50.0, 20.0, 5.0]);

        let food = store
            .list(
                owner,
                &ExpenseFilter {
                    category: Some(Category::Food),
                },
                SortBy::AmountDesc,
            )
            .await
            .unwrap();
        assert_eq!(food.len(), 2);
        assert!(food.iter().all(|e| e.category == Category::Food));
    }

    #[tokio::test]
    async fn totals_are_grouped_and_ordered() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let d = datetime!(2024-01-01 0:00 UTC);
        store.insert(new_expense(owner, 10.0, Category::Food, d)).await.unwrap();
        store.insert(new_expense(owner, 15.0, Category::Food, d)).await.unwrap();
        store.insert(new_expense(owner, 100.0, Category::Rent, d)).await.unwrap();
        store.insert(new_expense(owner, 3.5, Category::Transport, d)).await.unwrap();
        store.insert(new_expense(other, 999.0, Category::Food, d)).await.unwrap();

        let totals = store.category_totals(owner).await.unwrap();
        assert_eq!(
            totals,
            vec![
                CategoryTotal { category: Category::Rent, total_amount: 100.0 },
                CategoryTotal { category: Category::Food, total_amount: 25.0 },
                CategoryTotal { category: Category::Transport, total_amount: 3.5 },
            ]
        );
        assert_eq!(store.grand_total(owner).await.unwrap(), 128.5);
        assert_eq!(store.grand_total(Uuid::new_v4()).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn update_keeps_owner_and_unchanged_fields() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let e = store
            .insert(new_expense(owner, 10.0, Category::Food, datetime!(2024-01-01 0:00 UTC)))
            .await
            .unwrap();
        let updated = store
            .update(
                owner,
                e.id,
                ExpenseChanges {
                    amount: Some(11.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.owner_id, owner);
        assert_eq!(updated.amount, 11.0);
        assert_eq!(updated.description, e.description);
        assert_eq!(updated.category, Category::Food);
        assert!(updated.updated_at >= e.updated_at);
    }
}
