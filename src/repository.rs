//! Storage contract for groups and their expenses

use crate::schemas::{Group, GroupExpense};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create_group(&self, group: &Group) -> Result<()>;

    async fn load_group(&self, group_id: &str) -> Result<Group>;

    async fn update_group(&self, group: &Group) -> Result<()>;

    /// Removes the group together with all of its expenses.
    async fn delete_group(&self, group_id: &str) -> Result<()>;

    /// Newest first.
    async fn load_group_expenses(&self, group_id: &str) -> Result<Vec<GroupExpense>>;

    async fn save_group_expense(&self, expense: &GroupExpense) -> Result<()>;

    async fn delete_group_expense(&self, group_id: &str, expense_id: &str) -> Result<()>;
}

#[derive(Debug, Default)]
struct Store {
    groups: HashMap<String, Group>,
    expenses: Vec<GroupExpense>,
}

/// Keeps everything in process memory. Used for local runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupRepository for InMemoryRepository {
    async fn create_group(&self, group: &Group) -> Result<()> {
        let mut store = self.store.write().await;
        if store.groups.contains_key(&group.id) {
            return Err(Error::Conflict(format!("group {} already exists", group.id)));
        }
        store.groups.insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn load_group(&self, group_id: &str) -> Result<Group> {
        self.store
            .read()
            .await
            .groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("group {}", group_id)))
    }

    async fn update_group(&self, group: &Group) -> Result<()> {
        let mut store = self.store.write().await;
        match store.groups.get_mut(&group.id) {
            Some(stored) => {
                *stored = group.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("group {}", group.id))),
        }
    }

    async fn delete_group(&self, group_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        if store.groups.remove(group_id).is_none() {
            return Err(Error::NotFound(format!("group {}", group_id)));
        }
        store.expenses.retain(|e| e.group_id != group_id);
        Ok(())
    }

    async fn load_group_expenses(&self, group_id: &str) -> Result<Vec<GroupExpense>> {
        let mut expenses: Vec<GroupExpense> = self
            .store
            .read()
            .await
            .expenses
            .iter()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenses)
    }

    async fn save_group_expense(&self, expense: &GroupExpense) -> Result<()> {
        let mut store = self.store.write().await;
        if !store.groups.contains_key(&expense.group_id) {
            return Err(Error::NotFound(format!("group {}", expense.group_id)));
        }
        store.expenses.push(expense.clone());
        Ok(())
    }

    async fn delete_group_expense(&self, group_id: &str, expense_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let before = store.expenses.len();
        store
            .expenses
            .retain(|e| !(e.group_id == group_id && e.id == expense_id));
        if store.expenses.len() == before {
            return Err(Error::NotFound(format!("expense {}", expense_id)));
        }
        Ok(())
    }
}
