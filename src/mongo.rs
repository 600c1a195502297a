use crate::config::MongoConfig;
use crate::repository::GroupRepository;
use crate::schemas::{Group, GroupExpense};
use crate::{Error, Result};
use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{Client, Collection};

const GROUPS: &str = "groups";
const GROUP_EXPENSES: &str = "group_expenses";

#[derive(Clone, Debug)]
pub struct MongoRepository {
    client: Client,
    database: String,
}

impl MongoRepository {
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri).await?;
        Ok(Self::new(client, config.database.clone()))
    }

    pub fn new(client: Client, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    fn groups(&self) -> Collection<Group> {
        self.client.database(&self.database).collection(GROUPS)
    }

    fn expenses(&self) -> Collection<GroupExpense> {
        self.client.database(&self.database).collection(GROUP_EXPENSES)
    }
}

#[async_trait]
impl GroupRepository for MongoRepository {
    async fn create_group(&self, group: &Group) -> Result<()> {
        let groups = self.groups();
        if groups.find_one(doc! { "id": group.id.as_str() }, None).await?.is_some() {
            return Err(Error::Conflict(format!("group {} already exists", group.id)));
        }
        groups.insert_one(group, None).await?;
        Ok(())
    }

    async fn load_group(&self, group_id: &str) -> Result<Group> {
        self.groups()
            .find_one(doc! { "id": group_id }, None)
            .await?
            .ok_or_else(|| Error::NotFound(format!("group {}", group_id)))
    }

    async fn update_group(&self, group: &Group) -> Result<()> {
        let result = self
            .groups()
            .replace_one(doc! { "id": group.id.as_str() }, group, None)
            .await?;
        if result.matched_count == 0 {
            return Err(Error::NotFound(format!("group {}", group.id)));
        }
        Ok(())
    }

    async fn delete_group(&self, group_id: &str) -> Result<()> {
        let result = self.groups().delete_one(doc! { "id": group_id }, None).await?;
        if result.deleted_count == 0 {
            return Err(Error::NotFound(format!("group {}", group_id)));
        }
        let removed = self
            .expenses()
            .delete_many(doc! { "groupId": group_id }, None)
            .await?;
        tracing::info!(
            group_id,
            expenses = removed.deleted_count,
            "Deleted group and its expenses"
        );
        Ok(())
    }

    async fn load_group_expenses(&self, group_id: &str) -> Result<Vec<GroupExpense>> {
        let options = FindOptions::builder().sort(doc! { "date": -1 }).build();
        let cursor = self
            .expenses()
            .find(doc! { "groupId": group_id }, options)
            .await?;
        let expenses: Vec<GroupExpense> = cursor.try_collect().await?;
        Ok(expenses)
    }

    async fn save_group_expense(&self, expense: &GroupExpense) -> Result<()> {
        self.expenses().insert_one(expense, None).await?;
        Ok(())
    }

    async fn delete_group_expense(&self, group_id: &str, expense_id: &str) -> Result<()> {
        let result = self
            .expenses()
            .delete_one(doc! { "groupId": group_id, "id": expense_id }, None)
            .await?;
        if result.deleted_count == 0 {
            return Err(Error::NotFound(format!("expense {}", expense_id)));
        }
        Ok(())
    }
}
