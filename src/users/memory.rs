use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AccountError, Result},
    users::{repo::UserStore, repo_types::UserAccount},
};

/// Process-local store with the same uniqueness rules as the `users` table.
#[derive(Default)]
pub struct InMemoryUserStore {
    rows: RwLock<HashMap<Uuid, UserAccount>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn check_unique(
    rows: &HashMap<Uuid, UserAccount>,
    account: &UserAccount,
    own_id: Option<Uuid>,
) -> Result<()> {
    for (id, row) in rows {
        if Some(*id) == own_id {
            continue;
        }
        if row.email == account.email {
            return Err(AccountError::Duplicate { field: "email" });
        }
        if row.username == account.username {
            return Err(AccountError::Duplicate { field: "username" });
        }
    }
    Ok(())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, account: &UserAccount) -> Result<Uuid> {
        let mut rows = self.rows.write().await;
        check_unique(&rows, account, None)?;
        let id = Uuid::new_v4();
        let mut row = account.clone();
        row.id = Some(id);
        rows.insert(id, row);
        Ok(id)
    }

    async fn update(&self, account: &UserAccount) -> Result<()> {
        let id = account.id.ok_or(AccountError::NotPersisted)?;
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&id) {
            return Err(AccountError::NotFound(id));
        }
        check_unique(&rows, account, Some(id))?;
        rows.insert(id, account.clone());
        Ok(())
    }
}
