use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::users::repo::{Change, UserStore};
use crate::users::repo_types::User;

#[derive(Debug, Clone)]
struct Tables {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

/// In-process store. A commit is applied to a copy of the tables and only
/// swapped in once every change succeeded, so each commit costs O(n) in the
/// table size. Meant for development and tests, not large data sets.
#[derive(Debug)]
pub struct MemoryUserStore {
    tables: RwLock<Tables>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                users: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_all(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn commit(&self, changes: Vec<Change>) -> anyhow::Result<Vec<User>> {
        let mut guard = self.tables.write().await;
        let mut next = guard.clone();
        let mut persisted = Vec::new();

        for change in changes {
            match change {
                Change::Persist(mut user) => {
                    let id = match user.id {
                        Some(id) => {
                            anyhow::ensure!(
                                next.users.contains_key(&id),
                                "user {} vanished before commit",
                                id
                            );
                            id
                        }
                        None => {
                            let id = next.next_id;
                            next.next_id += 1;
                            user.id = Some(id);
                            id
                        }
                    };
                    next.users.insert(id, user.clone());
                    persisted.push(user);
                }
                Change::Remove(id) => {
                    anyhow::ensure!(
                        next.users.remove(&id).is_some(),
                        "user {} vanished before commit",
                        id
                    );
                }
            }
        }

        *guard = next;
        Ok(persisted)
    }
}
