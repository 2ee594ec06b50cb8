use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::users::repo_types::User;

/// A staged mutation waiting for the next flush.
#[derive(Debug, Clone)]
pub enum Change {
    Persist(User),
    Remove(i64),
}

/// Persistence collaborator behind the user resource.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Every user, ordered by id.
    async fn find_all(&self) -> anyhow::Result<Vec<User>>;

    async fn find(&self, id: i64) -> anyhow::Result<Option<User>>;

    /// Apply all changes atomically. Returns the persisted users, in the
    /// order they were staged, with their ids assigned.
    async fn commit(&self, changes: Vec<Change>) -> anyhow::Result<Vec<User>>;
}

/// Collects persist/remove calls and writes them in one commit.
pub struct UnitOfWork<'a> {
    store: &'a dyn UserStore,
    staged: Vec<Change>,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(store: &'a dyn UserStore) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    pub fn persist(&mut self, user: User) {
        self.staged.push(Change::Persist(user));
    }

    /// Users that were never flushed have nothing to remove.
    pub fn remove(&mut self, user: &User) {
        if let Some(id) = user.id {
            self.staged.push(Change::Remove(id));
        }
    }

    pub async fn flush(self) -> anyhow::Result<Vec<User>> {
        if self.staged.is_empty() {
            return Ok(Vec::new());
        }
        self.store.commit(self.staged).await
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_all(&self) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("select users")?;
        Ok(users)
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("select user {}", id))?;
        Ok(user)
    }

    async fn commit(&self, changes: Vec<Change>) -> anyhow::Result<Vec<User>> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        let mut persisted = Vec::new();
        for change in changes {
            match change {
                Change::Persist(user) => persisted.push(save_tx(&mut tx, &user).await?),
                Change::Remove(id) => delete_tx(&mut tx, id).await?,
            }
        }
        tx.commit().await.context("commit tx")?;
        debug!(persisted = persisted.len(), "user changes committed");
        Ok(persisted)
    }
}

async fn save_tx(tx: &mut Transaction<'_, Postgres>, user: &User) -> anyhow::Result<User> {
    match user.id {
        None => sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&mut **tx)
        .await
        .context("insert user"),
        Some(id) => sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name = $2, email = $3
             WHERE id = $1
            RETURNING id, name, email
            "#,
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.email)
        .fetch_optional(&mut **tx)
        .await
        .with_context(|| format!("update user {}", id))?
        .ok_or_else(|| anyhow::anyhow!("user {} vanished before commit", id)),
    }
}

async fn delete_tx(tx: &mut Transaction<'_, Postgres>, id: i64) -> anyhow::Result<()> {
    let res = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
        .bind(id)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("delete user {}", id))?;
    anyhow::ensure!(res.rows_affected() == 1, "user {} vanished before commit", id);
    Ok(())
}
