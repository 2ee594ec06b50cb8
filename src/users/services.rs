use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::users::{
    dto::UserPayload,
    error::UserError,
    repo::{UnitOfWork, UserStore},
    repo_types::User,
    validator::UserValidator,
};

/// The five user operations, independent of HTTP.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    validator: Arc<dyn UserValidator>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, validator: Arc<dyn UserValidator>) -> Self {
        Self { store, validator }
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<User>, UserError> {
        self.store.find_all().await.map_err(unexpected)
    }

    #[instrument(skip(self))]
    pub async fn find(&self, id: i64) -> Result<User, UserError> {
        self.load(id).await
    }

    /// Returns the stored user with its new id.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: UserPayload) -> Result<User, UserError> {
        let mut user = User::new();
        user.apply(payload.name, payload.email);
        self.check(&user)?;

        let mut uow = UnitOfWork::new(self.store.as_ref());
        uow.persist(user);
        let user = uow
            .flush()
            .await
            .map_err(unexpected)?
            .into_iter()
            .next()
            .ok_or_else(|| UserError::from(anyhow::anyhow!("commit returned no user")))?;

        info!(user_id = ?user.id, "user created");
        Ok(user)
    }

    /// The body is only inspected once the user exists, so an unknown id
    /// wins over a malformed body.
    #[instrument(skip(self, payload))]
    pub async fn update(
        &self,
        id: i64,
        payload: Result<UserPayload, UserError>,
    ) -> Result<User, UserError> {
        let mut user = self.load(id).await?;
        let payload = payload?;
        user.apply(payload.name, payload.email);
        self.check(&user)?;

        let mut uow = UnitOfWork::new(self.store.as_ref());
        uow.persist(user.clone());
        uow.flush().await.map_err(unexpected)?;

        info!(user_id = id, "user updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), UserError> {
        let user = self.load(id).await?;

        let mut uow = UnitOfWork::new(self.store.as_ref());
        uow.remove(&user);
        uow.flush().await.map_err(unexpected)?;

        info!(user_id = id, "user deleted");
        Ok(())
    }

    async fn load(&self, id: i64) -> Result<User, UserError> {
        match self.store.find(id).await.map_err(unexpected)? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = id, "user not found");
                Err(UserError::NotFound)
            }
        }
    }

    fn check(&self, user: &User) -> Result<(), UserError> {
        let violations = self.validator.validate(user);
        if violations.is_empty() {
            return Ok(());
        }
        warn!(violations = violations.len(), "user failed validation");
        Err(UserError::Validation(violations))
    }
}

fn unexpected(e: anyhow::Error) -> UserError {
    error!(error = %format!("{:#}", e), "user store failure");
    UserError::Unexpected(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::{memory::MemoryUserStore, repo::Change, validator::ConstraintValidator};

    fn service() -> (UserService, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::new());
        let svc = UserService::new(store.clone(), Arc::new(ConstraintValidator));
        (svc, store)
    }

    fn payload(name: Option<&str>, email: Option<&str>) -> UserPayload {
        UserPayload {
            name: name.map(Into::into),
            email: email.map(Into::into),
        }
    }

    #[tokio::test]
    async fn create_then_find_returns_same_fields() {
        let (svc, _) = service();
        let created = svc
            .create(payload(Some("Alice"), Some("alice@example.com")))
            .await
            .unwrap();
        let id = created.id.unwrap();

        let found = svc.find(id).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn invalid_create_stores_nothing() {
        let (svc, store) = service();
        let err = svc
            .create(payload(Some("Alice"), Some("not-an-email")))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn invalid_update_keeps_stored_values() {
        let (svc, _) = service();
        let id = svc
            .create(payload(Some("Alice"), Some("alice@example.com")))
            .await
            .unwrap()
            .id
            .unwrap();

        let err = svc.update(id, Ok(payload(None, Some("broken")))).await.unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
        assert_eq!(
            svc.find(id).await.unwrap().email.as_deref(),
            Some("alice@example.com")
        );
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (svc, _) = service();
        assert!(matches!(svc.delete(3).await, Err(UserError::NotFound)));
    }

    #[tokio::test]
    async fn unknown_id_wins_over_bad_body() {
        let (svc, _) = service();
        let err = svc
            .update(9, Err(UserError::BadRequest("bad body".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }

    #[tokio::test]
    async fn bad_body_for_existing_user_is_reported() {
        let (svc, _) = service();
        let id = svc
            .create(payload(Some("Alice"), Some("alice@example.com")))
            .await
            .unwrap()
            .id
            .unwrap();
        let err = svc
            .update(id, Err(UserError::BadRequest("bad body".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::BadRequest(_)));
    }

    /// Lookups succeed but the row is gone by the time the batch commits.
    struct VanishingStore;

    #[async_trait::async_trait]
    impl UserStore for VanishingStore {
        async fn find_all(&self) -> anyhow::Result<Vec<User>> {
            Ok(Vec::new())
        }
        async fn find(&self, id: i64) -> anyhow::Result<Option<User>> {
            Ok(Some(User {
                id: Some(id),
                name: Some("Alice".into()),
                email: Some("alice@example.com".into()),
            }))
        }
        async fn commit(&self, _changes: Vec<Change>) -> anyhow::Result<Vec<User>> {
            anyhow::bail!("user vanished before commit")
        }
    }

    fn vanishing_service() -> UserService {
        UserService::new(Arc::new(VanishingStore), Arc::new(ConstraintValidator))
    }

    #[tokio::test]
    async fn update_of_vanished_row_is_unexpected() {
        let err = vanishing_service()
            .update(5, Ok(payload(Some("Alicia"), None)))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Unexpected(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn delete_of_vanished_row_is_unexpected() {
        let err = vanishing_service().delete(5).await.unwrap_err();
        assert!(matches!(err, UserError::Unexpected(_)));
        assert_eq!(err.to_string(), "user vanished before commit");
    }
}
