use crate::database::{
    conflict_on_unique_violation,
    model::user::{UserCredentialRow, UserRow},
    ConnectionPool,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::UserId,
    user::{
        event::{CreateUser, UpdateUserPassword},
        User,
    },
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
                SELECT user_id, user_name, email, role
                FROM users
                WHERE user_id = $1
            "#,
        )
        .bind(current_user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(User::try_from)
        .transpose()
    }

    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let user_id = UserId::new();
        let hashed_password = hash_password(&event.password).await?;
        let res = sqlx::query(
            r#"
                INSERT INTO users (user_id, user_name, email, password_hash, role)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(&event.user_name)
        .bind(&event.email)
        .bind(hashed_password)
        .bind(event.role.as_ref())
        .execute(self.db.inner_ref())
        .await
        .map_err(conflict_on_unique_violation(
            "user name or email already exists",
        ))?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No user has been created".into(),
            ));
        }

        Ok(User {
            user_id,
            user_name: event.user_name,
            email: event.email,
            role: event.role,
        })
    }

    async fn update_password(&self, event: UpdateUserPassword) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let original_password_hash: Option<String> = sqlx::query_scalar(
            r#"
                SELECT password_hash FROM users WHERE user_id = $1 FOR UPDATE
            "#,
        )
        .bind(event.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(original_password_hash) = original_password_hash else {
            return Err(AppError::EntityNotFound("user was not found".into()));
        };

        // 現在のパスワードが正しいかを確認する
        if !verify_password(&event.current_password, &original_password_hash).await? {
            return Err(AppError::UnauthenticatedError);
        }

        let new_password_hash = hash_password(&event.new_password).await?;
        sqlx::query("UPDATE users SET password_hash = $2 WHERE user_id = $1")
            .bind(event.user_id)
            .bind(new_password_hash)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn ensure_exists(&self, event: CreateUser) -> AppResult<User> {
        let existing = sqlx::query_as::<_, UserRow>(
            r#"
                SELECT user_id, user_name, email, role
                FROM users
                WHERE user_name = $1
            "#,
        )
        .bind(&event.user_name)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        match existing {
            Some(row) => User::try_from(row),
            None => self.create(event).await,
        }
    }
}

impl UserRepositoryImpl {
    // ログイン時の照合に使う
    pub(crate) async fn find_credential_by_name(
        &self,
        user_name: &str,
    ) -> AppResult<Option<(User, String)>> {
        sqlx::query_as::<_, UserCredentialRow>(
            r#"
                SELECT user_id, user_name, email, role, password_hash
                FROM users
                WHERE user_name = $1
            "#,
        )
        .bind(user_name)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(UserCredentialRow::into_user)
        .transpose()
    }
}

// Argon2 の計算は重いため、非同期ランタイムのワーカーを塞がないよう別スレッドで行う
pub(crate) async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::PasswordHashError(e.to_string()))
    })
    .await
    .map_err(|e| AppError::PasswordHashError(e.to_string()))?
}

pub(crate) async fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || {
        let parsed =
            PasswordHash::new(&hash).map_err(|e| AppError::PasswordHashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::PasswordHashError(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::role::Role;

    #[tokio::test]
    async fn password_hash_verifies_only_original() {
        let hash = hash_password("correct horse").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).await.unwrap());
        assert!(!verify_password("battery staple", &hash).await.unwrap());
    }

    #[sqlx::test]
    async fn test_create_and_update_password(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        let user = repo
            .create(CreateUser::new(
                "alice".into(),
                "alice@example.com".into(),
                "first-password".into(),
                Role::Student,
            ))
            .await?;
        let found = repo.find_current_user(user.user_id).await?;
        assert_eq!(found.as_ref(), Some(&user));

        // 同名の利用者は作成できない
        let dup = repo
            .create(CreateUser::new(
                "alice".into(),
                "other@example.com".into(),
                "pw".into(),
                Role::Student,
            ))
            .await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        let wrong = repo
            .update_password(UpdateUserPassword::new(
                user.user_id,
                "not-my-password".into(),
                "second-password".into(),
            ))
            .await;
        assert!(matches!(wrong, Err(AppError::UnauthenticatedError)));

        repo.update_password(UpdateUserPassword::new(
            user.user_id,
            "first-password".into(),
            "second-password".into(),
        ))
        .await?;

        let (_, hash) = repo
            .find_credential_by_name("alice")
            .await?
            .expect("alice exists");
        assert!(verify_password("second-password", &hash).await?);
        Ok(())
    }

    #[sqlx::test]
    async fn test_ensure_exists_is_idempotent(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));
        let event = || {
            CreateUser::new(
                "facility".into(),
                "facility@example.com".into(),
                "pw".into(),
                Role::Staff,
            )
        };
        let first = repo.ensure_exists(event()).await?;
        let second = repo.ensure_exists(event()).await?;
        assert_eq!(first, second);
        assert_eq!(second.role, Role::Staff);
        Ok(())
    }
}
