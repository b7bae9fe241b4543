use super::parse_column;
use kernel::model::{id::UserId, user::User};
use shared::error::AppError;
use sqlx::FromRow;

#[derive(FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        let UserRow {
            user_id,
            user_name,
            email,
            role,
        } = value;
        Ok(User {
            user_id,
            user_name,
            email,
            role: parse_column("role", &role)?,
        })
    }
}

// ログイン時の照合に使う型
#[derive(FromRow)]
pub struct UserCredentialRow {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
}

impl UserCredentialRow {
    pub fn into_user(self) -> Result<(User, String), AppError> {
        let UserCredentialRow {
            user_id,
            user_name,
            email,
            role,
            password_hash,
        } = self;
        let user = User::try_from(UserRow {
            user_id,
            user_name,
            email,
            role,
        })?;
        Ok((user, password_hash))
    }
}
