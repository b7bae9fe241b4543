use crate::model::{
    auth::{event::CreateToken, AccessToken, Identity},
    user::User,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait AuthRepository: Send + Sync {
    // 利用者名とパスワードを照合する
    async fn verify_user(&self, user_name: &str, password: &str) -> AppResult<User>;
    // 署名付きのアクセストークンを発行する
    async fn create_token(&self, event: CreateToken) -> AppResult<AccessToken>;
    // アクセストークンを検証し、身元を取り出す
    async fn verify_token(&self, access_token: &AccessToken) -> AppResult<Identity>;
}
