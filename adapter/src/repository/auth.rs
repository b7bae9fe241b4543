use crate::{
    database::ConnectionPool,
    repository::user::{verify_password, UserRepositoryImpl},
};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use kernel::model::{
    auth::{event::CreateToken, AccessToken, Identity},
    id::UserId,
    role::Role,
    user::User,
};
use kernel::repository::auth::AuthRepository;
use serde::{Deserialize, Serialize};
use shared::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

// トークンのペイロード
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: UserId,
    role: Role,
    iat: i64,
    exp: i64,
}

pub struct AuthRepositoryImpl {
    users: UserRepositoryImpl,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: u64,
}

impl AuthRepositoryImpl {
    pub fn new(db: ConnectionPool, config: &AuthConfig) -> Self {
        Self {
            users: UserRepositoryImpl::new(db),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: config.ttl,
        }
    }
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn verify_user(&self, user_name: &str, password: &str) -> AppResult<User> {
        let Some((user, password_hash)) = self.users.find_credential_by_name(user_name).await?
        else {
            return Err(AppError::UnauthenticatedError);
        };
        if !verify_password(password, &password_hash).await? {
            return Err(AppError::UnauthenticatedError);
        }
        Ok(user)
    }

    async fn create_token(&self, event: CreateToken) -> AppResult<AccessToken> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: event.user_id,
            role: event.role,
            iat,
            exp: iat + self.ttl as i64,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map(AccessToken)
            .map_err(|e| AppError::TokenIssueError(e.to_string()))
    }

    async fn verify_token(&self, access_token: &AccessToken) -> AppResult<Identity> {
        let data = jsonwebtoken::decode::<Claims>(
            &access_token.0,
            &self.decoding_key,
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::UnauthorizedError,
        })?;
        Ok(Identity {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}
