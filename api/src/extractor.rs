use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use kernel::model::{
    auth::{AccessToken, Identity},
    id::UserId,
    role::Role,
};
use registry::AppRegistry;
use serde::Serialize;
use shared::error::{AppError, AppResult};

// axum の extractor を包み、不正なボディ・パス・クエリを AppError (400) として返す
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

// リクエストの前処理として、Bearer トークンを検証し利用者の身元を取り出す
// 身元は必ずトークンから取り、リクエストボディの値は使わない
pub struct AuthorizedUser {
    pub access_token: AccessToken,
    pub identity: Identity,
}

impl AuthorizedUser {
    pub fn id(&self) -> UserId {
        self.identity.user_id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn ensure_room_manager(&self) -> AppResult<()> {
        if self.role().can_manage_rooms() {
            Ok(())
        } else {
            Err(AppError::ForbiddenOperation)
        }
    }

    pub fn ensure_approver(&self) -> AppResult<()> {
        if self.role().can_resolve_bookings() {
            Ok(())
        } else {
            Err(AppError::ForbiddenOperation)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppRegistry> for AuthorizedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        // HTTP ヘッダからアクセストークンを取り出す
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::UnauthorizedError)?;
        let access_token = AccessToken(bearer.token().to_string());

        // 署名と有効期限を検証する
        let identity = registry
            .auth_repository()
            .verify_token(&access_token)
            .await?;

        Ok(Self {
            access_token,
            identity,
        })
    }
}
