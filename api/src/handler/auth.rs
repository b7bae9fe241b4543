use crate::{
    extractor::Json,
    model::{
        auth::{AccessTokenResponse, LoginRequest},
        user::{CreateUserRequest, UserResponse},
    },
};
use axum::{extract::State, http::StatusCode};
use garde::Validate;
use kernel::model::{auth::event::CreateToken, role::Role};
use registry::AppRegistry;
use shared::error::AppResult;

// 自己登録できるのは学生のみ
pub async fn register(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    let registered_user = registry
        .user_repository()
        .create(req.into_event(Role::Student))
        .await?;

    Ok((StatusCode::CREATED, Json(registered_user.into())))
}

pub async fn login(
    State(registry): State<AppRegistry>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AccessTokenResponse>> {
    req.validate()?;

    let user = registry
        .auth_repository()
        .verify_user(&req.user_name, &req.password)
        .await?;
    let access_token = registry
        .auth_repository()
        .create_token(CreateToken::new(user.user_id, user.role))
        .await?;

    Ok(Json(AccessTokenResponse {
        user_id: user.user_id,
        role: user.role,
        access_token: access_token.0,
    }))
}
