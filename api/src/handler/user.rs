use crate::{
    extractor::{AuthorizedUser, Json},
    model::user::{
        CreateUserRequest, UpdateUserPasswordRequest, UpdateUserPasswordRequestWithUserId,
        UserResponse,
    },
};
use axum::{extract::State, http::StatusCode};
use garde::Validate;
use kernel::model::role::Role;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

// 講師アカウントはスタッフのみが作成できる
pub async fn register_lecturer(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    user.ensure_room_manager()?;
    req.validate()?;

    let registered_user = registry
        .user_repository()
        .create(req.into_event(Role::Lecturer))
        .await?;

    Ok((StatusCode::CREATED, Json(registered_user.into())))
}

pub async fn get_current_user(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UserResponse>> {
    registry
        .user_repository()
        .find_current_user(user.id())
        .await
        .and_then(|u| match u {
            Some(u) => Ok(Json(u.into())),
            None => Err(AppError::EntityNotFound("user not found".into())),
        })
}

pub async fn change_password(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserPasswordRequest>,
) -> AppResult<StatusCode> {
    req.validate()?;

    registry
        .user_repository()
        .update_password(UpdateUserPasswordRequestWithUserId(user.id(), req).into())
        .await
        .map(|_| StatusCode::OK)
}
