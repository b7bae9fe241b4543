use garde::Validate;
use kernel::model::{
    id::UserId,
    role::Role,
    user::{
        event::{CreateUser, UpdateUserPassword},
        User,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            user_name,
            email,
            role,
        } = value;
        Self {
            user_id,
            user_name,
            email,
            role,
        }
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[garde(length(min = 1, max = 255))]
    pub user_name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 8))]
    pub password: String,
    #[garde(matches(password))]
    pub confirm_password: String,
}

impl CreateUserRequest {
    pub fn into_event(self, role: Role) -> CreateUser {
        let CreateUserRequest {
            user_name,
            email,
            password,
            ..
        } = self;
        CreateUser::new(user_name, email, password, role)
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPasswordRequest {
    #[garde(length(min = 1))]
    pub current_password: String,
    #[garde(length(min = 8))]
    pub new_password: String,
}

pub struct UpdateUserPasswordRequestWithUserId(pub UserId, pub UpdateUserPasswordRequest);

impl From<UpdateUserPasswordRequestWithUserId> for UpdateUserPassword {
    fn from(value: UpdateUserPasswordRequestWithUserId) -> Self {
        let UpdateUserPasswordRequestWithUserId(
            user_id,
            UpdateUserPasswordRequest {
                current_password,
                new_password,
            },
        ) = value;
        UpdateUserPassword::new(user_id, current_password, new_password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_matching_confirmation() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"userName":"alice","email":"alice@example.com","password":"password1","confirmPassword":"password2"}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn register_role_is_chosen_by_caller() {
        // ボディの role は受け付けない
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"userName":"alice","email":"alice@example.com","password":"password1","confirmPassword":"password1","role":"staff"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        let event = req.into_event(Role::Student);
        assert_eq!(event.role, Role::Student);
    }

    #[test]
    fn short_new_password_is_invalid() {
        let req: UpdateUserPasswordRequest =
            serde_json::from_str(r#"{"currentPassword":"password1","newPassword":"short"}"#)
                .unwrap();
        assert!(req.validate().is_err());
    }
}
