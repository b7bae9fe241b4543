use crate::model::{id::UserId, role::Role};

pub mod event;

pub struct AccessToken(pub String);

/// 検証済みトークンから取り出した利用者の身元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}
