use crate::model::{id::UserId, role::Role};
use derive_new::new;

#[derive(new)]
pub struct CreateToken {
    pub user_id: UserId,
    pub role: Role,
}
