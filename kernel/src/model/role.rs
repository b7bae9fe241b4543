use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Student,
    Lecturer,
    Staff,
}

impl Role {
    // 部屋の作成・変更・削除ができるのはスタッフのみ
    pub fn can_manage_rooms(self) -> bool {
        matches!(self, Role::Staff)
    }

    // 予約の承認・却下ができるロール
    pub fn can_resolve_bookings(self) -> bool {
        matches!(self, Role::Lecturer | Role::Staff)
    }
}
