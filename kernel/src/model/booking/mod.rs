use crate::model::{
    id::{BookingId, RoomId, SlotId, UserId},
    role::Role,
    slot::SlotPeriod,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use strum::{AsRefStr, EnumString};

pub mod event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

impl BookingStatus {
    /// 同じ日・同じ枠（または同じ利用者）に対して同時にひとつしか存在できない状態
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Approved)
    }

    /// 承認・却下の遷移を行う。`Pending` 以外からは遷移できない。
    pub fn resolve(self, resolution: &Resolution) -> AppResult<BookingStatus> {
        match self {
            BookingStatus::Pending => Ok(resolution.status()),
            other => Err(AppError::Conflict(format!(
                "booking has already been processed ({})",
                other.as_ref()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    #[serde(alias = "approved")]
    Approve,
    #[serde(alias = "rejected")]
    Reject,
}

/// 承認・却下の内容。却下には必ず理由が付き、承認には理由が付かない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Approve,
    Reject { reason: String },
}

impl Resolution {
    pub fn new(action: BookingAction, reason: Option<String>) -> AppResult<Self> {
        match action {
            // 承認時に渡された理由は破棄する
            BookingAction::Approve => Ok(Resolution::Approve),
            BookingAction::Reject => match reason.map(|r| r.trim().to_string()) {
                Some(reason) if !reason.is_empty() => Ok(Resolution::Reject { reason }),
                _ => Err(AppError::InvalidInput(
                    "a reason is required to reject a booking".into(),
                )),
            },
        }
    }

    pub fn status(&self) -> BookingStatus {
        match self {
            Resolution::Approve => BookingStatus::Approved,
            Resolution::Reject { .. } => BookingStatus::Rejected,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Resolution::Approve => None,
            Resolution::Reject { reason } => Some(reason),
        }
    }
}

/// 承認者がその予約を処理できるかを判定する。
/// 講師はすべての保留中予約を、スタッフは自身が所有する部屋の予約を処理できる。
pub fn ensure_can_resolve(approver_id: UserId, role: Role, room_owner: UserId) -> AppResult<()> {
    match role {
        Role::Lecturer => Ok(()),
        Role::Staff if room_owner == approver_id => Ok(()),
        _ => Err(AppError::ForbiddenOperation),
    }
}

/// 予約一覧・履歴の参照範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    // 自分が申請した予約
    Requester(UserId),
    // すべての保留中予約と、自分が処理した予約
    Approver(UserId),
    // 自分が所有する部屋の予約すべて
    RoomOwner(UserId),
}

impl BookingScope {
    pub fn of(user_id: UserId, role: Role) -> Self {
        match role {
            Role::Student => BookingScope::Requester(user_id),
            Role::Lecturer => BookingScope::Approver(user_id),
            Role::Staff => BookingScope::RoomOwner(user_id),
        }
    }

    pub fn user_id(&self) -> UserId {
        match *self {
            BookingScope::Requester(id)
            | BookingScope::Approver(id)
            | BookingScope::RoomOwner(id) => id,
        }
    }
}

#[derive(Debug)]
pub struct Booking {
    pub booking_id: BookingId,
    pub booked_by: BookingUser,
    pub room: BookingRoom,
    pub slot_id: SlotId,
    pub period: SlotPeriod,
    pub booking_date: NaiveDate,
    pub reason: Option<String>,
    pub status: BookingStatus,
    pub approver: Option<BookingUser>,
    pub resolution_reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct BookingUser {
    pub user_id: UserId,
    pub user_name: String,
}

#[derive(Debug)]
pub struct BookingRoom {
    pub room_id: RoomId,
    pub room_name: String,
}
