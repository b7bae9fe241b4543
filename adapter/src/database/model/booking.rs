use super::parse_column;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kernel::model::{
    booking::{Booking, BookingRoom, BookingStatus, BookingUser},
    history::RoomBookingSummary,
    id::{BookingId, RoomId, SlotId, UserId},
    slot::SlotPeriod,
};
use shared::error::AppError;
use sqlx::FromRow;

// 予約一覧を取得する際に使う型
// 承認者の情報は処理済みの場合のみ値が入る
#[derive(FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub user_name: String,
    pub room_id: RoomId,
    pub room_name: String,
    pub slot_id: SlotId,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub booking_date: NaiveDate,
    pub reason: Option<String>,
    pub status: String,
    pub approver_id: Option<UserId>,
    pub approver_name: Option<String>,
    pub resolution_reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(value: BookingRow) -> Result<Self, Self::Error> {
        let BookingRow {
            booking_id,
            user_id,
            user_name,
            room_id,
            room_name,
            slot_id,
            start_time,
            end_time,
            booking_date,
            reason,
            status,
            approver_id,
            approver_name,
            resolution_reason,
            requested_at,
            resolved_at,
        } = value;
        let approver = match (approver_id, approver_name) {
            (Some(user_id), Some(user_name)) => Some(BookingUser { user_id, user_name }),
            _ => None,
        };
        Ok(Booking {
            booking_id,
            booked_by: BookingUser { user_id, user_name },
            room: BookingRoom { room_id, room_name },
            slot_id,
            period: SlotPeriod::new(start_time, end_time)
                .map_err(|e| AppError::ConversionEntityError(e.to_string()))?,
            booking_date,
            reason,
            status: parse_column("booking status", &status)?,
            approver,
            resolution_reason,
            requested_at,
            resolved_at,
        })
    }
}

// 承認・却下の前にロックを取って読む予約の型
#[derive(FromRow)]
pub struct BookingStateRow {
    pub booking_id: BookingId,
    pub status: String,
    pub room_owner_id: UserId,
}

impl BookingStateRow {
    pub fn status(&self) -> Result<BookingStatus, AppError> {
        parse_column("booking status", &self.status)
    }
}

#[derive(FromRow)]
pub struct RoomBookingSummaryRow {
    pub room_id: RoomId,
    pub room_name: String,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl From<RoomBookingSummaryRow> for RoomBookingSummary {
    fn from(value: RoomBookingSummaryRow) -> Self {
        let RoomBookingSummaryRow {
            room_id,
            room_name,
            pending,
            approved,
            rejected,
        } = value;
        RoomBookingSummary {
            room_id,
            room_name,
            pending,
            approved,
            rejected,
        }
    }
}
