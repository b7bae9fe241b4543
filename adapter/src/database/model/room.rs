use super::parse_column;
use chrono::NaiveTime;
use kernel::model::{
    booking::BookingStatus,
    id::{RoomId, SlotId, UserId},
    room::{Room, RoomOwner, RoomStatus},
    slot::{SlotPeriod, TimeSlot},
};
use shared::error::AppError;
use sqlx::FromRow;

#[derive(FromRow)]
pub struct RoomRow {
    pub room_id: RoomId,
    pub room_name: String,
    pub description: String,
    pub owner_id: UserId,
    pub owner_name: String,
    pub status: String,
}

impl TryFrom<RoomRow> for Room {
    type Error = AppError;

    fn try_from(value: RoomRow) -> Result<Self, Self::Error> {
        let RoomRow {
            room_id,
            room_name,
            description,
            owner_id,
            owner_name,
            status,
        } = value;
        Ok(Room {
            room_id,
            room_name,
            description,
            owner: RoomOwner {
                owner_id,
                owner_name,
            },
            status: parse_column("room status", &status)?,
        })
    }
}

#[derive(FromRow)]
pub struct SlotRow {
    pub slot_id: SlotId,
    pub room_id: RoomId,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
}

impl TryFrom<SlotRow> for TimeSlot {
    type Error = AppError;

    fn try_from(value: SlotRow) -> Result<Self, Self::Error> {
        let SlotRow {
            slot_id,
            room_id,
            start_time,
            end_time,
            status,
        } = value;
        Ok(TimeSlot {
            slot_id,
            room_id,
            period: SlotPeriod::new(start_time, end_time)
                .map_err(|e| AppError::ConversionEntityError(e.to_string()))?,
            status: parse_column("slot status", &status)?,
        })
    }
}

// 利用可否の導出に使う型
// booking_status はその日の保留中・承認済みの予約がある場合のみ値が入る
#[derive(FromRow)]
pub struct SlotAvailabilityRow {
    pub room_id: RoomId,
    pub slot_id: SlotId,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub booking_status: Option<String>,
}

impl SlotAvailabilityRow {
    pub fn into_parts(self) -> Result<(TimeSlot, Option<BookingStatus>), AppError> {
        let booking_status = self
            .booking_status
            .as_deref()
            .map(|s| parse_column("booking status", s))
            .transpose()?;
        let slot = TimeSlot::try_from(SlotRow {
            slot_id: self.slot_id,
            room_id: self.room_id,
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status,
        })?;
        Ok((slot, booking_status))
    }
}

// 予約作成時にロックを取って読む時間枠の型
#[derive(FromRow)]
pub struct LockedSlotRow {
    pub slot_id: SlotId,
    pub room_id: RoomId,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub room_status: String,
}

impl LockedSlotRow {
    pub fn into_parts(self) -> Result<(TimeSlot, RoomStatus), AppError> {
        let room_status = parse_column("room status", &self.room_status)?;
        let slot = TimeSlot::try_from(SlotRow {
            slot_id: self.slot_id,
            room_id: self.room_id,
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status,
        })?;
        Ok((slot, room_status))
    }
}
