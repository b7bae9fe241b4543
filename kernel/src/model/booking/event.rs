use crate::model::{
    booking::Resolution,
    id::{BookingId, RoomId, SlotId, UserId},
    role::Role,
};
use chrono::{DateTime, Local, NaiveDate};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateBooking {
    pub requested_by: UserId,
    pub room_id: RoomId,
    pub slot_id: SlotId,
    pub booking_date: NaiveDate,
    pub reason: Option<String>,
    // 「今日」「現在時刻」の判定はこの時刻だけを基準にする
    pub requested_at: DateTime<Local>,
}

#[derive(Debug, new)]
pub struct ResolveBooking {
    pub booking_id: BookingId,
    pub approver_id: UserId,
    pub approver_role: Role,
    pub resolution: Resolution,
    pub resolved_at: DateTime<Local>,
}
