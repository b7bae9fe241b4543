//! 部屋・時間枠・日付の組に対して、その時点での利用可否を導出する。
//!
//! 利用可否はどこにも保存せず、部屋と時間枠の静的な状態と、
//! その日の予約レコードから毎回計算する。
use crate::model::{
    booking::BookingStatus,
    room::{Room, RoomStatus},
    slot::{SlotPeriod, SlotStatus, TimeSlot},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use shared::error::{AppError, AppResult};
use strum::AsRefStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
pub enum Availability {
    Disable,
    Reserved,
    Pending,
    Free,
}

/// 指定日の時間枠がすでに終わっているか。
/// 過去の日付はすべて終了扱い、当日は終了時刻を過ぎていれば終了扱い。
pub fn is_elapsed(period: &SlotPeriod, date: NaiveDate, now: NaiveDateTime) -> bool {
    let today = now.date();
    date < today || (date == today && period.end <= now.time())
}

/// `active_booking` はその枠・その日の予約の状態。却下済みの予約は枠を塞がない。
pub fn resolve(
    room_status: RoomStatus,
    slot: &TimeSlot,
    active_booking: Option<BookingStatus>,
    date: NaiveDate,
    now: NaiveDateTime,
) -> Availability {
    if room_status == RoomStatus::Disabled
        || slot.status == SlotStatus::Disabled
        || is_elapsed(&slot.period, date, now)
    {
        return Availability::Disable;
    }
    match active_booking.filter(|status| status.is_active()) {
        Some(BookingStatus::Approved) => Availability::Reserved,
        Some(_) => Availability::Pending,
        None => Availability::Free,
    }
}

/// 予約作成時の静的な検証。存在確認の後、ロック付きの重複確認の前に行う。
pub fn ensure_bookable(
    room_status: RoomStatus,
    slot: &TimeSlot,
    date: NaiveDate,
    now: NaiveDateTime,
) -> AppResult<()> {
    if slot.status == SlotStatus::Disabled {
        return Err(AppError::Conflict(
            "this time slot is permanently disabled".into(),
        ));
    }
    if room_status == RoomStatus::Disabled {
        return Err(AppError::Conflict("this room is currently disabled".into()));
    }
    if date < now.date() {
        return Err(AppError::InvalidInput(format!(
            "booking date {date} is in the past"
        )));
    }
    if is_elapsed(&slot.period, date, now) {
        return Err(AppError::Conflict(
            "this time slot has already passed for today".into(),
        ));
    }
    Ok(())
}

#[derive(Debug)]
pub struct SlotAvailability {
    pub slot: TimeSlot,
    pub status: Availability,
}

#[derive(Debug)]
pub struct RoomAvailability {
    pub room: Room,
    pub date: NaiveDate,
    pub slots: Vec<SlotAvailability>,
}
