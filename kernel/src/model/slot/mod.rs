use crate::model::id::{RoomId, SlotId};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use std::{fmt, str::FromStr};
use strum::{AsRefStr, EnumString};

/// 部屋を作成したときに自動で登録される時間枠
pub const DEFAULT_PERIODS: [&str; 4] = ["08:00-10:00", "10:00-12:00", "13:00-15:00", "15:00-17:00"];

/// 時間枠の静的な状態。`Disabled` は予約状況とは無関係に恒久的に使えないことを表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
pub enum SlotStatus {
    Free,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct TimeSlot {
    pub slot_id: SlotId,
    pub room_id: RoomId,
    pub period: SlotPeriod,
    pub status: SlotStatus,
}

/// 毎日繰り返される時間帯（日付を持たない）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPeriod {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SlotPeriod {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::InvalidInput(format!(
                "time slot must start before it ends: {start}-{end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn defaults() -> Vec<SlotPeriod> {
        DEFAULT_PERIODS
            .iter()
            .filter_map(|p| p.parse().ok())
            .collect()
    }
}

impl FromStr for SlotPeriod {
    type Err = AppError;

    // "08:00-10:00" 形式を受け付ける
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidInput(format!("invalid time period: {s}"));
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;
        Self::new(start, end)
    }
}

impl fmt::Display for SlotPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}
