use crate::model::{
    id::{RoomId, UserId},
    slot::TimeSlot,
};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

pub mod event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
pub enum RoomStatus {
    Available,
    Disabled,
}

#[derive(Debug)]
pub struct Room {
    pub room_id: RoomId,
    pub room_name: String,
    pub description: String,
    pub owner: RoomOwner,
    pub status: RoomStatus,
}

#[derive(Debug)]
pub struct RoomOwner {
    pub owner_id: UserId,
    pub owner_name: String,
}

// 部屋とその時間枠をまとめて扱う型
#[derive(Debug)]
pub struct RoomWithSlots {
    pub room: Room,
    pub slots: Vec<TimeSlot>,
}
