use crate::model::{
    id::{RoomId, SlotId, UserId},
    room::RoomStatus,
    slot::SlotStatus,
};
use derive_new::new;

#[derive(new)]
pub struct CreateRoom {
    pub room_name: String,
    pub description: String,
    pub status: RoomStatus,
    pub created_by: UserId,
}

#[derive(Debug, new)]
pub struct UpdateRoom {
    pub room_id: RoomId,
    pub room_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<RoomStatus>,
    pub requested_user: UserId,
}

#[derive(Debug, new)]
pub struct DeleteRoom {
    pub room_id: RoomId,
    pub requested_user: UserId,
}

#[derive(Debug, new)]
pub struct UpdateSlotStatus {
    pub room_id: RoomId,
    pub slot_id: SlotId,
    pub status: SlotStatus,
    pub requested_user: UserId,
}
