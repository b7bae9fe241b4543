use chrono::NaiveDate;
use garde::Validate;
use kernel::model::{
    availability::{RoomAvailability, SlotAvailability},
    id::{RoomId, SlotId, UserId},
    room::{
        event::{CreateRoom, UpdateRoom},
        Room, RoomOwner, RoomStatus, RoomWithSlots,
    },
    slot::{SlotStatus, TimeSlot},
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use std::str::FromStr;

// 列挙値を文字列で受け取り、不正な値は 400 として返す
fn parse_status<T: FromStr>(value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("invalid status: {value}")))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[garde(length(min = 1, max = 255))]
    pub room_name: String,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(skip)]
    pub status: Option<String>,
}

pub struct CreateRoomRequestWithOwner(pub UserId, pub CreateRoomRequest);

impl TryFrom<CreateRoomRequestWithOwner> for CreateRoom {
    type Error = AppError;

    fn try_from(value: CreateRoomRequestWithOwner) -> Result<Self, Self::Error> {
        let CreateRoomRequestWithOwner(
            created_by,
            CreateRoomRequest {
                room_name,
                description,
                status,
            },
        ) = value;
        let status = match status {
            Some(s) => parse_status(&s)?,
            None => RoomStatus::Available,
        };
        Ok(CreateRoom::new(
            room_name,
            description.unwrap_or_default(),
            status,
            created_by,
        ))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    #[garde(length(min = 1, max = 255))]
    pub room_name: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(skip)]
    pub status: Option<String>,
}

pub struct UpdateRoomRequestWithIds(pub RoomId, pub UserId, pub UpdateRoomRequest);

impl TryFrom<UpdateRoomRequestWithIds> for UpdateRoom {
    type Error = AppError;

    fn try_from(value: UpdateRoomRequestWithIds) -> Result<Self, Self::Error> {
        let UpdateRoomRequestWithIds(
            room_id,
            requested_user,
            UpdateRoomRequest {
                room_name,
                description,
                status,
            },
        ) = value;
        let status = status.as_deref().map(parse_status::<RoomStatus>).transpose()?;
        Ok(UpdateRoom::new(
            room_id,
            room_name,
            description,
            status,
            requested_user,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlotStatusRequest {
    pub status: String,
}

impl UpdateSlotStatusRequest {
    pub fn status(&self) -> Result<SlotStatus, AppError> {
        parse_status(&self.status)
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsResponse {
    pub items: Vec<RoomResponse>,
}

impl From<Vec<Room>> for RoomsResponse {
    fn from(value: Vec<Room>) -> Self {
        Self {
            items: value.into_iter().map(RoomResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub room_id: RoomId,
    pub room_name: String,
    pub description: String,
    pub owner: RoomOwnerResponse,
    pub status: String,
}

impl From<Room> for RoomResponse {
    fn from(value: Room) -> Self {
        let Room {
            room_id,
            room_name,
            description,
            owner,
            status,
        } = value;
        Self {
            room_id,
            room_name,
            description,
            owner: owner.into(),
            status: status.as_ref().to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOwnerResponse {
    pub owner_id: UserId,
    pub owner_name: String,
}

impl From<RoomOwner> for RoomOwnerResponse {
    fn from(value: RoomOwner) -> Self {
        let RoomOwner {
            owner_id,
            owner_name,
        } = value;
        Self {
            owner_id,
            owner_name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    pub slot_id: SlotId,
    pub room_id: RoomId,
    pub time_period: String,
    pub status: String,
}

impl From<TimeSlot> for SlotResponse {
    fn from(value: TimeSlot) -> Self {
        let TimeSlot {
            slot_id,
            room_id,
            period,
            status,
        } = value;
        Self {
            slot_id,
            room_id,
            time_period: period.to_string(),
            status: status.as_ref().to_string(),
        }
    }
}

// 時間枠の status には、静的な状態ではなく導出した利用可否を入れる
impl From<SlotAvailability> for SlotResponse {
    fn from(value: SlotAvailability) -> Self {
        let SlotAvailability { slot, status } = value;
        Self {
            status: status.as_ref().to_string(),
            ..Self::from(slot)
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoomResponse {
    pub room: RoomResponse,
    pub slots: Vec<SlotResponse>,
}

impl From<RoomWithSlots> for CreatedRoomResponse {
    fn from(value: RoomWithSlots) -> Self {
        let RoomWithSlots { room, slots } = value;
        Self {
            room: room.into(),
            slots: slots.into_iter().map(SlotResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSlotsResponse {
    pub room: RoomResponse,
    pub date: NaiveDate,
    pub slots: Vec<SlotResponse>,
}

impl From<RoomAvailability> for RoomSlotsResponse {
    fn from(value: RoomAvailability) -> Self {
        let RoomAvailability { room, date, slots } = value;
        Self {
            room: room.into(),
            date,
            slots: slots.into_iter().map(SlotResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllRoomSlotsResponse {
    pub date: NaiveDate,
    pub items: Vec<RoomSlotsResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_unknown_status() {
        let req: CreateRoomRequest =
            serde_json::from_str(r#"{"roomName":"Room A","status":"Closed"}"#).unwrap();
        let res = CreateRoom::try_from(CreateRoomRequestWithOwner(UserId::new(), req));
        assert!(matches!(res, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn create_request_defaults_to_available() {
        let req: CreateRoomRequest = serde_json::from_str(r#"{"roomName":"Room A"}"#).unwrap();
        assert!(req.validate().is_ok());
        let event = CreateRoom::try_from(CreateRoomRequestWithOwner(UserId::new(), req)).unwrap();
        assert_eq!(event.status, RoomStatus::Available);
        assert_eq!(event.description, "");
    }

    #[test]
    fn empty_room_name_is_invalid() {
        let req: CreateRoomRequest = serde_json::from_str(r#"{"roomName":""}"#).unwrap();
        assert!(req.validate().is_err());
        let req: UpdateRoomRequest = serde_json::from_str(r#"{"roomName":""}"#).unwrap();
        assert!(req.validate().is_err());
        let req: UpdateRoomRequest = serde_json::from_str(r#"{"status":"Disabled"}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
