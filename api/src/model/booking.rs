use chrono::{DateTime, Local, NaiveDate, Utc};
use garde::Validate;
use kernel::model::{
    booking::{
        event::{CreateBooking, ResolveBooking},
        Booking, BookingAction, BookingRoom, BookingUser, Resolution,
    },
    id::{BookingId, RoomId, SlotId, UserId},
    role::Role,
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

// 申請者はトークンから決まるため、ボディに userId が含まれていても無視する
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[garde(skip)]
    pub room_id: RoomId,
    #[garde(skip)]
    pub slot_id: SlotId,
    #[garde(skip)]
    pub booking_date: NaiveDate,
    #[garde(length(max = 1000))]
    pub reason: Option<String>,
}

impl CreateBookingRequest {
    pub fn into_event(self, requested_by: UserId, requested_at: DateTime<Local>) -> CreateBooking {
        let reason = self
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        CreateBooking::new(
            requested_by,
            self.room_id,
            self.slot_id,
            self.booking_date,
            reason,
            requested_at,
        )
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResolveBookingRequest {
    #[garde(skip)]
    pub action: BookingAction,
    #[garde(length(max = 1000))]
    pub reason: Option<String>,
}

impl ResolveBookingRequest {
    pub fn into_event(
        self,
        booking_id: BookingId,
        approver_id: UserId,
        approver_role: Role,
        resolved_at: DateTime<Local>,
    ) -> Result<ResolveBooking, AppError> {
        let resolution = Resolution::new(self.action, self.reason)?;
        Ok(ResolveBooking::new(
            booking_id,
            approver_id,
            approver_role,
            resolution,
            resolved_at,
        ))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    pub items: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingsResponse {
    fn from(value: Vec<Booking>) -> Self {
        Self {
            items: value.into_iter().map(BookingResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: BookingId,
    pub booked_by: BookingUserResponse,
    pub room: BookingRoomResponse,
    pub slot_id: SlotId,
    pub time_period: String,
    pub booking_date: NaiveDate,
    pub reason: Option<String>,
    pub status: String,
    pub approver: Option<BookingUserResponse>,
    pub resolution_reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let Booking {
            booking_id,
            booked_by,
            room,
            slot_id,
            period,
            booking_date,
            reason,
            status,
            approver,
            resolution_reason,
            requested_at,
            resolved_at,
        } = value;
        Self {
            booking_id,
            booked_by: booked_by.into(),
            room: room.into(),
            slot_id,
            time_period: period.to_string(),
            booking_date,
            reason,
            status: status.as_ref().to_string(),
            approver: approver.map(BookingUserResponse::from),
            resolution_reason,
            requested_at,
            resolved_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUserResponse {
    pub user_id: UserId,
    pub user_name: String,
}

impl From<BookingUser> for BookingUserResponse {
    fn from(value: BookingUser) -> Self {
        let BookingUser { user_id, user_name } = value;
        Self { user_id, user_name }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRoomResponse {
    pub room_id: RoomId,
    pub room_name: String,
}

impl From<BookingRoom> for BookingRoomResponse {
    fn from(value: BookingRoom) -> Self {
        let BookingRoom { room_id, room_name } = value;
        Self { room_id, room_name }
    }
}
