use crate::{
    extractor::{AuthorizedUser, Json, Path, Query},
    model::room::{
        AllRoomSlotsResponse, AvailabilityQuery, CreateRoomRequest, CreateRoomRequestWithOwner,
        CreatedRoomResponse, RoomResponse, RoomSlotsResponse, RoomsResponse,
        UpdateRoomRequest, UpdateRoomRequestWithIds, UpdateSlotStatusRequest,
    },
};
use axum::{extract::State, http::StatusCode};
use chrono::Local;
use garde::Validate;
use kernel::model::{
    id::{RoomId, SlotId},
    room::event::{DeleteRoom, UpdateSlotStatus},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn register_room(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateRoomRequest>,
) -> AppResult<(StatusCode, Json<CreatedRoomResponse>)> {
    user.ensure_room_manager()?;
    req.validate()?;

    let event = CreateRoomRequestWithOwner(user.id(), req).try_into()?;
    let created = registry.room_repository().create(event).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn show_room_list(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RoomsResponse>> {
    registry
        .room_repository()
        .find_all()
        .await
        .map(RoomsResponse::from)
        .map(Json)
}

pub async fn show_room(
    Path(room_id): Path<RoomId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RoomResponse>> {
    registry
        .room_repository()
        .find_by_id(room_id)
        .await
        .and_then(|room| match room {
            Some(room) => Ok(Json(room.into())),
            None => Err(AppError::EntityNotFound("room not found".into())),
        })
}

pub async fn update_room(
    user: AuthorizedUser,
    Path(room_id): Path<RoomId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateRoomRequest>,
) -> AppResult<StatusCode> {
    user.ensure_room_manager()?;
    req.validate()?;

    let event = UpdateRoomRequestWithIds(room_id, user.id(), req).try_into()?;
    registry
        .room_repository()
        .update(event)
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_room(
    user: AuthorizedUser,
    Path(room_id): Path<RoomId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    user.ensure_room_manager()?;

    registry
        .room_repository()
        .delete(DeleteRoom::new(room_id, user.id()))
        .await
        .map(|_| StatusCode::OK)
}

pub async fn update_slot_status(
    user: AuthorizedUser,
    Path((room_id, slot_id)): Path<(RoomId, SlotId)>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateSlotStatusRequest>,
) -> AppResult<StatusCode> {
    user.ensure_room_manager()?;

    let event = UpdateSlotStatus::new(room_id, slot_id, req.status()?, user.id());
    registry
        .room_repository()
        .update_slot_status(event)
        .await
        .map(|_| StatusCode::OK)
}

// 閲覧は認証不要。日付の指定がなければ今日の利用可否を返す
pub async fn show_room_slots(
    Path(room_id): Path<RoomId>,
    Query(query): Query<AvailabilityQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RoomSlotsResponse>> {
    let now = Local::now().naive_local();
    let date = query.date.unwrap_or(now.date());

    registry
        .room_repository()
        .find_availability(room_id, date, now)
        .await
        .map(RoomSlotsResponse::from)
        .map(Json)
}

pub async fn show_all_room_slots_today(
    Query(query): Query<AvailabilityQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<AllRoomSlotsResponse>> {
    let now = Local::now().naive_local();
    let date = query.date.unwrap_or(now.date());

    let rooms = registry
        .room_repository()
        .find_all_availability(date, now)
        .await?;

    Ok(Json(AllRoomSlotsResponse {
        date,
        items: rooms.into_iter().map(RoomSlotsResponse::from).collect(),
    }))
}
