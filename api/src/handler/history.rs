use crate::{
    extractor::{AuthorizedUser, Json, Path},
    model::{booking::BookingsResponse, history::RoomBookingSummariesResponse},
};
use axum::extract::State;
use kernel::model::{booking::BookingScope, id::RoomId};
use registry::AppRegistry;
use shared::error::AppResult;

// 呼び出し元が参照できる予約だけを部屋ごとに集計する
pub async fn show_room_summaries(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RoomBookingSummariesResponse>> {
    registry
        .booking_repository()
        .summarize_by_room(BookingScope::of(user.id(), user.role()))
        .await
        .map(RoomBookingSummariesResponse::from)
        .map(Json)
}

pub async fn show_room_history(
    user: AuthorizedUser,
    Path(room_id): Path<RoomId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    registry
        .booking_repository()
        .find_resolved_by_room(room_id, BookingScope::of(user.id(), user.role()))
        .await
        .map(BookingsResponse::from)
        .map(Json)
}
