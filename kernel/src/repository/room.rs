use crate::model::{
    availability::RoomAvailability,
    id::RoomId,
    room::{
        event::{CreateRoom, DeleteRoom, UpdateRoom, UpdateSlotStatus},
        Room, RoomWithSlots,
    },
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use shared::error::AppResult;

#[async_trait]
pub trait RoomRepository: Send + Sync {
    // 部屋と既定の 4 つの時間枠を作成する
    async fn create(&self, event: CreateRoom) -> AppResult<RoomWithSlots>;
    async fn find_all(&self) -> AppResult<Vec<Room>>;
    async fn find_by_id(&self, room_id: RoomId) -> AppResult<Option<Room>>;
    async fn update(&self, event: UpdateRoom) -> AppResult<()>;
    // 部屋を削除する。時間枠も一緒に削除される
    async fn delete(&self, event: DeleteRoom) -> AppResult<()>;
    async fn update_slot_status(&self, event: UpdateSlotStatus) -> AppResult<()>;
    // 指定日の各時間枠の利用可否を導出する
    async fn find_availability(
        &self,
        room_id: RoomId,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> AppResult<RoomAvailability>;
    // すべての部屋について指定日の利用可否を導出する
    async fn find_all_availability(
        &self,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> AppResult<Vec<RoomAvailability>>;
}
