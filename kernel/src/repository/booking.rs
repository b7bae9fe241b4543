use crate::model::{
    booking::{
        event::{CreateBooking, ResolveBooking},
        Booking, BookingScope,
    },
    history::RoomBookingSummary,
    id::{BookingId, RoomId},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    // 予約申請を作成する。同じ日・同じ枠／同じ利用者の重複は排他的に検査する
    async fn create(&self, event: CreateBooking) -> AppResult<Booking>;
    // 保留中の予約を承認または却下する
    async fn resolve(&self, event: ResolveBooking) -> AppResult<Booking>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;
    // 参照範囲に含まれる予約一覧を取得する
    async fn find_by_scope(&self, scope: BookingScope) -> AppResult<Vec<Booking>>;
    // 参照範囲に含まれる予約を部屋ごとに集計する
    async fn summarize_by_room(&self, scope: BookingScope) -> AppResult<Vec<RoomBookingSummary>>;
    // 部屋の処理済み予約（承認・却下）の履歴を取得する
    async fn find_resolved_by_room(
        &self,
        room_id: RoomId,
        scope: BookingScope,
    ) -> AppResult<Vec<Booking>>;
}
