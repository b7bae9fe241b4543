use crate::model::id::RoomId;

/// 部屋ごとの予約件数の集計
#[derive(Debug, PartialEq, Eq)]
pub struct RoomBookingSummary {
    pub room_id: RoomId,
    pub room_name: String,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl RoomBookingSummary {
    pub fn total(&self) -> i64 {
        self.pending + self.approved + self.rejected
    }
}
