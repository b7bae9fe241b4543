use kernel::model::{history::RoomBookingSummary, id::RoomId};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomBookingSummariesResponse {
    pub items: Vec<RoomBookingSummaryResponse>,
}

impl From<Vec<RoomBookingSummary>> for RoomBookingSummariesResponse {
    fn from(value: Vec<RoomBookingSummary>) -> Self {
        Self {
            items: value
                .into_iter()
                .map(RoomBookingSummaryResponse::from)
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomBookingSummaryResponse {
    pub room_id: RoomId,
    pub room_name: String,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub total: i64,
}

impl From<RoomBookingSummary> for RoomBookingSummaryResponse {
    fn from(value: RoomBookingSummary) -> Self {
        let total = value.total();
        let RoomBookingSummary {
            room_id,
            room_name,
            pending,
            approved,
            rejected,
        } = value;
        Self {
            room_id,
            room_name,
            pending,
            approved,
            rejected,
            total,
        }
    }
}
