use crate::handler::history::show_room_summaries;
use axum::{routing::get, Router};
use registry::AppRegistry;

pub fn build_history_routers() -> Router<AppRegistry> {
    Router::new().route("/history/rooms", get(show_room_summaries))
}
