use crate::handler::{
    history::show_room_history,
    room::{
        delete_room, register_room, show_all_room_slots_today, show_room, show_room_list,
        show_room_slots, update_room, update_slot_status,
    },
};
use axum::{
    routing::{get, put},
    Router,
};
use registry::AppRegistry;

pub fn build_room_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", get(show_room_list).post(register_room))
        .route("/all-slots-today", get(show_all_room_slots_today))
        .route(
            "/:room_id",
            get(show_room).put(update_room).delete(delete_room),
        )
        .route("/:room_id/slots", get(show_room_slots))
        .route("/:room_id/slots/:slot_id", put(update_slot_status))
        .route("/:room_id/history", get(show_room_history));

    Router::new().nest("/rooms", routers)
}
