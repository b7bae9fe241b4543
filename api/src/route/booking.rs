use crate::handler::booking::{request_booking, resolve_booking, show_user_bookings};
use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

pub fn build_booking_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", post(request_booking))
        .route("/user/:user_id", get(show_user_bookings))
        .route("/:booking_id/approve", post(resolve_booking));

    Router::new().nest("/bookings", routers)
}
