use crate::handler::user::{change_password, get_current_user, register_lecturer};
use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

pub fn build_user_router() -> Router<AppRegistry> {
    Router::new()
        .route("/lecturers", post(register_lecturer))
        .route("/users/me", get(get_current_user))
        .route("/user/password", put(change_password))
}
