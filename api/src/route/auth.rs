use crate::handler::auth::{login, register};
use axum::{routing::post, Router};
use registry::AppRegistry;

pub fn build_auth_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    Router::new().nest("/auth", routers)
}
