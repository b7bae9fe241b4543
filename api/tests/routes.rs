use adapter::database::connect_database_with;
use api::route::v1;
use axum::{
    body::{to_bytes, Body},
    response::Response,
    http::{header, Method, Request, StatusCode},
    Router,
};
use kernel::model::{auth::event::CreateToken, id::UserId, role::Role};
use registry::AppRegistry;
use shared::config::{AppConfig, AuthConfig, DatabaseConfig, ServerConfig};
use tower::ServiceExt;

// ここで扱うリクエストは、いずれもデータベースに到達する前に結果が決まる
fn app() -> (Router, AppRegistry) {
    let app_config = AppConfig {
        database: DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            username: "app".into(),
            password: "passwd".into(),
            database: "app".into(),
            max_connections: 1,
            acquire_timeout_secs: 1,
        },
        auth: AuthConfig {
            secret: "router-test-secret".into(),
            ttl: 3600,
        },
        server: ServerConfig { port: 8080 },
        bootstrap: None,
    };
    let registry = AppRegistry::new(connect_database_with(&app_config.database), &app_config);
    let router = Router::new()
        .merge(v1::routes())
        .with_state(registry.clone());
    (router, registry)
}

async fn token_for(registry: &AppRegistry, user_id: UserId, role: Role) -> String {
    registry
        .auth_repository()
        .create_token(CreateToken::new(user_id, role))
        .await
        .unwrap()
        .0
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn error_message(res: Response) -> String {
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_responds_ok() {
    let (app, _) = app();
    let res = app
        .oneshot(request(Method::GET, "/api/v1/health", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_or_forged_token_is_unauthorized() {
    let (app, _) = app();
    let res = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/users/me", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .oneshot(request(Method::GET, "/api/v1/users/me", Some("not-a-jwt"), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn student_cannot_manage_rooms() {
    let (app, registry) = app();
    let token = token_for(&registry, UserId::new(), Role::Student).await;
    let res = app
        .oneshot(request(
            Method::POST,
            "/api/v1/rooms",
            Some(&token),
            Some(r#"{"roomName":"Room A"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_room_status_is_bad_request() {
    let (app, registry) = app();
    let token = token_for(&registry, UserId::new(), Role::Staff).await;
    let res = app
        .oneshot(request(
            Method::POST,
            "/api/v1/rooms",
            Some(&token),
            Some(r#"{"roomName":"Room A","status":"Closed"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bookings_of_another_user_are_forbidden() {
    let (app, registry) = app();
    let token = token_for(&registry, UserId::new(), Role::Student).await;
    let uri = format!("/api/v1/bookings/user/{}", UserId::new());
    let res = app
        .oneshot(request(Method::GET, &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn student_cannot_resolve_bookings() {
    let (app, registry) = app();
    let token = token_for(&registry, UserId::new(), Role::Student).await;
    let uri = format!("/api/v1/bookings/{}/approve", UserId::new());
    let res = app
        .oneshot(request(
            Method::POST,
            &uri,
            Some(&token),
            Some(r#"{"action":"approve"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rejection_without_reason_is_bad_request() {
    let (app, registry) = app();
    let token = token_for(&registry, UserId::new(), Role::Lecturer).await;
    let uri = format!("/api/v1/bookings/{}/approve", UserId::new());
    let res = app
        .oneshot(request(
            Method::POST,
            &uri,
            Some(&token),
            Some(r#"{"action":"reject","reason":"   "}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mismatched_password_confirmation_is_bad_request() {
    let (app, _) = app();
    let res = app
        .oneshot(request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(
                r#"{"userName":"alice","email":"alice@example.com","password":"password1","confirmPassword":"password2"}"#,
            ),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_resolution_action_is_bad_request() {
    let (app, registry) = app();
    let token = token_for(&registry, UserId::new(), Role::Lecturer).await;
    let uri = format!("/api/v1/bookings/{}/approve", UserId::new());
    let res = app
        .oneshot(request(
            Method::POST,
            &uri,
            Some(&token),
            Some(r#"{"action":"cancel"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(res).await.is_empty());
}

#[tokio::test]
async fn booking_body_missing_fields_is_bad_request() {
    let (app, registry) = app();
    let token = token_for(&registry, UserId::new(), Role::Student).await;
    let res = app
        .oneshot(request(
            Method::POST,
            "/api/v1/bookings",
            Some(&token),
            Some(r#"{"bookingDate":"2030-01-20"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(res).await.is_empty());
}

#[tokio::test]
async fn malformed_booking_date_is_bad_request() {
    let (app, registry) = app();
    let token = token_for(&registry, UserId::new(), Role::Student).await;
    let body = format!(
        r#"{{"roomId":"{}","slotId":"{}","bookingDate":"20-01-2030"}}"#,
        UserId::new(),
        UserId::new()
    );
    let res = app
        .oneshot(request(Method::POST, "/api/v1/bookings", Some(&token), Some(&body)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(res).await.is_empty());
}

#[tokio::test]
async fn malformed_path_id_is_bad_request() {
    let (app, registry) = app();
    let token = token_for(&registry, UserId::new(), Role::Student).await;
    let res = app
        .oneshot(request(
            Method::GET,
            "/api/v1/bookings/user/not-a-uuid",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(res).await.is_empty());
}
