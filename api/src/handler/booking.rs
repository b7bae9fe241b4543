use crate::{
    extractor::{AuthorizedUser, Json, Path},
    model::booking::{
        BookingResponse, BookingsResponse, CreateBookingRequest, ResolveBookingRequest,
    },
};
use axum::{extract::State, http::StatusCode};
use chrono::Local;
use garde::Validate;
use kernel::model::{
    booking::BookingScope,
    id::{BookingId, UserId},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn request_booking(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    req.validate()?;

    let event = req.into_event(user.id(), Local::now());
    let booking = registry.booking_repository().create(event).await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

// パスの利用者 ID はトークンの利用者と一致しなければならない
pub async fn show_user_bookings(
    user: AuthorizedUser,
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    if user_id != user.id() {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .booking_repository()
        .find_by_scope(BookingScope::of(user.id(), user.role()))
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn resolve_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<ResolveBookingRequest>,
) -> AppResult<Json<BookingResponse>> {
    user.ensure_approver()?;
    req.validate()?;

    let event = req.into_event(booking_id, user.id(), user.role(), Local::now())?;
    registry
        .booking_repository()
        .resolve(event)
        .await
        .map(BookingResponse::from)
        .map(Json)
}
