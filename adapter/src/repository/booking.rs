use crate::database::{
    model::{
        booking::{BookingRow, BookingStateRow, RoomBookingSummaryRow},
        room::LockedSlotRow,
    },
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    availability::ensure_bookable,
    booking::{
        ensure_can_resolve,
        event::{CreateBooking, ResolveBooking},
        Booking, BookingScope,
    },
    history::RoomBookingSummary,
    id::{BookingId, RoomId, UserId},
};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};
use chrono::Utc;
use sqlx::PgConnection;

// 予約情報を取得する際の共通の SELECT 句
const BOOKING_SELECT: &str = r#"
    SELECT
    b.booking_id,
    b.user_id,
    u.user_name,
    b.room_id,
    r.room_name,
    b.slot_id,
    ts.start_time,
    ts.end_time,
    b.booking_date,
    b.reason,
    b.status,
    b.approver_id,
    a.user_name AS approver_name,
    b.resolution_reason,
    b.requested_at,
    b.resolved_at
    FROM bookings AS b
    INNER JOIN users AS u ON b.user_id = u.user_id
    INNER JOIN rooms AS r ON b.room_id = r.room_id
    INNER JOIN time_slots AS ts ON b.slot_id = ts.slot_id
    LEFT JOIN users AS a ON b.approver_id = a.user_id
"#;

// 参照範囲ごとの絞り込み条件。$1 には常に参照者のユーザー ID を渡す
fn scope_condition(scope: &BookingScope) -> &'static str {
    match scope {
        BookingScope::Requester(_) => "b.user_id = $1",
        BookingScope::Approver(_) => "(b.status = 'pending' OR b.approver_id = $1)",
        BookingScope::RoomOwner(_) => "r.owner_id = $1",
    }
}

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    async fn create(&self, event: CreateBooking) -> AppResult<Booking> {
        let now = event.requested_at.naive_local();
        let mut tx = self.db.begin().await?;

        // 事前のチェックとして、以下を順に調べる。
        // - 指定の時間枠が指定の部屋に存在するか
        // - 時間枠・部屋が無効化されていないか、枠がすでに終わっていないか
        // - 申請者がその日に有効な予約を持っていないか
        // - その枠にその日の有効な予約がないか
        //
        // 申請者の行と時間枠の行を FOR UPDATE でロックしてから重複を確認するため、
        // 同じ利用者・同じ枠に対する同時の申請はここで直列化される。
        // ロックは常に「利用者 → 部屋 → 時間枠」の順に取る。
        // 部屋の行は INSERT 時の外部キー検査と同じ FOR KEY SHARE で先に押さえ、
        // 部屋を先にロックする管理操作と順序をそろえる。
        {
            let user_row: Option<UserId> = sqlx::query_scalar(
                r#"
                    SELECT user_id
                    FROM users
                    WHERE user_id = $1
                    FOR UPDATE
                "#,
            )
            .bind(event.requested_by)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if user_row.is_none() {
                return Err(AppError::EntityNotFound(format!(
                    "user ({}) was not found",
                    event.requested_by
                )));
            }

            sqlx::query("SELECT room_id FROM rooms WHERE room_id = $1 FOR KEY SHARE")
                .bind(event.room_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;

            //
            // ① 時間枠の存在確認（ロック付き）
            //
            let slot_row = sqlx::query_as::<_, LockedSlotRow>(
                r#"
                    SELECT
                    ts.slot_id,
                    ts.room_id,
                    ts.start_time,
                    ts.end_time,
                    ts.status,
                    r.status AS room_status
                    FROM time_slots AS ts
                    INNER JOIN rooms AS r ON ts.room_id = r.room_id
                    WHERE ts.slot_id = $1 AND ts.room_id = $2
                    FOR UPDATE OF ts
                "#,
            )
            .bind(event.slot_id)
            .bind(event.room_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let Some(slot_row) = slot_row else {
                return Err(AppError::EntityNotFound(format!(
                    "time slot ({}) was not found in room ({})",
                    event.slot_id, event.room_id
                )));
            };

            //
            // ② 静的な無効化と経過済みの確認
            //
            let (slot, room_status) = slot_row.into_parts()?;
            ensure_bookable(room_status, &slot, event.booking_date, now)?;

            //
            // ③ 申請者のその日の有効な予約
            //
            let own_active: Option<BookingId> = sqlx::query_scalar(
                r#"
                    SELECT booking_id
                    FROM bookings
                    WHERE user_id = $1
                      AND booking_date = $2
                      AND status IN ('pending', 'approved')
                    LIMIT 1
                    FOR UPDATE
                "#,
            )
            .bind(event.requested_by)
            .bind(event.booking_date)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if own_active.is_some() {
                return Err(AppError::Conflict(format!(
                    "you already have an active booking on {}",
                    event.booking_date
                )));
            }

            //
            // ④ その枠のその日の有効な予約
            //
            let slot_active: Option<BookingId> = sqlx::query_scalar(
                r#"
                    SELECT booking_id
                    FROM bookings
                    WHERE slot_id = $1
                      AND booking_date = $2
                      AND status IN ('pending', 'approved')
                    LIMIT 1
                    FOR UPDATE
                "#,
            )
            .bind(event.slot_id)
            .bind(event.booking_date)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if slot_active.is_some() {
                return Err(AppError::Conflict(format!(
                    "this time slot is no longer available on {}",
                    event.booking_date
                )));
            }
        }

        // ここまでのチェックを通過すれば保留中の予約を作成する
        let booking_id = BookingId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO bookings
                (booking_id, user_id, room_id, slot_id, booking_date, reason, status, requested_at)
                VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7)
            "#,
        )
        .bind(booking_id)
        .bind(event.requested_by)
        .bind(event.room_id)
        .bind(event.slot_id)
        .bind(event.booking_date)
        .bind(event.reason.as_deref())
        .bind(event.requested_at.with_timezone(&Utc))
        .execute(&mut *tx)
        .await
        .map_err(active_booking_conflict)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        let booking = fetch_booking(&mut *tx, booking_id).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(
            booking_id = %booking_id,
            user_id = %event.requested_by,
            slot_id = %event.slot_id,
            booking_date = %event.booking_date,
            "booking requested"
        );

        Ok(booking)
    }

    async fn resolve(&self, event: ResolveBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;

        // 対象の予約行をロックしてから状態を確認する。
        // 同じ予約に対する同時の承認・却下は後から来た方が
        // 処理済みの状態を読んで Conflict になる
        {
            let state = sqlx::query_as::<_, BookingStateRow>(
                r#"
                    SELECT
                    b.booking_id,
                    b.status,
                    r.owner_id AS room_owner_id
                    FROM bookings AS b
                    INNER JOIN rooms AS r ON b.room_id = r.room_id
                    WHERE b.booking_id = $1
                    FOR UPDATE OF b
                "#,
            )
            .bind(event.booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let Some(state) = state else {
                return Err(AppError::EntityNotFound(format!(
                    "booking ({}) was not found",
                    event.booking_id
                )));
            };

            ensure_can_resolve(event.approver_id, event.approver_role, state.room_owner_id)?;
            state.status()?.resolve(&event.resolution)?;
        }

        let res = sqlx::query(
            r#"
                UPDATE bookings
                SET
                    status = $2,
                    approver_id = $3,
                    resolution_reason = $4,
                    resolved_at = $5
                WHERE booking_id = $1 AND status = 'pending'
            "#,
        )
        .bind(event.booking_id)
        .bind(event.resolution.status().as_ref())
        .bind(event.approver_id)
        .bind(event.resolution.reason())
        .bind(event.resolved_at.with_timezone(&Utc))
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::Conflict(
                "booking has already been processed".into(),
            ));
        }

        let booking = fetch_booking(&mut *tx, event.booking_id).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(
            booking_id = %event.booking_id,
            approver_id = %event.approver_id,
            status = booking.status.as_ref(),
            "booking resolved"
        );

        Ok(booking)
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        let sql = format!("{BOOKING_SELECT} WHERE b.booking_id = $1");
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .map(Booking::try_from)
            .transpose()
    }

    async fn find_by_scope(&self, scope: BookingScope) -> AppResult<Vec<Booking>> {
        let sql = format!(
            "{BOOKING_SELECT} WHERE {} ORDER BY b.booking_date DESC, ts.start_time ASC",
            scope_condition(&scope)
        );
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(scope.user_id())
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .into_iter()
            .map(Booking::try_from)
            .collect()
    }

    async fn summarize_by_room(&self, scope: BookingScope) -> AppResult<Vec<RoomBookingSummary>> {
        let sql = format!(
            r#"
                SELECT
                r.room_id,
                r.room_name,
                COUNT(*) FILTER (WHERE b.status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE b.status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE b.status = 'rejected') AS rejected
                FROM bookings AS b
                INNER JOIN rooms AS r ON b.room_id = r.room_id
                WHERE {}
                GROUP BY r.room_id, r.room_name
                ORDER BY r.room_name ASC
            "#,
            scope_condition(&scope)
        );
        let rows = sqlx::query_as::<_, RoomBookingSummaryRow>(&sql)
            .bind(scope.user_id())
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(RoomBookingSummary::from).collect())
    }

    async fn find_resolved_by_room(
        &self,
        room_id: RoomId,
        scope: BookingScope,
    ) -> AppResult<Vec<Booking>> {
        let room: Option<RoomId> = sqlx::query_scalar("SELECT room_id FROM rooms WHERE room_id = $1")
            .bind(room_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        if room.is_none() {
            return Err(AppError::EntityNotFound(format!(
                "room ({room_id}) was not found"
            )));
        }

        let sql = format!(
            r#"{BOOKING_SELECT}
                WHERE b.room_id = $2
                  AND b.status IN ('approved', 'rejected')
                  AND {}
                ORDER BY b.resolved_at DESC
            "#,
            scope_condition(&scope)
        );
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(scope.user_id())
            .bind(room_id)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .into_iter()
            .map(Booking::try_from)
            .collect()
    }
}

// create, resolve でトランザクション内の最新状態を返すために内部的に使う
async fn fetch_booking(conn: &mut PgConnection, booking_id: BookingId) -> AppResult<Booking> {
    let sql = format!("{BOOKING_SELECT} WHERE b.booking_id = $1");
    sqlx::query_as::<_, BookingRow>(&sql)
        .bind(booking_id)
        .fetch_one(conn)
        .await
        .map_err(AppError::SpecificOperationError)
        .and_then(Booking::try_from)
}

// 部分一意インデックスの違反を、どちらの重複かが分かる Conflict に変換する
fn active_booking_conflict(e: sqlx::Error) -> AppError {
    let constraint = e
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .map(|db| db.constraint().unwrap_or_default().to_string());
    match constraint.as_deref() {
        Some("bookings_active_user_date") => {
            AppError::Conflict("you already have an active booking on that date".into())
        }
        Some(_) => AppError::Conflict("this time slot is no longer available".into()),
        None => AppError::SpecificOperationError(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::room::RoomRepositoryImpl;
    use chrono::{DateTime, Local, NaiveDate};
    use kernel::model::{
        availability::Availability,
        booking::{BookingAction, BookingStatus, Resolution},
        id::SlotId,
        role::Role,
    };
    use kernel::repository::room::RoomRepository;

    fn user(s: &str) -> UserId {
        s.parse().unwrap()
    }
    fn owner() -> UserId {
        user("11111111-1111-1111-1111-111111111111")
    }
    fn other_staff() -> UserId {
        user("22222222-2222-2222-2222-222222222222")
    }
    fn lecturer() -> UserId {
        user("33333333-3333-3333-3333-333333333333")
    }
    fn student_a() -> UserId {
        user("44444444-4444-4444-4444-444444444444")
    }
    fn student_b() -> UserId {
        user("55555555-5555-5555-5555-555555555555")
    }
    fn room_r() -> RoomId {
        "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa".parse().unwrap()
    }
    fn room_q() -> RoomId {
        "cccccccc-cccc-cccc-cccc-cccccccccccc".parse().unwrap()
    }
    fn slot(n: u8) -> SlotId {
        format!("a0000000-0000-0000-0000-00000000000{n}")
            .parse()
            .unwrap()
    }
    fn slot_q() -> SlotId {
        "c0000000-0000-0000-0000-000000000001".parse().unwrap()
    }
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 15).unwrap()
    }
    fn at(hour: u32, min: u32) -> DateTime<Local> {
        today()
            .and_hms_opt(hour, min, 0)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap()
    }

    fn request(by: UserId, room: RoomId, slot: SlotId) -> CreateBooking {
        CreateBooking::new(by, room, slot, today(), Some("study group".into()), at(7, 0))
    }

    fn approve(booking_id: BookingId, by: UserId, role: Role) -> ResolveBooking {
        ResolveBooking::new(
            booking_id,
            by,
            role,
            Resolution::new(BookingAction::Approve, None).unwrap(),
            at(7, 30),
        )
    }

    fn reject(booking_id: BookingId, by: UserId, role: Role, reason: &str) -> ResolveBooking {
        ResolveBooking::new(
            booking_id,
            by,
            role,
            Resolution::new(BookingAction::Reject, Some(reason.into())).unwrap(),
            at(7, 30),
        )
    }

    async fn active_count(db: &ConnectionPool, column: &str, id: uuid::Uuid) -> i64 {
        let sql = format!(
            "SELECT COUNT(*) FROM bookings WHERE {column} = $1 AND booking_date = $2 AND status IN ('pending', 'approved')"
        );
        sqlx::query_scalar(&sql)
            .bind(id)
            .bind(today())
            .fetch_one(db.inner_ref())
            .await
            .unwrap()
    }

    async fn slot_status(rooms: &RoomRepositoryImpl, slot_id: SlotId, now: DateTime<Local>) -> Availability {
        rooms
            .find_availability(room_r(), today(), now.naive_local())
            .await
            .unwrap()
            .slots
            .into_iter()
            .find(|s| s.slot.slot_id == slot_id)
            .map(|s| s.status)
            .unwrap()
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_booking_and_approval_scenario(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let repo = BookingRepositoryImpl::new(db.clone());
        let rooms = RoomRepositoryImpl::new(db.clone());

        assert_eq!(slot_status(&rooms, slot(1), at(7, 0)).await, Availability::Free);

        let booking = repo.create(request(student_a(), room_r(), slot(1))).await?;
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.booked_by.user_id, student_a());
        assert_eq!(booking.period.to_string(), "08:00-10:00");
        assert!(booking.approver.is_none());
        assert_eq!(slot_status(&rooms, slot(1), at(7, 0)).await, Availability::Pending);

        let res = repo.create(request(student_b(), room_r(), slot(1))).await;
        assert!(matches!(res, Err(AppError::Conflict(m)) if m.contains("no longer available")));

        let approved = repo
            .resolve(approve(booking.booking_id, lecturer(), Role::Lecturer))
            .await?;
        assert_eq!(approved.status, BookingStatus::Approved);
        assert_eq!(approved.resolution_reason, None);
        assert_eq!(approved.approver.map(|a| a.user_id), Some(lecturer()));
        assert!(approved.resolved_at.is_some());
        assert_eq!(slot_status(&rooms, slot(1), at(7, 0)).await, Availability::Reserved);

        let res = repo
            .resolve(approve(booking.booking_id, lecturer(), Role::Lecturer))
            .await;
        assert!(matches!(res, Err(AppError::Conflict(_))));

        // 枠の時間が過ぎたら予約の有無に関わらず Disable
        assert_eq!(slot_status(&rooms, slot(1), at(10, 0)).await, Availability::Disable);
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_one_active_booking_per_user_per_day(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        repo.create(request(student_a(), room_r(), slot(1))).await?;

        let res = repo.create(request(student_a(), room_r(), slot(2))).await;
        assert!(
            matches!(res, Err(AppError::Conflict(m)) if m.contains("already have an active booking"))
        );

        // 別の部屋でも同じ日なら不可
        let res = repo.create(request(student_a(), room_q(), slot_q())).await;
        assert!(matches!(res, Err(AppError::Conflict(_))));

        // 別の日なら可
        let mut tomorrow = request(student_a(), room_r(), slot(2));
        tomorrow.booking_date = today().succ_opt().unwrap();
        repo.create(tomorrow).await?;
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_validation_order(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let res = repo.create(request(student_a(), room_r(), SlotId::new())).await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));

        // 別の部屋の時間枠は存在しない扱い
        let res = repo.create(request(student_a(), room_r(), slot_q())).await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));

        let res = repo.create(request(student_a(), room_r(), slot(3))).await;
        assert!(matches!(res, Err(AppError::Conflict(m)) if m.contains("permanently disabled")));

        let mut past = request(student_a(), room_r(), slot(1));
        past.booking_date = today().pred_opt().unwrap();
        assert!(matches!(
            repo.create(past).await,
            Err(AppError::InvalidInput(_))
        ));

        let mut elapsed = request(student_a(), room_r(), slot(1));
        elapsed.requested_at = at(11, 0);
        assert!(matches!(
            repo.create(elapsed).await,
            Err(AppError::Conflict(m)) if m.contains("already passed")
        ));

        // 失敗した申請は何も書き込まない
        let mine = repo.find_by_scope(BookingScope::Requester(student_a())).await?;
        assert!(mine.is_empty());
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_concurrent_requests_for_same_slot(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let repo = BookingRepositoryImpl::new(db.clone());

        let (a, b) = tokio::join!(
            repo.create(request(student_a(), room_r(), slot(1))),
            repo.create(request(student_b(), room_r(), slot(1))),
        );

        let succeeded = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(succeeded, 1);
        let failure = if a.is_err() { a } else { b };
        assert!(matches!(failure, Err(AppError::Conflict(_))));
        assert_eq!(active_count(&db, "slot_id", slot(1).raw()).await, 1);
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_concurrent_requests_by_same_user(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let repo = BookingRepositoryImpl::new(db.clone());

        let (a, b) = tokio::join!(
            repo.create(request(student_a(), room_r(), slot(1))),
            repo.create(request(student_a(), room_r(), slot(2))),
        );

        assert!(a.is_ok() ^ b.is_ok());
        assert_eq!(active_count(&db, "user_id", student_a().raw()).await, 1);
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_concurrent_resolution_applies_once(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));
        let booking = repo.create(request(student_a(), room_r(), slot(1))).await?;

        let (a, b) = tokio::join!(
            repo.resolve(approve(booking.booking_id, lecturer(), Role::Lecturer)),
            repo.resolve(reject(booking.booking_id, owner(), Role::Staff, "maintenance")),
        );

        assert!(a.is_ok() ^ b.is_ok());
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser, Err(AppError::Conflict(_))));
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_rejection_frees_slot(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));
        let booking = repo.create(request(student_a(), room_r(), slot(1))).await?;

        let rejected = repo
            .resolve(reject(booking.booking_id, owner(), Role::Staff, "exam in progress"))
            .await?;
        assert_eq!(rejected.status, BookingStatus::Rejected);
        assert_eq!(rejected.resolution_reason.as_deref(), Some("exam in progress"));

        // 却下された予約は枠も利用者の 1 日 1 件の枠も塞がない
        repo.create(request(student_b(), room_r(), slot(1))).await?;
        repo.create(request(student_a(), room_r(), slot(2))).await?;

        let res = repo
            .resolve(approve(BookingId::new(), lecturer(), Role::Lecturer))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_resolve_permissions(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));
        let booking = repo.create(request(student_a(), room_r(), slot(1))).await?;

        let res = repo
            .resolve(approve(booking.booking_id, other_staff(), Role::Staff))
            .await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));
        let res = repo
            .resolve(approve(booking.booking_id, student_b(), Role::Student))
            .await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));

        let still_pending = repo.find_by_id(booking.booking_id).await?.unwrap();
        assert_eq!(still_pending.status, BookingStatus::Pending);

        repo.resolve(approve(booking.booking_id, owner(), Role::Staff))
            .await?;
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_scopes_and_history(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));
        let a = repo.create(request(student_a(), room_r(), slot(1))).await?;
        let b = repo.create(request(student_b(), room_r(), slot(2))).await?;
        let mut later = request(student_a(), room_q(), slot_q());
        later.booking_date = today().succ_opt().unwrap();
        let q = repo.create(later).await?;

        repo.resolve(approve(a.booking_id, lecturer(), Role::Lecturer))
            .await?;
        repo.resolve(reject(q.booking_id, other_staff(), Role::Staff, "closed"))
            .await?;

        let own = repo.find_by_scope(BookingScope::Requester(student_a())).await?;
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|bk| bk.booked_by.user_id == student_a()));

        // 講師: 保留中すべて + 自分が処理したもの
        let lecturer_view = repo.find_by_scope(BookingScope::Approver(lecturer())).await?;
        let ids: Vec<_> = lecturer_view.iter().map(|bk| bk.booking_id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a.booking_id) && ids.contains(&b.booking_id));

        // スタッフ: 所有する部屋の予約のみ
        let owner_view = repo.find_by_scope(BookingScope::RoomOwner(owner())).await?;
        assert_eq!(owner_view.len(), 2);
        assert!(owner_view.iter().all(|bk| bk.room.room_id == room_r()));

        let summary = repo.summarize_by_room(BookingScope::RoomOwner(owner())).await?;
        assert_eq!(summary.len(), 1);
        assert_eq!(
            (summary[0].pending, summary[0].approved, summary[0].rejected),
            (1, 1, 0)
        );

        let history = repo
            .find_resolved_by_room(room_q(), BookingScope::RoomOwner(other_staff()))
            .await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, BookingStatus::Rejected);
        assert_eq!(
            history[0].approver.as_ref().map(|u| u.user_name.as_str()),
            Some("staff-other")
        );

        let res = repo
            .find_resolved_by_room(RoomId::new(), BookingScope::Requester(student_a()))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
        Ok(())
    }
}
