use crate::database::{
    conflict_on_unique_violation,
    model::room::{RoomRow, SlotAvailabilityRow, SlotRow},
    ConnectionPool,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use derive_new::new;
use itertools::Itertools;
use kernel::model::{
    availability::{resolve, RoomAvailability, SlotAvailability},
    id::{RoomId, SlotId, UserId},
    room::{
        event::{CreateRoom, DeleteRoom, UpdateRoom, UpdateSlotStatus},
        Room, RoomWithSlots,
    },
    slot::{SlotPeriod, TimeSlot},
};
use kernel::repository::room::RoomRepository;
use shared::error::{AppError, AppResult};
use sqlx::PgConnection;

const ROOM_SELECT: &str = r#"
    SELECT
    r.room_id,
    r.room_name,
    r.description,
    r.owner_id,
    u.user_name AS owner_name,
    r.status
    FROM rooms AS r
    INNER JOIN users AS u ON r.owner_id = u.user_id
"#;

// 時間枠と、その日の有効な予約の状態を合わせて取得する
// 有効な予約は枠・日付ごとに高々ひとつなので LEFT JOIN で行は増えない
const SLOT_AVAILABILITY_SELECT: &str = r#"
    SELECT
    ts.room_id,
    ts.slot_id,
    ts.start_time,
    ts.end_time,
    ts.status,
    b.status AS booking_status
    FROM time_slots AS ts
    LEFT JOIN bookings AS b
      ON b.slot_id = ts.slot_id
     AND b.booking_date = $1
     AND b.status IN ('pending', 'approved')
"#;

#[derive(new)]
pub struct RoomRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl RoomRepository for RoomRepositoryImpl {
    async fn create(&self, event: CreateRoom) -> AppResult<RoomWithSlots> {
        let mut tx = self.db.begin().await?;

        let room_id = RoomId::new();
        sqlx::query(
            r#"
                INSERT INTO rooms (room_id, room_name, description, owner_id, status)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(room_id)
        .bind(&event.room_name)
        .bind(&event.description)
        .bind(event.created_by)
        .bind(event.status.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(conflict_on_unique_violation(format!(
            "room name '{}' already exists",
            event.room_name
        )))?;

        // 既定の時間枠を部屋と同じトランザクションで登録する
        for period in SlotPeriod::defaults() {
            let res = sqlx::query(
                r#"
                    INSERT INTO time_slots (slot_id, room_id, start_time, end_time, status)
                    VALUES ($1, $2, $3, $4, 'Free')
                "#,
            )
            .bind(SlotId::new())
            .bind(room_id)
            .bind(period.start)
            .bind(period.end)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if res.rows_affected() < 1 {
                return Err(AppError::NoRowsAffectedError(
                    "No time slot record has been created".into(),
                ));
            }
        }

        let room = fetch_room(&mut *tx, room_id)
            .await?
            .ok_or_else(|| AppError::NoRowsAffectedError("No room record has been created".into()))?;
        let slots = fetch_slots(&mut *tx, room_id).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(room_id = %room_id, room_name = %room.room_name, "room created");

        Ok(RoomWithSlots { room, slots })
    }

    async fn find_all(&self) -> AppResult<Vec<Room>> {
        let sql = format!("{ROOM_SELECT} ORDER BY r.room_name ASC");
        sqlx::query_as::<_, RoomRow>(&sql)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .into_iter()
            .map(Room::try_from)
            .collect()
    }

    async fn find_by_id(&self, room_id: RoomId) -> AppResult<Option<Room>> {
        let mut conn = self
            .db
            .inner_ref()
            .acquire()
            .await
            .map_err(AppError::SpecificOperationError)?;
        fetch_room(&mut *conn, room_id).await
    }

    async fn update(&self, event: UpdateRoom) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        lock_owned_room(&mut *tx, event.room_id, event.requested_user, RoomLock::NoKeyUpdate)
            .await?;

        sqlx::query(
            r#"
                UPDATE rooms
                SET
                    room_name = COALESCE($2, room_name),
                    description = COALESCE($3, description),
                    status = COALESCE($4, status)
                WHERE room_id = $1
            "#,
        )
        .bind(event.room_id)
        .bind(event.room_name.as_deref())
        .bind(event.description.as_deref())
        .bind(event.status.as_ref().map(|s| s.as_ref()))
        .execute(&mut *tx)
        .await
        .map_err(conflict_on_unique_violation("room name already exists"))?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn delete(&self, event: DeleteRoom) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // 部屋が存在しない場合はここで終わり、何も書き込まない
        lock_owned_room(&mut *tx, event.room_id, event.requested_user, RoomLock::Update).await?;

        // 予約履歴は削除しないため、履歴を持つ部屋は削除できない
        let has_history: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM bookings WHERE room_id = $1)")
                .bind(event.room_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
        if has_history {
            return Err(AppError::Conflict(
                "room has booking history; disable it instead of deleting".into(),
            ));
        }

        // time_slots は ON DELETE CASCADE で一緒に削除される
        let res = sqlx::query("DELETE FROM rooms WHERE room_id = $1")
            .bind(event.room_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No room record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(room_id = %event.room_id, "room deleted");

        Ok(())
    }

    async fn update_slot_status(&self, event: UpdateSlotStatus) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        lock_owned_room(&mut *tx, event.room_id, event.requested_user, RoomLock::NoKeyUpdate)
            .await?;

        let res = sqlx::query(
            r#"
                UPDATE time_slots
                SET status = $3
                WHERE slot_id = $1 AND room_id = $2
            "#,
        )
        .bind(event.slot_id)
        .bind(event.room_id)
        .bind(event.status.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "time slot ({}) was not found in room ({})",
                event.slot_id, event.room_id
            )));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn find_availability(
        &self,
        room_id: RoomId,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> AppResult<RoomAvailability> {
        let room = self
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound(format!("room ({room_id}) was not found")))?;

        let sql = format!("{SLOT_AVAILABILITY_SELECT} WHERE ts.room_id = $2 ORDER BY ts.start_time ASC");
        let rows = sqlx::query_as::<_, SlotAvailabilityRow>(&sql)
            .bind(date)
            .bind(room_id)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        into_room_availability(room, rows, date, now)
    }

    async fn find_all_availability(
        &self,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> AppResult<Vec<RoomAvailability>> {
        let rooms = self.find_all().await?;

        let sql = format!("{SLOT_AVAILABILITY_SELECT} ORDER BY ts.room_id, ts.start_time ASC");
        let mut slots_by_room = sqlx::query_as::<_, SlotAvailabilityRow>(&sql)
            .bind(date)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .into_iter()
            .into_group_map_by(|row| row.room_id);

        rooms
            .into_iter()
            .map(|room| {
                let rows = slots_by_room.remove(&room.room_id).unwrap_or_default();
                into_room_availability(room, rows, date, now)
            })
            .collect()
    }
}

// 部屋の静的な状態と各枠の予約状況から、枠ごとの利用可否を導出する
fn into_room_availability(
    room: Room,
    rows: Vec<SlotAvailabilityRow>,
    date: NaiveDate,
    now: NaiveDateTime,
) -> AppResult<RoomAvailability> {
    let slots = rows
        .into_iter()
        .map(|row| {
            let (slot, booking_status) = row.into_parts()?;
            let status = resolve(room.status, &slot, booking_status, date, now);
            Ok(SlotAvailability { slot, status })
        })
        .collect::<AppResult<Vec<_>>>()?;
    Ok(RoomAvailability { room, date, slots })
}

async fn fetch_room(conn: &mut PgConnection, room_id: RoomId) -> AppResult<Option<Room>> {
    let sql = format!("{ROOM_SELECT} WHERE r.room_id = $1");
    sqlx::query_as::<_, RoomRow>(&sql)
        .bind(room_id)
        .fetch_optional(conn)
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(Room::try_from)
        .transpose()
}

async fn fetch_slots(conn: &mut PgConnection, room_id: RoomId) -> AppResult<Vec<TimeSlot>> {
    sqlx::query_as::<_, SlotRow>(
        r#"
            SELECT slot_id, room_id, start_time, end_time, status
            FROM time_slots
            WHERE room_id = $1
            ORDER BY start_time ASC
        "#,
    )
    .bind(room_id)
    .fetch_all(conn)
    .await
    .map_err(AppError::SpecificOperationError)?
    .into_iter()
    .map(TimeSlot::try_from)
    .collect()
}

// 部屋の行に取るロックの強さ
#[derive(Debug, Clone, Copy)]
enum RoomLock {
    // 部屋・時間枠の更新。予約作成が取る FOR KEY SHARE とは衝突しない
    NoKeyUpdate,
    // 部屋の削除
    Update,
}

impl RoomLock {
    fn query(self) -> &'static str {
        match self {
            RoomLock::NoKeyUpdate => {
                "SELECT owner_id FROM rooms WHERE room_id = $1 FOR NO KEY UPDATE"
            }
            RoomLock::Update => "SELECT owner_id FROM rooms WHERE room_id = $1 FOR UPDATE",
        }
    }
}

// 部屋の行をロックし、要求者がその部屋の所有者であることを確かめる
// 時間枠より先に部屋をロックする（予約作成と同じ順序）
async fn lock_owned_room(
    conn: &mut PgConnection,
    room_id: RoomId,
    requested_user: UserId,
    lock: RoomLock,
) -> AppResult<()> {
    let owner_id: Option<UserId> = sqlx::query_scalar(lock.query())
        .bind(room_id)
        .fetch_optional(conn)
        .await
        .map_err(AppError::SpecificOperationError)?;

    match owner_id {
        None => Err(AppError::EntityNotFound(format!(
            "room ({room_id}) was not found"
        ))),
        Some(owner_id) if owner_id != requested_user => Err(AppError::ForbiddenOperation),
        Some(_) => Ok(()),
    }
}
