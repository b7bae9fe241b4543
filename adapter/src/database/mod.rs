use shared::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::time::Duration;

pub mod model;

fn make_pg_connect_options(cfg: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.username)
        .password(&cfg.password)
        .database(&cfg.database)
}

#[derive(Clone)]
pub struct ConnectionPool(PgPool);

impl ConnectionPool {
    pub fn new(pool: PgPool) -> Self {
        Self(pool)
    }

    pub fn inner_ref(&self) -> &PgPool {
        &self.0
    }

    // コミットされずに破棄されたトランザクションはロールバックされてからプールへ戻る
    pub async fn begin(&self) -> AppResult<sqlx::Transaction<'_, sqlx::Postgres>> {
        self.0.begin().await.map_err(AppError::TransactionError)
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.0).await
    }
}

// 接続数の上限と取得待ちのタイムアウトを持つプールを作る
pub fn connect_database_with(cfg: &DatabaseConfig) -> ConnectionPool {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect_lazy_with(make_pg_connect_options(cfg));
    ConnectionPool(pool)
}

/// 一意制約違反を `Conflict` に、それ以外を `SpecificOperationError` に変換する
pub(crate) fn conflict_on_unique_violation(
    message: impl Into<String>,
) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => AppError::Conflict(message.into()),
        _ => AppError::SpecificOperationError(e),
    }
}
