/// 경매 상태 저장소
/// 슬러그별 open/closed 수명주기 상태의 내구성 있는 upsert 저장소
// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

// endregion: --- Imports

// region:    --- Status Model

pub const STATUS_OPEN: &str = "open";
pub const STATUS_CLOSED: &str = "closed";

/// 경매 수명주기 상태
/// closed_at은 관리자가 경매를 닫은 시점에 항상 함께 기록됨
#[derive(Debug, Clone, FromRow)]
pub struct AuctionStatus {
    pub status: String,
    pub closed_at: Option<DateTime<Utc>>,
}

impl AuctionStatus {
    pub fn open() -> Self {
        Self {
            status: STATUS_OPEN.to_string(),
            closed_at: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == STATUS_CLOSED
    }
}

// endregion: --- Status Model

// region:    --- Queries

/// 상태 조회
const GET_STATUS: &str = "SELECT status, closed_at FROM auction_status WHERE slug = ?1";

/// 상태 upsert (open/closed 공용, 멱등)
const UPSERT_STATUS: &str = r#"
    INSERT INTO auction_status (slug, status, closed_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT (slug) DO UPDATE SET
        status = excluded.status,
        closed_at = excluded.closed_at
"#;

// endregion: --- Queries

// region:    --- Status Store

/// 경매 상태 저장 계약
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// 상태 조회 (행이 없으면 open으로 간주)
    async fn get(&self, slug: &str) -> Result<AuctionStatus, sqlx::Error>;

    /// 경매 열기 (closed_at 제거)
    async fn set_open(&self, slug: &str) -> Result<(), sqlx::Error>;

    /// 경매 닫기 (closed_at 기록)
    async fn set_closed(&self, slug: &str, at: DateTime<Utc>) -> Result<(), sqlx::Error>;
}

/// 경매 상태 저장소 구현체
pub struct SqliteStatusStore {
    pool: Arc<SqlitePool>,
}

impl SqliteStatusStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusStore for SqliteStatusStore {
    async fn get(&self, slug: &str) -> Result<AuctionStatus, sqlx::Error> {
        let row = sqlx::query_as::<_, AuctionStatus>(GET_STATUS)
            .bind(slug)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.unwrap_or_else(AuctionStatus::open))
    }

    async fn set_open(&self, slug: &str) -> Result<(), sqlx::Error> {
        sqlx::query(UPSERT_STATUS)
            .bind(slug)
            .bind(STATUS_OPEN)
            .bind(None::<DateTime<Utc>>)
            .execute(&*self.pool)
            .await?;

        Ok(())
    }

    async fn set_closed(&self, slug: &str, at: DateTime<Utc>) -> Result<(), sqlx::Error> {
        sqlx::query(UPSERT_STATUS)
            .bind(slug)
            .bind(STATUS_CLOSED)
            .bind(at)
            .execute(&*self.pool)
            .await?;

        Ok(())
    }
}

// endregion: --- Status Store
