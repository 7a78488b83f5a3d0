/// 입찰 원장
/// 모든 입찰의 추가 전용(append-only) 기록: 기존 행은 수정/삭제되지 않음
// region:    --- Imports
use crate::currency;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

// endregion: --- Imports

// region:    --- Bid Model

/// 입찰 모델
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Bid {
    pub id: i64,
    #[serde(rename = "auctionSlug")]
    pub auction_slug: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "amount", with = "currency::serde_dollars")]
    pub amount_cents: i64,
    pub message: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

// endregion: --- Bid Model

// region:    --- Queries

/// 최고 입찰 조회 (동률은 낮은 id 우선)
const GET_HIGHEST_BID: &str = r#"
    SELECT id, auction_slug, name, email, amount_cents, message, created_at
    FROM bids
    WHERE auction_slug = ?1
    ORDER BY amount_cents DESC, id ASC
    LIMIT 1
"#;

/// 입찰 이력 조회 (리더보드 순서: 금액 내림차순, 동률은 낮은 id 우선)
const GET_ALL_BIDS: &str = r#"
    SELECT id, auction_slug, name, email, amount_cents, message, created_at
    FROM bids
    WHERE auction_slug = ?1
    ORDER BY amount_cents DESC, id ASC
"#;

/// 입찰 수 조회
const COUNT_BIDS: &str = "SELECT COUNT(*) FROM bids WHERE auction_slug = ?1";

/// 조건부 추가
/// 현재 최고가(입찰이 없으면 시작가)보다 높은 경우에만 삽입
/// 비교와 삽입이 단일 문장으로 수행되므로 동시 제출 간 경합에서도
/// 수락된 금액의 순증가 불변식이 유지됨
const APPEND_IF_HIGHER: &str = r#"
    INSERT INTO bids (auction_slug, name, email, amount_cents, message, created_at)
    SELECT ?1, ?2, ?3, ?4, ?5, ?6
    WHERE ?4 > COALESCE(
        (SELECT MAX(amount_cents) FROM bids WHERE auction_slug = ?1),
        ?7
    )
    RETURNING id, auction_slug, name, email, amount_cents, message, created_at
"#;

// endregion: --- Queries

// region:    --- Bid Ledger

/// 입찰 원장 저장 계약
#[async_trait]
pub trait BidLedger: Send + Sync {
    /// 최고 입찰 조회
    async fn highest_bid(&self, slug: &str) -> Result<Option<Bid>, sqlx::Error>;

    /// 전체 입찰 이력 조회 (리더보드 순서)
    async fn all_bids(&self, slug: &str) -> Result<Vec<Bid>, sqlx::Error>;

    /// 입찰 수 조회
    async fn count(&self, slug: &str) -> Result<i64, sqlx::Error>;

    /// 조건부 원자적 추가
    /// 성공 시 id와 created_at이 채워진 새 입찰을 반환하고,
    /// 금액이 더 이상 최고가 기준을 넘지 못하면 None을 반환
    #[allow(clippy::too_many_arguments)]
    async fn append_if_higher(
        &self,
        slug: &str,
        name: &str,
        email: &str,
        amount_cents: i64,
        message: Option<&str>,
        floor_cents: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Bid>, sqlx::Error>;
}

/// 입찰 원장 구현체
pub struct SqliteBidLedger {
    pool: Arc<SqlitePool>,
}

impl SqliteBidLedger {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BidLedger for SqliteBidLedger {
    async fn highest_bid(&self, slug: &str) -> Result<Option<Bid>, sqlx::Error> {
        sqlx::query_as::<_, Bid>(GET_HIGHEST_BID)
            .bind(slug)
            .fetch_optional(&*self.pool)
            .await
    }

    async fn all_bids(&self, slug: &str) -> Result<Vec<Bid>, sqlx::Error> {
        sqlx::query_as::<_, Bid>(GET_ALL_BIDS)
            .bind(slug)
            .fetch_all(&*self.pool)
            .await
    }

    async fn count(&self, slug: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(COUNT_BIDS)
            .bind(slug)
            .fetch_one(&*self.pool)
            .await
    }

    async fn append_if_higher(
        &self,
        slug: &str,
        name: &str,
        email: &str,
        amount_cents: i64,
        message: Option<&str>,
        floor_cents: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Bid>, sqlx::Error> {
        sqlx::query_as::<_, Bid>(APPEND_IF_HIGHER)
            .bind(slug)
            .bind(name)
            .bind(email)
            .bind(amount_cents)
            .bind(message)
            .bind(at)
            .bind(floor_cents)
            .fetch_optional(&*self.pool)
            .await
    }
}

// endregion: --- Bid Ledger
