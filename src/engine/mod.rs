/// 경매 상태 엔진
/// 현재 최고 입찰/입찰 수/상태 조회와 신규 입찰 수락 판정의 단일 권위
// region:    --- Imports
use crate::catalog::{AuctionCatalog, AuctionDefinition};
use crate::currency;
use crate::ledger::{Bid, BidLedger};
use crate::status::StatusStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Commands

/// 입찰 제출 명령
/// 금액은 원문 문자열 그대로 받아 엔진이 직접 파싱함
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidRequest {
    pub name: String,
    pub email: String,
    pub amount: String,
    #[serde(default)]
    pub message: Option<String>,
}

// endregion: --- Commands

// region:    --- Read Model

/// 표시용 파생 읽기 모델
/// 저장되지 않으며 매 조회마다 원장에서 재계산됨 (집계 캐시 없음)
#[derive(Debug, Serialize)]
pub struct AuctionView {
    #[serde(flatten)]
    pub definition: AuctionDefinition,
    #[serde(
        rename = "currentBid",
        serialize_with = "currency::serde_dollars_opt::serialize"
    )]
    pub current_bid_cents: Option<i64>,
    #[serde(rename = "highestBidder")]
    pub highest_bidder: Option<String>,
    #[serde(rename = "bidCount")]
    pub bid_count: i64,
    pub status: String,
    #[serde(rename = "closedAt")]
    pub closed_at: Option<DateTime<Utc>>,
}

// endregion: --- Read Model

// region:    --- Rejection

/// 입찰 거절 사유
/// 모두 예상 가능한 사용자 입력의 결과이며, 표현 계층이 사유별 메시지를 렌더링할 수
/// 있도록 구조화된 값으로 전달됨 (저장 계층 오류는 sqlx::Error로 별도 전파)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnknownAuction,
    InvalidName,
    InvalidEmail,
    InvalidAmount,
    AuctionClosed,
    BidTooLow { min_cents: i64 },
}

impl RejectReason {
    /// 기계 판독용 코드
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::UnknownAuction => "NOT_FOUND",
            RejectReason::InvalidName => "INVALID_NAME",
            RejectReason::InvalidEmail => "INVALID_EMAIL",
            RejectReason::InvalidAmount => "INVALID_AMOUNT",
            RejectReason::AuctionClosed => "AUCTION_CLOSED",
            RejectReason::BidTooLow { .. } => "BID_TOO_LOW",
        }
    }

    /// 사용자 표시 메시지 (사이트 표기 언어는 영어)
    pub fn message(&self) -> String {
        match self {
            RejectReason::UnknownAuction => "Auction not found".to_string(),
            RejectReason::InvalidName => "Name is required".to_string(),
            RejectReason::InvalidEmail => "Valid email is required".to_string(),
            RejectReason::InvalidAmount => "Bid amount must be a positive number".to_string(),
            RejectReason::AuctionClosed => "This auction has been closed".to_string(),
            RejectReason::BidTooLow { min_cents } => {
                format!("Bid must be higher than ${}", currency::format_cents(*min_cents))
            }
        }
    }
}

/// 입찰 제출 결과
#[derive(Debug)]
pub enum BidOutcome {
    Accepted(Bid),
    Rejected(RejectReason),
}

// endregion: --- Rejection

// region:    --- Auction Engine

/// 경매 상태 엔진
/// 시작 시 한 번 생성되어 Arc로 모든 요청 핸들러에 공유됨
/// 모든 쓰기는 이 엔진의 submit_bid / close_auction / reopen_auction을 통해서만 수행됨
pub struct AuctionEngine<L, S> {
    catalog: AuctionCatalog,
    ledger: L,
    status: S,
}

impl<L, S> AuctionEngine<L, S>
where
    L: BidLedger,
    S: StatusStore,
{
    pub fn new(catalog: AuctionCatalog, ledger: L, status: S) -> Self {
        Self {
            catalog,
            ledger,
            status,
        }
    }

    /// 단일 경매 뷰 조회 (None = 미등록 슬러그)
    /// 잠금 없는 스냅샷 읽기: 동시 쓰기와 경합하면 직전 상태가 보일 수 있음
    pub async fn view(&self, slug: &str) -> Result<Option<AuctionView>, sqlx::Error> {
        let definition = match self.catalog.get(slug) {
            Some(definition) => definition.clone(),
            None => return Ok(None),
        };

        Ok(Some(self.enrich(definition).await?))
    }

    /// 전체 경매 뷰 목록 (카탈로그 순서)
    pub async fn list_views(&self) -> Result<Vec<AuctionView>, sqlx::Error> {
        let mut views = Vec::with_capacity(self.catalog.list().len());
        for definition in self.catalog.list() {
            views.push(self.enrich(definition.clone()).await?);
        }
        Ok(views)
    }

    /// 입찰 이력 조회 (리더보드 순서, None = 미등록 슬러그)
    pub async fn bid_history(&self, slug: &str) -> Result<Option<Vec<Bid>>, sqlx::Error> {
        if self.catalog.get(slug).is_none() {
            return Ok(None);
        }

        Ok(Some(self.ledger.all_bids(slug).await?))
    }

    /// 입찰 제출
    /// 검증 파이프라인은 순서대로 빠르게 실패하며 단계별로 구분된 사유를 반환
    pub async fn submit_bid(
        &self,
        slug: &str,
        request: &PlaceBidRequest,
    ) -> Result<BidOutcome, sqlx::Error> {
        // 1. 품목 확인
        let definition = match self.catalog.get(slug) {
            Some(definition) => definition,
            None => return Ok(BidOutcome::Rejected(RejectReason::UnknownAuction)),
        };

        // 2. 이름 검증
        let name = request.name.trim();
        if name.is_empty() {
            return Ok(BidOutcome::Rejected(RejectReason::InvalidName));
        }

        // 3. 이메일 검증 (저마찰 입찰을 위한 최소한의 확인, RFC 검증 아님)
        let email = request.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Ok(BidOutcome::Rejected(RejectReason::InvalidEmail));
        }

        // 4. 금액 파싱
        let amount_cents = match currency::parse_cents(&request.amount) {
            Some(amount_cents) if amount_cents > 0 => amount_cents,
            _ => return Ok(BidOutcome::Rejected(RejectReason::InvalidAmount)),
        };

        // 5. 경매 상태 확인
        if self.status.get(slug).await?.is_closed() {
            return Ok(BidOutcome::Rejected(RejectReason::AuctionClosed));
        }

        // 6. 현재 최저 수락 기준 확인
        let min_cents = self.current_min_cents(slug, definition).await?;
        if amount_cents <= min_cents {
            return Ok(BidOutcome::Rejected(RejectReason::BidTooLow { min_cents }));
        }

        // 7. 조건부 원자적 추가
        //    수락 여부는 단계 6의 읽기가 아니라 원장의 단일 문장 가드가 최종 결정:
        //    동시 제출이 먼저 기록되었으면 가드가 실패하고 최신 기준으로 거절됨
        let message = request
            .message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty());

        match self
            .ledger
            .append_if_higher(
                slug,
                name,
                email,
                amount_cents,
                message,
                definition.starting_bid_cents,
                Utc::now(),
            )
            .await?
        {
            Some(bid) => {
                info!(
                    "{:<12} --> 입찰 수락: {} / {} / ${}",
                    "Engine",
                    slug,
                    name,
                    currency::format_cents(amount_cents)
                );
                Ok(BidOutcome::Accepted(bid))
            }
            None => {
                // 경합에서 패배한 제출: 기준을 다시 읽어 사용자에게 최신 최소 금액 안내
                let min_cents = self.current_min_cents(slug, definition).await?;
                info!(
                    "{:<12} --> 입찰 거절 (경합): {} (최소 ${})",
                    "Engine",
                    slug,
                    currency::format_cents(min_cents)
                );
                Ok(BidOutcome::Rejected(RejectReason::BidTooLow { min_cents }))
            }
        }
    }

    /// 경매 닫기 (권한 검사는 표현 계층 책임, 멱등)
    pub async fn close_auction(&self, slug: &str, at: DateTime<Utc>) -> Result<(), sqlx::Error> {
        info!("{:<12} --> 경매 닫기: {}", "Engine", slug);
        self.status.set_closed(slug, at).await
    }

    /// 경매 다시 열기 (멱등)
    pub async fn reopen_auction(&self, slug: &str) -> Result<(), sqlx::Error> {
        info!("{:<12} --> 경매 다시 열기: {}", "Engine", slug);
        self.status.set_open(slug).await
    }

    /// 현재 최저 수락 기준 (최고 입찰가, 입찰이 없으면 시작가)
    async fn current_min_cents(
        &self,
        slug: &str,
        definition: &AuctionDefinition,
    ) -> Result<i64, sqlx::Error> {
        Ok(self
            .ledger
            .highest_bid(slug)
            .await?
            .map(|bid| bid.amount_cents)
            .unwrap_or(definition.starting_bid_cents))
    }

    /// 정의 + 원장 + 상태를 조합해 뷰 구성
    async fn enrich(&self, definition: AuctionDefinition) -> Result<AuctionView, sqlx::Error> {
        let highest = self.ledger.highest_bid(&definition.slug).await?;
        let bid_count = self.ledger.count(&definition.slug).await?;
        let status = self.status.get(&definition.slug).await?;

        Ok(AuctionView {
            current_bid_cents: highest.as_ref().map(|bid| bid.amount_cents),
            highest_bidder: highest.map(|bid| bid.name),
            bid_count,
            status: status.status,
            closed_at: status.closed_at,
            definition,
        })
    }
}

// endregion: --- Auction Engine
