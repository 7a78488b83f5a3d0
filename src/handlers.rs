// region:    --- Imports
use crate::currency;
use crate::engine::{AuctionEngine, BidOutcome, PlaceBidRequest, RejectReason};
use crate::ledger::SqliteBidLedger;
use crate::status::SqliteStatusStore;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// endregion: --- Imports

/// 기본 엔진 구성 (SQLite 원장 + SQLite 상태 저장소)
pub type SqliteAuctionEngine = AuctionEngine<SqliteBidLedger, SqliteStatusStore>;

type AppState = (Arc<SqliteAuctionEngine>, Arc<AdminSecret>);

// region:    --- Admin Secret

/// 관리자 작업용 공유 비밀 토큰
/// 엔진은 권한 검사를 하지 않으므로 close/reopen 호출 전에 핸들러가 확인함
pub struct AdminSecret(String);

impl AdminSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// ADMIN_PASS 환경 변수에서 로드
    pub fn from_env() -> Self {
        Self(std::env::var("ADMIN_PASS").unwrap_or_else(|_| "werpeace2026".to_string()))
    }

    pub fn verify(&self, supplied: &str) -> bool {
        self.0 == supplied
    }
}

/// 관리자 요청 본문
#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub pass: String,
}

/// 관리자 조회용 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    #[serde(default)]
    pub pass: String,
}

// endregion: --- Admin Secret

// region:    --- Router

/// 라우터 구성
pub fn routes(engine: Arc<SqliteAuctionEngine>, admin: Arc<AdminSecret>) -> Router {
    // 정적 호스트에서의 갱신 폴링을 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/auctions", get(handle_get_auctions))
        .route("/auction/:slug", get(handle_get_auction))
        .route("/auction/:slug/bid", post(handle_place_bid))
        .route("/api/auction/:slug/bids", get(handle_get_bid_feed))
        .route("/admin/auctions", get(handle_admin_auctions))
        .route("/admin/close/:slug", post(handle_close_auction))
        .route("/admin/reopen/:slug", post(handle_reopen_auction))
        .layer(cors)
        .with_state((engine, admin))
}

// endregion: --- Router

// region:    --- Public Handlers

/// 전체 경매 목록 조회
async fn handle_get_auctions(State((engine, _)): State<AppState>) -> Response {
    info!("{:<12} --> 전체 경매 목록 조회", "Handler");
    match engine.list_views().await {
        Ok(views) => Json(views).into_response(),
        Err(e) => internal_error(e),
    }
}

/// 단일 경매 조회
async fn handle_get_auction(
    State((engine, _)): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    info!("{:<12} --> 경매 조회: {}", "Handler", slug);
    match engine.view(&slug).await {
        Ok(Some(view)) => Json(view).into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error(e),
    }
}

/// 실시간 갱신용 읽기 모델 (경매 뷰 + 입찰 이력)
async fn handle_get_bid_feed(
    State((engine, _)): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    info!("{:<12} --> 입찰 피드 조회: {}", "Handler", slug);
    let view = match engine.view(&slug).await {
        Ok(Some(view)) => view,
        Ok(None) => return not_found(),
        Err(e) => return internal_error(e),
    };

    match engine.bid_history(&slug).await {
        Ok(Some(bids)) => Json(serde_json::json!({
            "auction": view,
            "bids": bids,
        }))
        .into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error(e),
    }
}

/// 입찰 제출 처리
async fn handle_place_bid(
    State((engine, _)): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<PlaceBidRequest>,
) -> Response {
    info!(
        "{:<12} --> 입찰 요청 처리 시작: {} {:?}",
        "Handler", slug, request
    );
    match engine.submit_bid(&slug, &request).await {
        Ok(BidOutcome::Accepted(bid)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Your bid has been placed!",
                "bid": bid,
            })),
        )
            .into_response(),
        Ok(BidOutcome::Rejected(reason)) => rejection(reason),
        Err(e) => internal_error(e),
    }
}

// endregion: --- Public Handlers

// region:    --- Admin Handlers

/// 관리자 패널용 경매 목록 조회
async fn handle_admin_auctions(
    State((engine, admin)): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Response {
    if !admin.verify(&query.pass) {
        return unauthorized();
    }

    info!("{:<12} --> 관리자 경매 목록 조회", "Admin");
    match engine.list_views().await {
        Ok(views) => Json(views).into_response(),
        Err(e) => internal_error(e),
    }
}

/// 경매 닫기
async fn handle_close_auction(
    State((engine, admin)): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<AdminRequest>,
) -> Response {
    if !admin.verify(&request.pass) {
        return unauthorized();
    }

    info!("{:<12} --> 경매 닫기 요청: {}", "Admin", slug);
    match engine.close_auction(&slug, Utc::now()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Auction closed" })),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// 경매 다시 열기
async fn handle_reopen_auction(
    State((engine, admin)): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<AdminRequest>,
) -> Response {
    if !admin.verify(&request.pass) {
        return unauthorized();
    }

    info!("{:<12} --> 경매 다시 열기 요청: {}", "Admin", slug);
    match engine.reopen_auction(&slug).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Auction reopened" })),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

// endregion: --- Admin Handlers

// region:    --- Responses

/// 거절 사유를 구조화된 응답으로 변환
fn rejection(reason: RejectReason) -> Response {
    let status = match reason {
        RejectReason::UnknownAuction => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };

    let mut body = serde_json::json!({
        "error": reason.message(),
        "code": reason.code(),
    });
    // BID_TOO_LOW는 사용자 안내용 최소 금액을 함께 전달
    if let RejectReason::BidTooLow { min_cents } = reason {
        body["minBid"] = serde_json::Value::String(currency::format_cents(min_cents));
    }

    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Auction not found", "code": "NOT_FOUND" })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

fn internal_error(e: sqlx::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}

// endregion: --- Responses
