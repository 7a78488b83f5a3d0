// region:    --- Imports
use charity_auction_service::catalog::AuctionCatalog;
use charity_auction_service::database::DatabaseManager;
use charity_auction_service::engine::AuctionEngine;
use charity_auction_service::handlers::{self, AdminSecret};
use charity_auction_service::ledger::SqliteBidLedger;
use charity_auction_service::status::SqliteStatusStore;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 카탈로그 로드 (정적 아티팩트, 런타임 중 불변)
    let catalog_path =
        std::env::var("CATALOG_PATH").unwrap_or_else(|_| "data/auctions.json".to_string());
    let catalog = match AuctionCatalog::load(Path::new(&catalog_path)) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("{:<12} --> 카탈로그 로드 실패: {:?}", "Main", e);
            return Err(e);
        }
    };

    // 기본 데이터 디렉터리 준비 (sqlite 파일 위치)
    std::fs::create_dir_all("data")?;

    // DatabaseManager 생성
    let db_manager = match DatabaseManager::new().await {
        Ok(db_manager) => db_manager,
        Err(e) => {
            error!("{:<12} --> 데이터베이스 연결 실패: {:?}", "Main", e);
            return Err(e.into());
        }
    };

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 엔진 생성 (시작 시 한 번 생성, 모든 요청 핸들러에 공유)
    let pool = db_manager.get_pool();
    let engine = Arc::new(AuctionEngine::new(
        catalog,
        SqliteBidLedger::new(Arc::clone(&pool)),
        SqliteStatusStore::new(pool),
    ));

    // 관리자 비밀 토큰 (권한 검사는 표현 계층에서만 수행)
    let admin = Arc::new(AdminSecret::from_env());

    // 라우터 설정
    let routes_all = handlers::routes(engine, admin);

    // 리스너 생성
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
