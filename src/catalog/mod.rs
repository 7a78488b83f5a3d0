/// 경매 카탈로그
/// 정적 아티팩트(data/auctions.json)에서 시작 시 한 번 로드되는 읽기 전용 품목 목록
// region:    --- Imports
use crate::currency;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Auction Definition

/// 경매 품목 정의 (런타임 중 변경되지 않음)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuctionDefinition {
    pub slug: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "startingBid", with = "currency::serde_dollars")]
    pub starting_bid_cents: i64,
    pub image: String,
    pub category: String,
}

// endregion: --- Auction Definition

// region:    --- Auction Catalog

/// 슬러그 -> 품목 정의 매핑 (아티팩트 내 순서 유지)
pub struct AuctionCatalog {
    auctions: Vec<AuctionDefinition>,
    index: HashMap<String, usize>,
}

impl AuctionCatalog {
    /// 카탈로그 아티팩트 파일 로드
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)?;
        let definitions: Vec<AuctionDefinition> = serde_json::from_str(&raw)?;
        info!(
            "{:<12} --> 카탈로그 로드 완료: {}개 품목",
            "Catalog",
            definitions.len()
        );
        Ok(Self::from_definitions(definitions))
    }

    /// 품목 정의 목록으로 카탈로그 구성
    pub fn from_definitions(definitions: Vec<AuctionDefinition>) -> Self {
        let mut auctions: Vec<AuctionDefinition> = Vec::with_capacity(definitions.len());
        let mut index = HashMap::new();
        for definition in definitions {
            // 중복 슬러그는 마지막 정의가 우선
            match index.get(&definition.slug).copied() {
                Some(pos) => {
                    warn!(
                        "{:<12} --> 중복 슬러그, 마지막 정의로 대체: {}",
                        "Catalog", definition.slug
                    );
                    auctions[pos] = definition;
                }
                None => {
                    index.insert(definition.slug.clone(), auctions.len());
                    auctions.push(definition);
                }
            }
        }
        Self { auctions, index }
    }

    /// 슬러그로 품목 조회 (None = 미등록 품목, 호출자가 404로 변환)
    pub fn get(&self, slug: &str) -> Option<&AuctionDefinition> {
        self.index.get(slug).map(|&pos| &self.auctions[pos])
    }

    /// 전체 품목 목록
    pub fn list(&self) -> &[AuctionDefinition] {
        &self.auctions
    }
}

// endregion: --- Auction Catalog
