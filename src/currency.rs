/// 고정 소수점 통화 처리
/// 금액은 프로세스 내부와 데이터베이스에서 모두 정수 센트(i64)로 취급
/// 센트 미만 자릿수는 반올림하지 않고 파싱 단계에서 거부

// region:    --- Parsing

/// 사용자 입력 금액 문자열을 센트로 파싱
/// 허용 형식: 숫자 + 선택적 소수점 + 최대 두 자리 소수 (예: "10", "10.5", "10.50")
pub fn parse_cents(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // 센트 미만 정밀도는 허용하지 않음
    if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let fraction_cents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse::<i64>().ok()?,
    };

    whole.checked_mul(100)?.checked_add(fraction_cents)
}

/// 센트를 두 자리 소수 문자열로 포맷 (예: 1050 -> "10.50")
pub fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

// endregion: --- Parsing

// region:    --- Serde Adapters

/// JSON 경계에서 금액을 "10.50" 형태의 문자열로 주고받기 위한 어댑터
pub mod serde_dollars {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_cents(*cents))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_cents(&raw)
            .ok_or_else(|| de::Error::custom(format!("잘못된 금액 형식: {}", raw)))
    }
}

/// Option<i64> 금액 직렬화 어댑터 (null = 입찰 없음)
pub mod serde_dollars_opt {
    use serde::Serializer;

    pub fn serialize<S>(cents: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match cents {
            Some(cents) => serializer.serialize_str(&super::format_cents(*cents)),
            None => serializer.serialize_none(),
        }
    }
}

// endregion: --- Serde Adapters
