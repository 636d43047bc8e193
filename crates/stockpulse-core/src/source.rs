use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::http_client::{Charset, HttpRequest};
use crate::wire::Dialect;
use crate::{InstrumentCode, Market, ValidationError};

const SINA_ENDPOINT: &str = "https://hq.sinajs.cn/list=";
const SINA_REFERER: &str = "https://finance.sina.com.cn/";
const TENCENT_ENDPOINT: &str = "https://qt.gtimg.cn/q=";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Upstream quote vendor. Each vendor speaks exactly one wire dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    Sina,
    Tencent,
}

impl QuoteSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sina => "sina",
            Self::Tencent => "tencent",
        }
    }

    pub const fn dialect(self) -> Dialect {
        match self {
            Self::Sina => Dialect::Sina,
            Self::Tencent => Dialect::Tencent,
        }
    }

    pub const fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Sina => Self::Sina,
            Dialect::Tencent => Self::Tencent,
        }
    }

    pub const fn charset(self) -> Charset {
        Charset::Gb18030
    }

    /// Sina's positional layout only covers mainland boards.
    pub const fn supports(self, market: Market) -> bool {
        match self {
            Self::Sina => market.is_domestic(),
            Self::Tencent => true,
        }
    }

    /// Code as the vendor expects it in the query string.
    pub fn request_code(self, code: &InstrumentCode) -> String {
        match (self, code.market()) {
            (Self::Tencent, Market::Us) => format!("us{}", code.body().to_ascii_uppercase()),
            _ => code.as_str().to_owned(),
        }
    }

    /// GET request for one batch of codes.
    pub fn batch_request(self, codes: &[InstrumentCode], timeout_ms: u64) -> HttpRequest {
        let joined = codes
            .iter()
            .map(|code| self.request_code(code))
            .collect::<Vec<_>>()
            .join(",");

        let request = match self {
            Self::Sina => HttpRequest::get(format!("{SINA_ENDPOINT}{joined}"))
                .with_header("referer", SINA_REFERER),
            Self::Tencent => HttpRequest::get(format!("{TENCENT_ENDPOINT}{joined}")),
        };

        request
            .with_header("user-agent", BROWSER_USER_AGENT)
            .with_timeout_ms(timeout_ms)
    }
}

impl Display for QuoteSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteSource {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sina" => Ok(Self::Sina),
            "tencent" | "qq" => Ok(Self::Tencent),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(raw: &[&str]) -> Vec<InstrumentCode> {
        raw.iter()
            .map(|code| InstrumentCode::parse(code).expect("valid code"))
            .collect()
    }

    #[test]
    fn sina_request_carries_referer() {
        let request = QuoteSource::Sina.batch_request(&codes(&["sh600000", "sz000001"]), 1_000);
        assert_eq!(request.url, "https://hq.sinajs.cn/list=sh600000,sz000001");
        assert_eq!(
            request.headers.get("referer").map(String::as_str),
            Some(SINA_REFERER)
        );
        assert!(request.headers.contains_key("user-agent"));
        assert_eq!(request.timeout_ms, 1_000);
    }

    #[test]
    fn tencent_uppercases_us_tickers() {
        let request =
            QuoteSource::Tencent.batch_request(&codes(&["hk00700", "us.brk.b", "sh600000"]), 500);
        assert_eq!(request.url, "https://qt.gtimg.cn/q=hk00700,usBRK.B,sh600000");
        assert!(!request.headers.contains_key("referer"));
    }

    #[test]
    fn sina_only_serves_domestic_markets() {
        assert!(QuoteSource::Sina.supports(Market::Beijing));
        assert!(!QuoteSource::Sina.supports(Market::HongKong));
        assert!(QuoteSource::Tencent.supports(Market::Us));
    }

    #[test]
    fn parses_source_names() {
        assert_eq!("Sina".parse::<QuoteSource>(), Ok(QuoteSource::Sina));
        assert_eq!("qq".parse::<QuoteSource>(), Ok(QuoteSource::Tencent));
        assert!(matches!(
            "yahoo".parse::<QuoteSource>(),
            Err(ValidationError::InvalidSource { .. })
        ));
    }
}
