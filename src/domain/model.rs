use serde::{Deserialize, Serialize};
use std::fmt;

/// API 回傳的單筆資料，保留欄位原始順序
pub type Record = serde_json::Map<String, serde_json::Value>;

/// 分頁端點的回應格式 `{count, results}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub count: usize,
    #[serde(default)]
    pub results: Vec<Record>,
}

/// HTTP 失敗以資料形式回傳，而不是錯誤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFailure {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ApiFailure {
    pub const FETCH_FAILED: &'static str = "An error occurred fetching the data";

    pub fn from_status(status_code: u16) -> Self {
        Self {
            error: Self::FETCH_FAILED.to_string(),
            status_code: Some(status_code),
        }
    }

    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status_code: None,
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (status {})", self.error, code),
            None => write!(f, "{}", self.error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Data(T),
    Failure(ApiFailure),
}

impl<T> Reply<T> {
    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Failure(_))
    }

    pub fn data(self) -> Option<T> {
        match self {
            Reply::Data(data) => Some(data),
            Reply::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Reply::Data(_) => None,
            Reply::Failure(failure) => Some(failure),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Reply<U> {
        match self {
            Reply::Data(data) => Reply::Data(f(data)),
            Reply::Failure(failure) => Reply::Failure(failure),
        }
    }
}

/// 小行星名稱或編號
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsteroidName {
    Name(String),
    Number(u64),
}

impl fmt::Display for AsteroidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsteroidName::Name(name) => write!(f, "{}", name),
            AsteroidName::Number(number) => write!(f, "{}", number),
        }
    }
}

impl From<&str> for AsteroidName {
    fn from(value: &str) -> Self {
        AsteroidName::Name(value.to_string())
    }
}

impl From<String> for AsteroidName {
    fn from(value: String) -> Self {
        AsteroidName::Name(value)
    }
}

impl From<u32> for AsteroidName {
    fn from(value: u32) -> Self {
        AsteroidName::Number(value.into())
    }
}

impl From<u64> for AsteroidName {
    fn from(value: u64) -> Self {
        AsteroidName::Number(value)
    }
}
