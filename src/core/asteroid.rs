use crate::config::ClientConfig;
use crate::core::base::{format_name_value, BaseApi, DataRequest};
use crate::core::{ApiFailure, AsteroidName, ConfigProvider, Record, Reply};
use crate::utils::error::Result;
use serde_json::Value;

pub const NAME_REQUIRED: &str = "This endpoint requires a name. Please provide a name.";

/// `/api/asteroids` 端點
pub struct Asteroid<C: ConfigProvider = ClientConfig> {
    api: BaseApi<C>,
}

impl Default for Asteroid<ClientConfig> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Asteroid<ClientConfig> {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(ClientConfig::with_base_url(base_url))
    }
}

impl<C: ConfigProvider> Asteroid<C> {
    pub fn new(config: C) -> Self {
        let endpoint = config.asteroid_endpoint().to_string();
        Self {
            api: BaseApi::new(config, endpoint),
        }
    }

    pub fn api(&self) -> &BaseApi<C> {
        &self.api
    }

    /// 這個端點一次只接受一個名稱，多給的會被忽略
    pub fn format_single_name(names: &[AsteroidName]) -> Option<String> {
        let first = names.first()?;
        if names.len() > 1 {
            tracing::warn!(
                "⚠️ This endpoint only accepts one name at a time. Using the first name: {}",
                first
            );
        }
        Some(format_name_value(&first.to_string()))
    }

    async fn fetch_endpoint(&self, endpoint: &str, name: Option<&str>) -> Result<Reply<Value>> {
        let url = format!("{}/{}/", self.api.endpoint_url(), endpoint);
        let query: Vec<(String, String)> = name
            .map(|n| vec![("name".to_string(), n.to_string())])
            .unwrap_or_default();
        self.api.fetch_json(&url, &query).await
    }

    pub async fn dynamical_classes(&self) -> Result<Reply<Value>> {
        self.fetch_endpoint("base_dynclasses", None).await
    }

    pub async fn count(&self) -> Result<Reply<Value>> {
        self.fetch_endpoint("count", None).await
    }

    pub async fn dynamical_subclasses(&self) -> Result<Reply<Value>> {
        self.fetch_endpoint("dynclasses", None).await
    }

    /// 指定小行星的預測資料；沒有名稱時不送出請求
    pub async fn with_prediction(&self, names: &[AsteroidName]) -> Result<Reply<Value>> {
        match Self::format_single_name(names) {
            Some(name) => self.fetch_endpoint("with_prediction", Some(&name)).await,
            None => {
                tracing::warn!("⚠️ {}", NAME_REQUIRED);
                Ok(Reply::Failure(ApiFailure::message(NAME_REQUIRED)))
            }
        }
    }

    /// 分頁取得小行星清單
    pub async fn get_data(&self, request: &DataRequest) -> Result<Reply<Vec<Record>>> {
        self.api.get_data(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_single_name_uses_first() {
        let names = vec![AsteroidName::from("chariklo"), AsteroidName::from("ceres")];
        assert_eq!(
            Asteroid::<ClientConfig>::format_single_name(&names).as_deref(),
            Some("Chariklo")
        );
    }

    #[test]
    fn test_format_single_name_numbers_and_empty() {
        let names = vec![AsteroidName::from(10199u64)];
        assert_eq!(
            Asteroid::<ClientConfig>::format_single_name(&names).as_deref(),
            Some("10199")
        );
        assert_eq!(Asteroid::<ClientConfig>::format_single_name(&[]), None);
    }

    #[tokio::test]
    async fn test_with_prediction_without_name_makes_no_request() {
        // 不可達的位址：若真的送出請求會得到連線錯誤而不是 Failure
        let asteroid = Asteroid::with_base_url("http://127.0.0.1:9");

        let reply = asteroid.with_prediction(&[]).await.unwrap();

        assert_eq!(reply.failure().unwrap().error, NAME_REQUIRED);
        assert_eq!(reply.failure().unwrap().status_code, None);
    }
}
