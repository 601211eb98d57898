use crate::config::ClientConfig;
use crate::core::base::{drop_columns, BaseApi, DataRequest, QueryParams};
use crate::core::{AsteroidName, ConfigProvider, Record, Reply};
use crate::utils::error::{Result, SspError};
use crate::utils::validation::{format_query_date, validate_date_time};
use serde_json::Value;

/// 預測流程內部使用的欄位，預設不回傳給使用者
pub const DROPPED_COLUMNS: &[&str] = &[
    "created_at",
    "updated_at",
    "job_id",
    "hash_id",
    "catalog",
    "predict_step",
    "bsp_source",
    "bsp_planetary",
    "leap_seconds",
    "nima",
    "aberration_corrections",
    "ephemeris_version",
];

/// 掩星預測查詢條件
#[derive(Debug, Clone, PartialEq)]
pub struct OccultationQuery {
    pub name: Vec<AsteroidName>,
    pub number: Option<u64>,
    pub date_time_after: Option<String>,
    pub date_time_before: Option<String>,
    pub limit: Option<usize>,
    pub show_bar: bool,
    /// 保留 `DROPPED_COLUMNS` 中的欄位
    pub full_output: bool,
}

impl Default for OccultationQuery {
    fn default() -> Self {
        Self {
            name: Vec::new(),
            number: None,
            date_time_after: None,
            date_time_before: None,
            limit: Some(crate::config::PAGE_SIZE),
            show_bar: true,
            full_output: false,
        }
    }
}

impl OccultationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<AsteroidName>) -> Self {
        self.name.push(name.into());
        self
    }

    pub fn number(mut self, number: u64) -> Self {
        self.number = Some(number);
        self
    }

    pub fn after(mut self, date_time: impl Into<String>) -> Self {
        self.date_time_after = Some(date_time.into());
        self
    }

    pub fn before(mut self, date_time: impl Into<String>) -> Self {
        self.date_time_before = Some(date_time.into());
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn show_bar(mut self, show_bar: bool) -> Self {
        self.show_bar = show_bar;
        self
    }

    pub fn full_output(mut self, full_output: bool) -> Self {
        self.full_output = full_output;
        self
    }

    /// 驗證日期並轉成 `get_data` 的請求
    pub fn to_request(&self) -> Result<DataRequest> {
        let mut params = QueryParams::new();

        if !self.name.is_empty() {
            let names: Vec<Value> = self
                .name
                .iter()
                .map(|name| match name {
                    AsteroidName::Name(name) => Value::from(name.as_str()),
                    AsteroidName::Number(number) => Value::from(*number),
                })
                .collect();
            params.insert("name".to_string(), Value::Array(names));
        }

        if let Some(number) = self.number {
            params.insert("number".to_string(), Value::from(number));
        }

        let after = self
            .date_time_after
            .as_deref()
            .map(|value| validate_date_time("date_time_after", value))
            .transpose()?;
        let before = self
            .date_time_before
            .as_deref()
            .map(|value| validate_date_time("date_time_before", value))
            .transpose()?;

        if let (Some(after), Some(before)) = (after, before) {
            if after > before {
                return Err(SspError::validation(format!(
                    "date_time_after ({}) must not be later than date_time_before ({})",
                    format_query_date(&after),
                    format_query_date(&before)
                )));
            }
        }

        if let Some(after) = after {
            params.insert("date_time_after".to_string(), Value::from(format_query_date(&after)));
        }
        if let Some(before) = before {
            params.insert("date_time_before".to_string(), Value::from(format_query_date(&before)));
        }

        Ok(DataRequest {
            params,
            id: None,
            limit: self.limit,
            show_bar: self.show_bar,
        })
    }
}

/// 掩星預測端點 (預設 `/api/occultations`)
pub struct Prediction<C: ConfigProvider = ClientConfig> {
    api: BaseApi<C>,
}

impl Default for Prediction<ClientConfig> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Prediction<ClientConfig> {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(ClientConfig::with_base_url(base_url))
    }
}

impl<C: ConfigProvider> Prediction<C> {
    pub fn new(config: C) -> Self {
        let endpoint = config.prediction_endpoint().to_string();
        Self {
            api: BaseApi::new(config, endpoint),
        }
    }

    pub fn api(&self) -> &BaseApi<C> {
        &self.api
    }

    /// `{endpoint}/{id}/{name}/`，id 可省略
    pub async fn fetch_endpoint(&self, endpoint: &str, id: Option<u64>) -> Result<Reply<Value>> {
        let id_segment = id.map(|id| format!("{}/", id)).unwrap_or_default();
        let url = format!("{}/{}{}/", self.api.endpoint_url(), id_segment, endpoint);
        self.api.fetch_json(&url, &[]).await
    }

    pub async fn asteroids_with_prediction(&self) -> Result<Reply<Value>> {
        self.fetch_endpoint("asteroids_with_prediction", None).await
    }

    pub async fn dynamical_classes_with_prediction(&self) -> Result<Reply<Value>> {
        self.fetch_endpoint("base_dynclass_with_prediction", None).await
    }

    pub async fn dynamical_subclasses_with_prediction(&self) -> Result<Reply<Value>> {
        self.fetch_endpoint("dynclass_with_prediction", None).await
    }

    pub async fn get_data(&self, request: &DataRequest) -> Result<Reply<Vec<Record>>> {
        self.api.get_data(request).await
    }

    /// 依名稱、編號與日期區間查詢掩星預測
    pub async fn occultations(&self, query: &OccultationQuery) -> Result<Reply<Vec<Record>>> {
        let request = query.to_request()?;
        tracing::info!("🔭 Querying occultations with {:?}", request.params);

        let reply = self.api.get_data(&request).await?;
        if query.full_output {
            return Ok(reply);
        }

        Ok(reply.map(|records| {
            records
                .into_iter()
                .map(|record| drop_columns(record, DROPPED_COLUMNS))
                .collect()
        }))
    }
}
