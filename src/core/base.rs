use crate::config::ClientConfig;
use crate::core::{ApiFailure, ConfigProvider, Page, Record, Reply};
use crate::utils::error::{Result, SspError};
use crate::utils::progress::progress_bar;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

/// 查詢參數，保留插入順序
pub type QueryParams = serde_json::Map<String, Value>;

pub const PRINCIPAL_DESIGNATION: &str = "principal_designation";
pub const PROVISIONAL_DESIGNATION: &str = "provisional_designation";

/// `get_data` 的請求內容
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub params: QueryParams,
    pub id: Option<u64>,
    /// `None` 代表取回伺服器回報的全部筆數
    pub limit: Option<usize>,
    pub show_bar: bool,
}

impl Default for DataRequest {
    fn default() -> Self {
        Self {
            params: QueryParams::new(),
            id: None,
            limit: Some(crate::config::PAGE_SIZE),
            show_bar: true,
        }
    }
}

impl DataRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
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
}

/// 名稱統一格式：首字大寫其餘小寫；若以數字開頭則全部大寫
pub fn format_name_value(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    if first.is_ascii_digit() {
        return name.to_uppercase();
    }

    let rest = chars.as_str().to_lowercase();
    first.to_uppercase().chain(rest.chars()).collect()
}

/// 逗號串接多個格式化後的名稱
pub fn format_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| format_name_value(name.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// 改名欄位並保留它原本的位置；欄位不存在時原樣回傳
pub fn replace_key(record: Record, old_key: &str, new_key: &str) -> Record {
    if old_key == new_key || !record.contains_key(old_key) {
        return record;
    }

    record
        .into_iter()
        .filter(|(key, _)| key != new_key)
        .map(|(key, value)| {
            if key == old_key {
                (new_key.to_string(), value)
            } else {
                (key, value)
            }
        })
        .collect()
}

/// 移除指定欄位，其餘欄位順序不變
pub fn drop_columns(mut record: Record, columns: &[&str]) -> Record {
    for column in columns {
        // shift_remove 才能保留順序
        record.shift_remove(*column);
    }
    record
}

/// 把 JSON 值轉成查詢字串的值
fn query_value(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match query_value(key, item)? {
                    Some(part) if !item.is_array() => parts.push(part),
                    _ => return Err(SspError::type_mismatch(key, "string, number or list of those")),
                }
            }
            Ok(Some(parts.join(",")))
        }
        Value::Object(_) => Err(SspError::type_mismatch(key, "string, number or list of those")),
    }
}

pub(crate) fn to_query_pairs(params: &QueryParams) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        if let Some(value) = query_value(key, value)? {
            pairs.push((key.clone(), value));
        }
    }
    Ok(pairs)
}

/// 若 `name` 是清單，轉成格式化後的逗號字串
pub(crate) fn normalize_name_param(params: &mut QueryParams) -> Result<()> {
    let Some(Value::Array(items)) = params.get("name") else {
        return match params.get("name") {
            None | Some(Value::String(_)) | Some(Value::Number(_)) | Some(Value::Null) => Ok(()),
            Some(_) => Err(SspError::type_mismatch("name", "string, number or list of those")),
        };
    };

    let mut names = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => names.push(s.clone()),
            Value::Number(n) => names.push(n.to_string()),
            _ => return Err(SspError::type_mismatch("name", "list of strings or numbers")),
        }
    }

    params.insert("name".to_string(), Value::String(format_names(&names)));
    Ok(())
}

/// 所有 API 共用的 HTTP 存取與分頁邏輯
pub struct BaseApi<C: ConfigProvider = ClientConfig> {
    config: C,
    endpoint: String,
    client: Client,
}

impl<C: ConfigProvider> BaseApi<C> {
    pub fn new(config: C, endpoint: impl Into<String>) -> Self {
        Self {
            config,
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 端點的完整 URL (`{base_url}{endpoint}`)，結尾不含 '/'
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url(),
            self.endpoint.trim_end_matches('/')
        )
    }

    /// 建立帶有自訂標頭與超時設定的 GET 請求
    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        let mut request = self.client.get(url);

        for (key, value) in self.config.headers() {
            request = request.header(key, value);
        }

        if let Some(agent) = self.config.user_agent() {
            request = request.header(reqwest::header::USER_AGENT, agent);
        }

        if let Some(timeout) = self.config.timeout_seconds() {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        request
    }

    /// 取得任意 JSON 端點；非 2xx 回應轉成 `Reply::Failure`
    pub(crate) async fn fetch_json(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<Reply<Value>> {
        tracing::debug!("📡 Making API request to: {} {:?}", url, query);

        let response = self.get(url).query(query).send().await?;
        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);

        if !status.is_success() {
            tracing::warn!("⚠️ Request to {} failed with status {}", url, status);
            return Ok(Reply::Failure(ApiFailure::from_status(status.as_u16())));
        }

        Ok(Reply::Data(response.json().await?))
    }

    /// 取得單一頁面；指定 `id` 時取回單筆並包成一頁
    pub async fn fetch_data(&self, params: &QueryParams, id: Option<u64>) -> Result<Reply<Page>> {
        let reply = match id {
            Some(id) => {
                let url = format!("{}/{}", self.endpoint_url(), id);
                self.fetch_json(&url, &[]).await?
            }
            None => {
                let query = to_query_pairs(params)?;
                self.fetch_json(&self.endpoint_url(), &query).await?
            }
        };

        let value = match reply {
            Reply::Data(value) => value,
            Reply::Failure(failure) => return Ok(Reply::Failure(failure)),
        };

        let page = match (id, value) {
            (Some(_), Value::Object(record)) => Page {
                count: 1,
                results: vec![record],
            },
            (Some(_), other) => {
                return Err(SspError::ResponseError {
                    message: format!("expected a JSON object, got {}", other),
                })
            }
            (None, value) => serde_json::from_value(value)?,
        };

        Ok(Reply::Data(page))
    }

    /// 逐頁取回資料直到湊滿 `limit` (或伺服器回報的 `count`) 筆
    pub async fn get_data(&self, request: &DataRequest) -> Result<Reply<Vec<Record>>> {
        if request.limit == Some(0) {
            return Ok(Reply::Data(Vec::new()));
        }

        let mut params = request.params.clone();
        normalize_name_param(&mut params)?;

        let page_size = request
            .limit
            .map_or(self.config.page_size(), |limit| limit.min(self.config.page_size()))
            .max(1);

        if request.id.is_none() {
            params.insert("page".to_string(), Value::from(1));
            params.insert("pageSize".to_string(), Value::from(page_size));
        }

        let first = match self.fetch_data(&params, request.id).await? {
            Reply::Data(page) => page,
            Reply::Failure(failure) => return Ok(Reply::Failure(failure)),
        };

        if first.count == 0 {
            tracing::info!("📭 No records found at {}", self.endpoint);
            return Ok(Reply::Data(Vec::new()));
        }

        let total = request.limit.map_or(first.count, |limit| limit.min(first.count));
        let n_pages = total.div_ceil(page_size);
        let mut output = first.results;

        if request.id.is_none() && n_pages > 1 {
            let show_bar = request.show_bar && self.config.show_progress();
            let progress = progress_bar((n_pages - 1) as u64, "Retrieving predictions", show_bar);

            for page in 2..=n_pages {
                params.insert("page".to_string(), Value::from(page));

                match self.fetch_data(&params, None).await? {
                    Reply::Data(next) if next.results.is_empty() => {
                        tracing::warn!("⚠️ Page {} came back empty, stopping early", page);
                        break;
                    }
                    Reply::Data(next) => output.extend(next.results),
                    Reply::Failure(failure) => {
                        tracing::warn!("⚠️ Skipping page {}/{}: {}", page, n_pages, failure);
                    }
                }
                progress.inc(1);
            }

            progress.finish_and_clear();
        }

        output.truncate(total);
        tracing::info!(
            "📥 Retrieved {} of {} records from {}",
            output.len(),
            first.count,
            self.endpoint
        );

        // TODO: drop this rename once the API returns provisional_designation itself
        let records = output
            .into_iter()
            .map(|record| replace_key(record, PRINCIPAL_DESIGNATION, PROVISIONAL_DESIGNATION))
            .collect();

        Ok(Reply::Data(records))
    }
}
