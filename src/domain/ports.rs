use crate::core::occmap::OccMapParams;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn asteroid_endpoint(&self) -> &str;
    fn prediction_endpoint(&self) -> &str;
    fn page_size(&self) -> usize;
    fn timeout_seconds(&self) -> Option<u64>;
    fn show_progress(&self) -> bool;
    fn headers(&self) -> &HashMap<String, String>;
    fn user_agent(&self) -> Option<&str>;
}

/// 外部繪圖程式的介面，接收具名的天體測量參數並產生影像
#[async_trait]
pub trait MapRenderer: Send + Sync {
    async fn plot_occ_map(&self, params: &OccMapParams) -> anyhow::Result<()>;
}
