use crate::core::{MapRenderer, Record, Storage};
use crate::utils::error::{Result, SspError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 繪圖程式接受的額外參數名稱，其他參數會被過濾掉
pub const ALLOWED_OPTIONS: &[&str] = &[
    "alpha", "arrow", "atcolor", "atm", "centermap_delta", "centermap_geo", "centerproj",
    "chcolor", "chord_delta", "chord_geo", "countries", "cpoints", "cscale", "dpi", "ercolor",
    "error", "fmt", "hcolor", "heights", "labels", "lncolor", "mapsize", "mapstyle", "meridians",
    "nameimg", "nscale", "offset", "outcolor", "parallels", "path", "pscale", "ptcolor",
    "resolution", "ring", "rncolor", "site_name", "sites", "sscale", "states", "zoom",
    "site_box_alpha", "band",
];

/// 路徑、點、誤差線與外圍區域的顏色
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStyle {
    pub lncolor: String,
    pub ptcolor: String,
    pub ercolor: String,
    pub outcolor: String,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            lncolor: "#00468D".to_string(),
            ptcolor: "#00468D".to_string(),
            ercolor: "#D32F2F".to_string(),
            outcolor: "#D3D3D3".to_string(),
        }
    }
}

/// 傳給外部繪圖程式的具名參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccMapParams {
    pub name: String,
    /// km
    pub radius: f64,
    pub coord: String,
    pub time: String,
    pub ca: f64,
    pub pa: f64,
    pub vel: f64,
    pub dist: f64,
    pub mag: f64,
    pub longi: f64,
    /// mas
    pub error: Option<f64>,
    #[serde(flatten)]
    pub style: MapStyle,
    pub options: serde_json::Map<String, Value>,
}

fn number(record: &Record, key: &str) -> f64 {
    record.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn text(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// 只保留 `ALLOWED_OPTIONS` 中的參數
pub fn filter_options(options: &serde_json::Map<String, Value>) -> serde_json::Map<String, Value> {
    options
        .iter()
        .filter(|(key, _)| {
            let allowed = ALLOWED_OPTIONS.contains(&key.as_str());
            if !allowed {
                tracing::debug!("Dropping unsupported map option '{}'", key);
            }
            allowed
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// 只留下英數字與 '_'，其餘換成 '-'，避免名稱中的 '/' 或 '..' 變成路徑
fn path_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect()
}

impl OccMapParams {
    /// 從 API 查詢結果建立繪圖參數；缺少的欄位以 0 或空字串代替
    pub fn from_record(record: &Record, style: &MapStyle, options: &serde_json::Map<String, Value>) -> Self {
        let error = number(record, "closest_approach_uncertainty") * 1000.0;

        Self {
            name: text(record, "name").replace(' ', "_"),
            radius: number(record, "diameter") / 2.0,
            coord: format!(
                "{} {}",
                text(record, "ra_star_candidate"),
                text(record, "dec_star_candidate")
            ),
            time: text(record, "date_time"),
            ca: number(record, "closest_approach"),
            pa: number(record, "position_angle"),
            vel: number(record, "velocity"),
            dist: number(record, "delta"),
            mag: number(record, "g_star"),
            longi: number(record, "long"),
            error: (error > 0.0).then_some(error),
            style: style.clone(),
            options: filter_options(options),
        }
    }

    /// 輸出檔名用的識別字串
    pub fn file_stem(&self) -> String {
        let time = path_safe(&self.time);
        let name = if self.name.is_empty() { "occultation".to_string() } else { path_safe(&self.name) };
        if time.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", name, time)
        }
    }
}

/// 繪圖結果統計
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapReport {
    pub rendered: usize,
    /// (name, error)
    pub failed: Vec<(String, String)>,
}

/// 逐筆交給繪圖程式；單筆失敗只記錄，不中斷其他筆
pub async fn generate_map<R: MapRenderer + ?Sized>(
    renderer: &R,
    data: &[Record],
    style: &MapStyle,
    options: &serde_json::Map<String, Value>,
) -> MapReport {
    let mut report = MapReport::default();

    for record in data {
        let params = OccMapParams::from_record(record, style, options);
        match renderer.plot_occ_map(&params).await {
            Ok(()) => report.rendered += 1,
            Err(e) => {
                tracing::error!("❌ Error while plotting map for {}: {}", params.name, e);
                report.failed.push((params.name.clone(), e.to_string()));
            }
        }
    }

    tracing::info!("🗺️ Rendered {} maps ({} failed)", report.rendered, report.failed.len());
    report
}

/// 直接指定參數呼叫繪圖程式，`options` 會重新過濾
pub async fn generate_map_with<R: MapRenderer + ?Sized>(
    renderer: &R,
    mut params: OccMapParams,
    options: &serde_json::Map<String, Value>,
) -> MapReport {
    params.options = filter_options(options);

    match renderer.plot_occ_map(&params).await {
        Ok(()) => MapReport {
            rendered: 1,
            failed: Vec::new(),
        },
        Err(e) => {
            tracing::error!("❌ Error while plotting map: {}", e);
            MapReport {
                rendered: 0,
                failed: vec![(params.name.clone(), e.to_string())],
            }
        }
    }
}

/// 接受單一物件或物件陣列
pub async fn generate_map_from_value<R: MapRenderer + ?Sized>(
    renderer: &R,
    data: &Value,
    style: &MapStyle,
    options: &serde_json::Map<String, Value>,
) -> Result<MapReport> {
    let records: Vec<Record> = match data {
        Value::Object(record) => vec![record.clone()],
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record.clone()),
                _ => Err(SspError::type_mismatch("data", "an object or a list of objects")),
            })
            .collect::<Result<_>>()?,
        _ => return Err(SspError::type_mismatch("data", "an object or a list of objects")),
    };

    Ok(generate_map(renderer, &records, style, options).await)
}

/// 把繪圖請求寫成 JSON 檔，交給外部的繪圖流程處理
pub struct ParameterFileRenderer<S: Storage> {
    storage: S,
}

impl<S: Storage> ParameterFileRenderer<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[async_trait]
impl<S: Storage> MapRenderer for ParameterFileRenderer<S> {
    async fn plot_occ_map(&self, params: &OccMapParams) -> anyhow::Result<()> {
        let path = format!("{}.json", params.file_stem());
        let body = serde_json::to_vec_pretty(params)?;

        tracing::debug!("Writing map request ({} bytes) to {}", body.len(), path);
        self.storage.write_file(&path, &body).await?;
        Ok(())
    }
}
