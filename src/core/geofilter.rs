use crate::core::occviz::{validate_observer, visibility_from_coeff, PathCoefficients, DEFAULT_N_ELEMENTS};
use crate::core::Record;
use crate::utils::error::{Result, SspError};
use crate::utils::progress::progress_bar;
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct GeofilterOptions {
    pub n_elements: usize,
    /// `None` 時使用 CPU 數 - 1 (至少 1)
    pub workers: Option<usize>,
    pub show_bar: bool,
}

impl Default for GeofilterOptions {
    fn default() -> Self {
        Self {
            n_elements: DEFAULT_N_ELEMENTS,
            workers: None,
            show_bar: true,
        }
    }
}

impl GeofilterOptions {
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1))
                .unwrap_or(1)
                .max(1)
        })
    }
}

fn check_record(record: &Record, latitude: f64, longitude: f64, radius: f64, n_elements: usize) -> Result<bool> {
    let date_time = record
        .get("date_time")
        .and_then(|v| v.as_str())
        .ok_or_else(|| SspError::type_mismatch("date_time", "string"))?;
    let coeff_value = record
        .get("occ_path_coeff")
        .ok_or_else(|| SspError::MissingConfigError {
            field: "occ_path_coeff".to_string(),
        })?;
    let coeff = PathCoefficients::from_value(coeff_value)?;

    visibility_from_coeff(latitude, longitude, radius, date_time, &coeff, n_elements)
}

/// 單筆可見性檢查；任何錯誤都記錄後視為不可見
pub fn visibility_check(record: &Record, latitude: f64, longitude: f64, radius: f64, n_elements: usize) -> bool {
    match check_record(record, latitude, longitude, radius, n_elements) {
        Ok(visible) => visible,
        Err(e) => {
            let id = record.get("id").map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());
            tracing::warn!("⚠️ Error processing record {}: {}", id, e);
            false
        }
    }
}

/// 留下從 (latitude, longitude) 半徑 `radius` 公里內可見的事件，順序與輸入相同
pub fn geofilter(
    data: &[Record],
    latitude: f64,
    longitude: f64,
    radius: f64,
    options: &GeofilterOptions,
) -> Result<Vec<Record>> {
    validate_observer(latitude, longitude, radius, options.n_elements)?;

    let workers = options.worker_count();
    if workers == 0 {
        return Err(SspError::validation("workers must be at least 1"));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| SspError::ConfigError {
            message: format!("Failed to build worker pool: {}", e),
        })?;

    tracing::info!(
        "🌍 Checking visibility of {} events from ({}, {}) within {} km using {} workers",
        data.len(),
        latitude,
        longitude,
        radius,
        workers
    );

    let progress = progress_bar(data.len() as u64, "Checking visibility", options.show_bar);

    // par_iter().map().collect() 保留輸入順序
    let visible: Vec<bool> = pool.install(|| {
        data.par_iter()
            .map(|record| {
                let result = visibility_check(record, latitude, longitude, radius, options.n_elements);
                progress.inc(1);
                result
            })
            .collect()
    });
    progress.finish_and_clear();

    let filtered: Vec<Record> = data
        .iter()
        .zip(visible)
        .filter_map(|(record, visible)| visible.then(|| record.clone()))
        .collect();

    tracing::info!("🌍 {} of {} events are visible", filtered.len(), data.len());
    Ok(filtered)
}
