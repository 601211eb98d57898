//! Occultation shadow path evaluation.
//!
//! The portal stores each predicted shadow path as polynomial fits of latitude and
//! longitude (degrees) over the normalized event time `u ∈ [0, 1]`. The centre line is
//! always present; the northern and southern limits are optional.

use crate::utils::error::{Result, SspError};
use crate::utils::validation::validate_date_time;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_N_ELEMENTS: usize = 1500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathCoefficients {
    pub coeff_latitude: Vec<f64>,
    pub coeff_longitude: Vec<f64>,
    #[serde(default)]
    pub coeff_upper_limit_latitude: Option<Vec<f64>>,
    #[serde(default)]
    pub coeff_upper_limit_longitude: Option<Vec<f64>>,
    #[serde(default)]
    pub coeff_lower_limit_latitude: Option<Vec<f64>>,
    #[serde(default)]
    pub coeff_lower_limit_longitude: Option<Vec<f64>>,
    /// 原樣保留，不參與可見性計算
    #[serde(default)]
    pub starttime: Option<String>,
    #[serde(default)]
    pub endtime: Option<String>,
}

impl PathCoefficients {
    /// 解析 `occ_path_coeff`；API 有時會把它當成 JSON 字串回傳
    pub fn from_value(value: &Value) -> Result<Self> {
        let parsed = match value {
            Value::String(raw) => serde_json::from_str(raw),
            Value::Object(_) => serde_json::from_value(value.clone()),
            _ => return Err(SspError::type_mismatch("occ_path_coeff", "object")),
        };

        let coeff: Self = parsed.map_err(|e| SspError::TypeMismatch {
            field: "occ_path_coeff".to_string(),
            expected: format!("path coefficient object ({})", e),
        })?;

        if coeff.coeff_latitude.is_empty() || coeff.coeff_longitude.is_empty() {
            return Err(SspError::validation("occ_path_coeff has an empty centre-line polynomial"));
        }

        Ok(coeff)
    }

    fn limits(&self) -> Vec<(&[f64], &[f64])> {
        [
            (&self.coeff_upper_limit_latitude, &self.coeff_upper_limit_longitude),
            (&self.coeff_lower_limit_latitude, &self.coeff_lower_limit_longitude),
        ]
        .into_iter()
        .filter_map(|(lat, lon)| match (lat, lon) {
            (Some(lat), Some(lon)) if !lat.is_empty() && !lon.is_empty() => {
                Some((lat.as_slice(), lon.as_slice()))
            }
            _ => None,
        })
        .collect()
    }
}

/// Horner's rule, coefficients in ascending power.
pub fn evaluate_polynomial(coeffs: &[f64], u: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * u + c)
}

/// Wraps longitude into [-180, 180).
pub fn wrap_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

/// Great-circle distance in km.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = lat2_rad - lat1_rad;
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

fn path_point(lat_coeffs: &[f64], lon_coeffs: &[f64], u: f64) -> Option<(f64, f64)> {
    let lat = evaluate_polynomial(lat_coeffs, u);
    let lon = evaluate_polynomial(lon_coeffs, u);
    if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 {
        return None;
    }
    Some((lat, wrap_longitude(lon)))
}

/// 判斷觀測者 (latitude, longitude) 在 `radius` 公里內是否看得到這次掩星。
///
/// 沿著中心線取 `n_elements` 個點；每一點的陰影半寬是中心到上下界線的最大距離。
/// 只要觀測者到陰影帶邊緣的距離不超過 `radius` 就算可見。
pub fn visibility_from_coeff(
    latitude: f64,
    longitude: f64,
    radius: f64,
    date_time: &str,
    coeff: &PathCoefficients,
    n_elements: usize,
) -> Result<bool> {
    validate_date_time("date_time", date_time)?;
    validate_observer(latitude, longitude, radius, n_elements)?;

    let limits = coeff.limits();
    let step = 1.0 / (n_elements - 1) as f64;

    for i in 0..n_elements {
        let u = i as f64 * step;
        let Some((lat, lon)) = path_point(&coeff.coeff_latitude, &coeff.coeff_longitude, u) else {
            continue;
        };

        let half_width = limits
            .iter()
            .filter_map(|(lat_c, lon_c)| path_point(lat_c, lon_c, u))
            .map(|(edge_lat, edge_lon)| haversine_km(lat, lon, edge_lat, edge_lon))
            .fold(0.0, f64::max);

        if haversine_km(latitude, longitude, lat, lon) - half_width <= radius {
            return Ok(true);
        }
    }

    Ok(false)
}

pub(crate) fn validate_observer(
    latitude: f64,
    longitude: f64,
    radius: f64,
    n_elements: usize,
) -> Result<()> {
    // NaN 不在任何範圍內，會一併被擋下
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(SspError::validation(format!("latitude must be between -90 and 90, got {}", latitude)));
    }
    if !(-180.0..=360.0).contains(&longitude) {
        return Err(SspError::validation(format!("longitude must be between -180 and 360, got {}", longitude)));
    }
    if !(radius >= 0.0 && radius.is_finite()) {
        return Err(SspError::validation(format!("radius must be >= 0, got {}", radius)));
    }
    if n_elements < 2 {
        return Err(SspError::validation("n_elements must be at least 2"));
    }
    Ok(())
}
