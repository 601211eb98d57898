use crate::utils::error::{Result, SspError};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

// 接受的 ISO-8601 形式: 日期、日期+時分、日期+時分秒(可含小數)，時間部分可帶 Z 或 ±HH:MM
static ISO_DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<date>\d{4}-\d{2}-\d{2})(?:[T ](?P<time>\d{2}:\d{2}(?::\d{2}(?:\.\d{1,9})?)?)(?P<offset>[Zz]|[+-]\d{2}:\d{2})?)?$",
    )
    .expect("ISO-8601 pattern is valid")
});

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SspError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SspError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SspError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_endpoint_path(field_name: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(SspError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Endpoint path must start with '/'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(SspError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SspError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 驗證日期參數並轉為 UTC。
///
/// 僅有日期時視為當天 00:00:00 UTC；沒有時區的時間視為 UTC。
pub fn validate_date_time(field_name: &str, value: &str) -> Result<DateTime<Utc>> {
    let date_error = || SspError::DateFormatError {
        field: field_name.to_string(),
        value: value.to_string(),
    };

    let caps = ISO_DATE_TIME.captures(value.trim()).ok_or_else(date_error)?;

    let date = NaiveDate::parse_from_str(&caps["date"], "%Y-%m-%d").map_err(|_| date_error())?;

    let time = match caps.name("time") {
        Some(t) => NaiveTime::parse_from_str(t.as_str(), "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(t.as_str(), "%H:%M"))
            .map_err(|_| date_error())?,
        None => NaiveTime::default(),
    };

    let offset = match caps.name("offset").map(|m| m.as_str()) {
        None | Some("Z") | Some("z") => FixedOffset::east_opt(0),
        Some(raw) => {
            let sign = if raw.starts_with('-') { -1 } else { 1 };
            let hours: i32 = raw[1..3].parse().map_err(|_| date_error())?;
            let minutes: i32 = raw[4..6].parse().map_err(|_| date_error())?;
            if hours > 23 || minutes > 59 {
                return Err(date_error());
            }
            FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        }
    }
    .ok_or_else(date_error)?;

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(date_error)
}

/// API 查詢參數使用的日期格式
pub fn format_query_date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("base_url", "https://solarsystem.linea.org.br").is_ok());
        assert!(validate_url("base_url", "http://localhost:8000").is_ok());
        assert!(validate_url("base_url", "").is_err());
        assert!(validate_url("base_url", "invalid-url").is_err());
        assert!(validate_url("base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("page_size", 100, 1).is_ok());
        assert!(validate_positive_number("page_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_endpoint_path() {
        assert!(validate_endpoint_path("prediction_endpoint", "/api/occultations").is_ok());
        assert!(validate_endpoint_path("prediction_endpoint", "api/occultations").is_err());
    }

    #[test]
    fn test_date_only_is_midnight_utc() {
        let dt = validate_date_time("date_time_after", "2024-03-15").unwrap();
        assert_eq!(format_query_date(&dt), "2024-03-15T00:00:00Z");
    }

    #[test]
    fn test_accepted_iso_variants() {
        let accepted = [
            "2024-03-15",
            "2024-03-15T10:20",
            "2024-03-15T10:20:30",
            "2024-03-15T10:20:30.123",
            "2024-03-15T10:20:30.123456789",
            "2024-03-15 10:20:30",
            "2024-03-15T10:20:30Z",
            "2024-03-15T10:20Z",
            "2024-03-15T10:20:30+02:00",
            "2024-03-15T10:20:30.5-03:30",
        ];
        for value in accepted {
            assert!(
                validate_date_time("date_time_after", value).is_ok(),
                "expected '{}' to be accepted",
                value
            );
        }
    }

    #[test]
    fn test_rejected_values() {
        let rejected = [
            "",
            "15/03/2024",
            "2024-3-15",
            "2024-03-15T",
            "2024-03-15T10",
            "2024-13-01",
            "2024-02-30",
            "2024-03-15T25:00:00",
            "2024-03-15Z",
            "2024-03-15T10:20:30+2",
            "2024-03-15T10:20:30+24:00",
            "yesterday",
        ];
        for value in rejected {
            let err = validate_date_time("date_time_before", value).unwrap_err();
            assert!(
                matches!(err, SspError::DateFormatError { .. }),
                "expected '{}' to be rejected",
                value
            );
        }
    }

    #[test]
    fn test_offset_is_converted_to_utc() {
        let dt = validate_date_time("date_time_after", "2024-03-15T10:20:30+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
        assert_eq!(format_query_date(&dt), "2024-03-15T08:20:30Z");

        let dt = validate_date_time("date_time_after", "2024-03-15T23:00-03:00").unwrap();
        assert_eq!(format_query_date(&dt), "2024-03-16T02:00:00Z");
    }
}
