//! HTTP 响应类型定义
//!
//! 字段命名与前端约定保持一致：日增量记录使用 PascalCase，其余为小写。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::error_code::ErrorCode;
use crate::storage::{CountryTotal, DailyIncrease};

/// 输出目录常量
pub const TS_EXPORT_PATH: &str = "../covid-client/src/api/types.generated.ts";

/// 某国在某日的增量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "PascalCase")]
pub struct DailyIncreaseRecord {
    pub country: String,
    pub date: NaiveDate,
    #[ts(type = "number")]
    pub current_value: i64,
    #[ts(type = "number")]
    pub previous_value: i64,
    #[ts(type = "number")]
    pub daily_increase: i64,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

impl From<DailyIncrease> for DailyIncreaseRecord {
    fn from(d: DailyIncrease) -> Self {
        Self {
            country: d.country,
            date: d.date,
            current_value: d.current_value,
            previous_value: d.previous_value,
            daily_increase: d.daily_increase,
            lat: d.lat,
            long: d.long,
        }
    }
}

/// 日期目录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct DateEntry {
    pub date: NaiveDate,
}

/// 最新日期的国家汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct SummaryRecord {
    pub country: String,
    #[ts(type = "number")]
    pub value: i64,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

impl From<CountryTotal> for SummaryRecord {
    fn from(t: CountryTotal) -> Self {
        Self {
            country: t.country,
            value: t.value,
            lat: t.lat,
            long: t.long,
        }
    }
}

/// 错误响应体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

/// `GET /aggregate/daily-increase` 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyIncreaseQuery {
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
    pub date: Option<String>,
}

/// `GET /aggregate/summary` 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    #[serde(rename = "type")]
    pub summary_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[ts(type = "number | null")]
    pub locations_count: Option<u64>,
    #[ts(type = "number | null")]
    pub metrics_count: Option<u64>,
    pub latest_date: Option<NaiveDate>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u32,
    pub storage: HealthStorageCheck,
    pub response_time_ms: u32,
}
