//! 领域模型
//!
//! 与数据库实体（`migration::entities`）分离：实体对应表结构，
//! 这里的类型在导入管线、聚合服务和 HTTP 层之间流转。

use chrono::NaiveDate;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// 地点自然键 (ProvinceState, CountryRegion)
///
/// 空白的省份统一归一化为 `None`，与数据库中的 NULL 对应。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationKey {
    pub province_state: Option<String>,
    pub country_region: String,
}

impl LocationKey {
    pub fn new(province_state: Option<&str>, country_region: &str) -> Self {
        let province_state = province_state
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            province_state,
            country_region: country_region.trim().to_string(),
        }
    }
}

impl std::fmt::Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.province_state {
            Some(p) => write!(f, "{}/{}", self.country_region, p),
            None => write!(f, "{}", self.country_region),
        }
    }
}

/// 首次出现时用于创建 Location 的数据
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub key: LocationKey,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub iso3: Option<String>,
}

impl NewLocation {
    /// 时间序列来源：不带坐标
    pub fn bare(key: LocationKey) -> Self {
        Self {
            key,
            lat: None,
            long: None,
            iso3: None,
        }
    }
}

/// 单日三项原始计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTriple {
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
}

impl MetricTriple {
    pub fn new(confirmed: i64, deaths: i64, recovered: i64) -> Self {
        Self {
            confirmed,
            deaths,
            recovered,
        }
    }

    /// Active = Confirmed - Deaths - Recovered（可能为负，原样返回）
    ///
    /// 饱和运算，极端计数不会溢出。
    pub fn active(&self) -> i64 {
        self.confirmed
            .saturating_sub(self.deaths)
            .saturating_sub(self.recovered)
    }
}

/// 可聚合的指标类型
///
/// 解析大小写敏感，与前端传入的 `type` 参数完全一致。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, Display, EnumIter,
)]
pub enum MetricKind {
    Confirmed,
    Active,
    Recovered,
    Deaths,
}

impl MetricKind {
    /// 指标选择器：从一组计数中取出对应的值
    pub fn select(&self, triple: &MetricTriple) -> i64 {
        match self {
            MetricKind::Confirmed => triple.confirmed,
            MetricKind::Deaths => triple.deaths,
            MetricKind::Recovered => triple.recovered,
            MetricKind::Active => triple.active(),
        }
    }

    /// 无法识别的类型返回 `None`，由调用方按 0 处理
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

/// `summary` 端点接受的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Metric(MetricKind),
    DailyIncrease,
    Unknown,
}

impl SummaryKind {
    pub fn parse(raw: &str) -> Self {
        if raw == "DailyIncrease" {
            return SummaryKind::DailyIncrease;
        }
        match MetricKind::parse(raw) {
            Some(kind) => SummaryKind::Metric(kind),
            None => SummaryKind::Unknown,
        }
    }
}

/// 单日指标与所属地点的联表行
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct MetricRow {
    pub location_id: i32,
    pub country_region: String,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub confirmed: Option<i64>,
    pub deaths: Option<i64>,
    pub recovered: Option<i64>,
}

impl MetricRow {
    /// NULL 计数按 0 处理
    pub fn triple(&self) -> MetricTriple {
        MetricTriple::new(
            self.confirmed.unwrap_or(0),
            self.deaths.unwrap_or(0),
            self.recovered.unwrap_or(0),
        )
    }
}

/// 按国家聚合的日增量
#[derive(Debug, Clone, PartialEq)]
pub struct DailyIncrease {
    pub country: String,
    pub date: NaiveDate,
    pub current_value: i64,
    pub previous_value: i64,
    pub daily_increase: i64,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

/// 按国家聚合的单日总量
#[derive(Debug, Clone, PartialEq)]
pub struct CountryTotal {
    pub country: String,
    pub value: i64,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

/// 写入某个地点全部日期后的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub existing: usize,
}

/// 存储概况（health 端点使用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageStats {
    pub backend: String,
    pub locations: u64,
    pub metrics: u64,
    pub latest_date: Option<NaiveDate>,
}
