//! Aggregation service layer
//!
//! 按国家聚合每日指标，供 HTTP API 与 CLI 共用。
//!
//! # 查询策略
//!
//! 目标日期与前一天各做一次按日期过滤的查询（走 `idx_daily_metrics_date`），
//! 以当天为主表、按 location_id 左连接前一天，在内存中分组求和。
//! 前一天缺失的地点按 0 计入，只在前一天出现的地点不输出。
//! 求和与差值都是饱和运算，超出 i64 的国家总量停在边界值。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::errors::Result;
use crate::storage::{
    CountryTotal, DailyIncrease, MetricKind, MetricRow, MetricTriple, SeaOrmStorage, SummaryKind,
};

/// 日期目录最多返回的日期数
pub const DATE_CATALOG_LIMIT: u64 = 30;

#[derive(Default)]
struct CountryAccumulator {
    current: i64,
    previous: i64,
    /// (location_id, lat, long)：坐标齐全且 location_id 最小的地点
    anchor: Option<(i32, f64, f64)>,
}

impl CountryAccumulator {
    fn offer_coordinates(&mut self, row: &MetricRow) {
        let (Some(lat), Some(long)) = (row.lat, row.long) else {
            return;
        };
        match self.anchor {
            Some((id, _, _)) if id <= row.location_id => {}
            _ => self.anchor = Some((row.location_id, lat, long)),
        }
    }

    fn coordinates(&self) -> (Option<f64>, Option<f64>) {
        match self.anchor {
            Some((_, lat, long)) => (Some(lat), Some(long)),
            None => (None, None),
        }
    }
}

fn select(kind: Option<MetricKind>, triple: &MetricTriple) -> i64 {
    kind.map_or(0, |k| k.select(triple))
}

/// 计算每个国家的日增量
///
/// `kind` 为 None（无法识别的类型）时所有数值为 0，但国家列表照常输出。
/// 结果按国家名升序。
pub fn fold_daily_increase(
    kind: Option<MetricKind>,
    target: NaiveDate,
    current: &[MetricRow],
    previous: &[MetricRow],
) -> Vec<DailyIncrease> {
    let previous_by_location: HashMap<i32, MetricTriple> = previous
        .iter()
        .map(|row| (row.location_id, row.triple()))
        .collect();

    let mut groups: BTreeMap<&str, CountryAccumulator> = BTreeMap::new();
    for row in current {
        let acc = groups.entry(row.country_region.as_str()).or_default();
        acc.current = acc.current.saturating_add(select(kind, &row.triple()));
        acc.previous = acc.previous.saturating_add(
            previous_by_location
                .get(&row.location_id)
                .map_or(0, |prev| select(kind, prev)),
        );
        acc.offer_coordinates(row);
    }

    groups
        .into_iter()
        .map(|(country, acc)| {
            let (lat, long) = acc.coordinates();
            DailyIncrease {
                country: country.to_string(),
                date: target,
                current_value: acc.current,
                previous_value: acc.previous,
                daily_increase: acc.current.saturating_sub(acc.previous),
                lat,
                long,
            }
        })
        .collect()
}

/// 计算每个国家在某一天的总量
pub fn fold_country_totals(kind: Option<MetricKind>, rows: &[MetricRow]) -> Vec<CountryTotal> {
    let mut groups: BTreeMap<&str, CountryAccumulator> = BTreeMap::new();
    for row in rows {
        let acc = groups.entry(row.country_region.as_str()).or_default();
        acc.current = acc.current.saturating_add(select(kind, &row.triple()));
        acc.offer_coordinates(row);
    }

    groups
        .into_iter()
        .map(|(country, acc)| {
            let (lat, long) = acc.coordinates();
            CountryTotal {
                country: country.to_string(),
                value: acc.current,
                lat,
                long,
            }
        })
        .collect()
}

/// 聚合服务
pub struct AggregationService {
    storage: Arc<SeaOrmStorage>,
}

impl AggregationService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 按国家计算 `metric_type` 在 `date`（缺省为库中最新日期）的日增量
    ///
    /// 空库返回空列表。
    pub async fn daily_increase(
        &self,
        metric_type: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<DailyIncrease>> {
        let kind = MetricKind::parse(metric_type);
        if kind.is_none() {
            debug!("Unrecognized metric type {:?}, values fall back to 0", metric_type);
        }

        let target = match date {
            Some(d) => d,
            None => match self.storage.latest_metric_date().await? {
                Some(d) => d,
                None => return Ok(Vec::new()),
            },
        };

        let current = self.storage.metrics_on(target).await?;
        if current.is_empty() {
            return Ok(Vec::new());
        }
        let previous = match target.pred_opt() {
            Some(prev) => self.storage.metrics_on(prev).await?,
            None => Vec::new(),
        };

        let result = fold_daily_increase(kind, target, &current, &previous);
        debug!(
            "daily_increase({}, {}): {} countries from {} + {} rows",
            metric_type,
            target,
            result.len(),
            current.len(),
            previous.len()
        );
        Ok(result)
    }

    /// 最近的日期，倒序，最多 30 个
    pub async fn available_dates(&self) -> Result<Vec<NaiveDate>> {
        self.storage.distinct_dates(DATE_CATALOG_LIMIT).await
    }

    /// 最新日期的国家汇总
    ///
    /// `DailyIncrease` 返回确诊数的日增量，其它类型返回当日总量。
    pub async fn summary(&self, summary_type: &str) -> Result<Vec<CountryTotal>> {
        let kind = match SummaryKind::parse(summary_type) {
            SummaryKind::DailyIncrease => {
                return Ok(self
                    .daily_increase(MetricKind::Confirmed.as_ref(), None)
                    .await?
                    .into_iter()
                    .map(|d| CountryTotal {
                        country: d.country,
                        value: d.daily_increase,
                        lat: d.lat,
                        long: d.long,
                    })
                    .collect());
            }
            SummaryKind::Metric(kind) => Some(kind),
            SummaryKind::Unknown => None,
        };

        let Some(latest) = self.storage.latest_metric_date().await? else {
            return Ok(Vec::new());
        };
        let rows = self.storage.metrics_on(latest).await?;
        Ok(fold_country_totals(kind, &rows))
    }
}
