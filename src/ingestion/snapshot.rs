//! 单日快照 CSV（每行一个地点，单个日期，指标与坐标同行）

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, warn};

use super::report::FileReport;
use super::time_series::{Count, parse_count};
use crate::storage::{LocationKey, MetricTriple, NewLocation};

pub const SNAPSHOT_KIND: &str = "Snapshot";

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    #[serde(rename = "Province_State", default)]
    province_state: Option<String>,
    #[serde(rename = "Country_Region", default)]
    country_region: Option<String>,
    #[serde(rename = "Lat", default)]
    lat: Option<String>,
    #[serde(rename = "Long_", alias = "Long", default)]
    long: Option<String>,
    #[serde(rename = "ISO3", default)]
    iso3: Option<String>,
    #[serde(rename = "Confirmed", default)]
    confirmed: Option<String>,
    #[serde(rename = "Deaths", default)]
    deaths: Option<String>,
    #[serde(rename = "Recovered", default)]
    recovered: Option<String>,
    #[serde(rename = "Date", default)]
    date: Option<String>,
}

/// 快照中的一个地点
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub location: NewLocation,
    pub metrics: BTreeMap<NaiveDate, MetricTriple>,
}

/// 按地点聚合后的快照数据
pub type SnapshotMap = BTreeMap<LocationKey, SnapshotEntry>;

/// 解析快照中的日期，时间部分丢弃
pub fn parse_snapshot_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y")
        && raw.rsplit('/').next().is_some_and(|y| y.len() == 4)
    {
        return Some(date);
    }
    super::time_series::parse_header_date(raw)
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_iso3(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| s.len() == 3 && s.bytes().all(|b| b.is_ascii_alphanumeric()))
        .map(str::to_string)
}

/// 读取快照文件
///
/// 同一 (地点, 日期) 重复出现时保留第一行，与落库时“只插入不覆盖”一致。
pub fn read_snapshot<R: Read>(
    reader: R,
    data: &mut SnapshotMap,
    report: &mut FileReport,
) -> Result<(), csv::Error> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    for (row_idx, result) in csv_reader.deserialize::<SnapshotRow>().enumerate() {
        let row_num = row_idx + 2;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                report.skip_row(format!("Row {}: CSV parse error: {}", row_num, e));
                continue;
            }
        };

        let country = row.country_region.as_deref().unwrap_or("").trim();
        if country.is_empty() {
            report.skip_row(format!("Row {}: empty Country_Region", row_num));
            continue;
        }

        let Some(date) = row.date.as_deref().and_then(parse_snapshot_date) else {
            report.skip_row(format!(
                "Row {}: missing or unparseable Date {:?}",
                row_num,
                row.date.as_deref().unwrap_or("")
            ));
            continue;
        };

        let mut count = |raw: &Option<String>, column: &str| {
            let count = parse_count(raw.as_deref().unwrap_or(""));
            if count == Count::Invalid {
                report.invalid_cells += 1;
                warn!(
                    "{} row {}: invalid {} value {:?}, using 0",
                    report.path,
                    row_num,
                    column,
                    raw.as_deref().unwrap_or("")
                );
            }
            count.or_zero()
        };
        let triple = MetricTriple::new(
            count(&row.confirmed, "Confirmed"),
            count(&row.deaths, "Deaths"),
            count(&row.recovered, "Recovered"),
        );

        let key = LocationKey::new(row.province_state.as_deref(), country);
        let entry = data.entry(key.clone()).or_insert_with(|| SnapshotEntry {
            location: NewLocation {
                key,
                lat: parse_coordinate(row.lat.as_deref()),
                long: parse_coordinate(row.long.as_deref()),
                iso3: parse_iso3(row.iso3.as_deref()),
            },
            metrics: BTreeMap::new(),
        });

        match entry.metrics.entry(date) {
            Entry::Vacant(slot) => {
                slot.insert(triple);
                report.rows_read += 1;
            }
            Entry::Occupied(_) => {
                report.skip_row(format!(
                    "Row {}: duplicate {} on {}, keeping the first row",
                    row_num, entry.location.key, date
                ));
            }
        }
    }

    debug!("{}: {} snapshot locations parsed", report.path, data.len());
    Ok(())
}

/// 打开并读取快照文件；打开失败时跳过
pub fn load_snapshot_file(path: &str, data: &mut SnapshotMap) -> FileReport {
    let mut report = FileReport::new(path, SNAPSHOT_KIND);

    if !Path::new(path).exists() {
        report.fail(format!("File not found: {}", path));
        return report;
    }
    report.found = true;

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            report.fail(format!("Failed to open {}: {}", path, e));
            return report;
        }
    };

    if let Err(e) = read_snapshot(BufReader::new(file), data, &mut report) {
        report.fail(format!("Failed to read {}: {}", path, e));
    }
    report
}
