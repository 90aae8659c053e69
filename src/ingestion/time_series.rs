//! 宽格式时间序列 CSV
//!
//! 每行一个地点，前 4 列为 Province/State, Country/Region, Lat, Long，
//! 之后每列一个 `M/d/yy` 日期。三个文件（确诊/死亡/治愈）合并到同一张
//! `地点 -> 日期 -> 三元组` 表里，落库前全部在内存中完成。

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use strum::{AsRefStr, Display};
use tracing::{debug, warn};

use super::report::FileReport;
use crate::storage::{LocationKey, MetricTriple};

/// 合并后的时间序列数据
pub type SeriesMap = BTreeMap<LocationKey, BTreeMap<NaiveDate, MetricTriple>>;

/// 前 4 列为地点标识
const IDENTITY_COLUMNS: usize = 4;

/// 时间序列文件提供的指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
pub enum SeriesKind {
    Confirmed,
    Deaths,
    Recovered,
}

impl SeriesKind {
    fn apply(&self, triple: &mut MetricTriple, value: i64) {
        match self {
            SeriesKind::Confirmed => triple.confirmed = value,
            SeriesKind::Deaths => triple.deaths = value,
            SeriesKind::Recovered => triple.recovered = value,
        }
    }
}

/// 单元格中的计数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Value(i64),
    Empty,
    Invalid,
}

impl Count {
    pub fn or_zero(self) -> i64 {
        match self {
            Count::Value(v) => v,
            Count::Empty | Count::Invalid => 0,
        }
    }
}

/// 解析非负计数；允许 `12.0` 这种整数值的小数写法
pub fn parse_count(raw: &str) -> Count {
    let raw = raw.trim();
    if raw.is_empty() {
        return Count::Empty;
    }
    if let Ok(v) = raw.parse::<i64>() {
        return if v >= 0 { Count::Value(v) } else { Count::Invalid };
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= i64::MAX as f64 => {
            Count::Value(f as i64)
        }
        _ => Count::Invalid,
    }
}

/// 严格按 `M/d/yy` 解析表头日期，其它格式返回 None
pub fn parse_header_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split('/').collect();
    let &[month, day, year] = parts.as_slice() else {
        return None;
    };
    let is_digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !is_digits(month, 1, 2) || !is_digits(day, 1, 2) || !is_digits(year, 2, 2) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%y").ok()
}

/// 读取一个时间序列 CSV 并合并进 `data`
///
/// 行级错误记录到 `report` 后跳过，不会中断整个文件。
pub fn read_time_series<R: Read>(
    reader: R,
    kind: SeriesKind,
    data: &mut SeriesMap,
    report: &mut FileReport,
) -> Result<(), csv::Error> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let date_columns: Vec<(usize, NaiveDate)> = headers
        .iter()
        .enumerate()
        .skip(IDENTITY_COLUMNS)
        .filter_map(|(idx, h)| parse_header_date(h).map(|d| (idx, d)))
        .collect();

    let ignored = headers.len().saturating_sub(IDENTITY_COLUMNS) - date_columns.len();
    if ignored > 0 {
        debug!("{}: {} header columns are not M/d/yy dates, ignored", report.path, ignored);
    }

    for (row_idx, result) in csv_reader.records().enumerate() {
        let row_num = row_idx + 2; // 1-based，跳过 header

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                report.skip_row(format!("Row {}: CSV parse error: {}", row_num, e));
                continue;
            }
        };

        let country = record.get(1).unwrap_or("").trim();
        if country.is_empty() {
            report.skip_row(format!("Row {}: empty Country/Region", row_num));
            continue;
        }
        let key = LocationKey::new(record.get(0), country);

        let series = data.entry(key).or_default();
        for &(idx, date) in &date_columns {
            let count = parse_count(record.get(idx).unwrap_or(""));
            if count == Count::Invalid {
                report.invalid_cells += 1;
                warn!(
                    "{} row {}: invalid {} value {:?} on {}, using 0",
                    report.path,
                    row_num,
                    kind,
                    record.get(idx).unwrap_or(""),
                    date
                );
            }
            kind.apply(series.entry(date).or_default(), count.or_zero());
        }
        report.rows_read += 1;
    }

    Ok(())
}

/// 打开并读取时间序列文件；打开失败时整个文件被跳过
pub fn load_time_series_file(path: &str, kind: SeriesKind, data: &mut SeriesMap) -> FileReport {
    let mut report = FileReport::new(path, kind.as_ref());

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

    if let Err(e) = read_time_series(BufReader::new(file), kind, data, &mut report) {
        report.fail(format!("Failed to read {}: {}", path, e));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIRMED: &str = "\
Province/State,Country/Region,Lat,Long,1/1/22,1/2/22,not-a-date,1/3/2022
,Foo,1.0,2.0,10,15,99,7
Hubei,China,30.9,112.2,100,,x,1
,,0,0,1,1,1,1
";

    fn read(csv: &str, kind: SeriesKind, data: &mut SeriesMap) -> FileReport {
        let mut report = FileReport::new("test.csv", kind.as_ref());
        report.found = true;
        read_time_series(csv.as_bytes(), kind, data, &mut report).unwrap();
        report
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_header_date_is_strict() {
        assert_eq!(parse_header_date("1/22/20"), Some(d(2020, 1, 22)));
        assert_eq!(parse_header_date("12/1/21"), Some(d(2021, 12, 1)));
        assert_eq!(parse_header_date("01/02/22"), Some(d(2022, 1, 2)));
        assert_eq!(parse_header_date("1/3/2022"), None);
        assert_eq!(parse_header_date("2022-01-03"), None);
        assert_eq!(parse_header_date("13/1/22"), None);
        assert_eq!(parse_header_date("Lat"), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("42"), Count::Value(42));
        assert_eq!(parse_count(" 7 "), Count::Value(7));
        assert_eq!(parse_count("12.0"), Count::Value(12));
        assert_eq!(parse_count(""), Count::Empty);
        assert_eq!(parse_count("-3"), Count::Invalid);
        assert_eq!(parse_count("1.5"), Count::Invalid);
        assert_eq!(parse_count("abc"), Count::Invalid);
    }

    #[test]
    fn test_reshape_skips_bad_columns_and_rows() {
        let mut data = SeriesMap::new();
        let report = read(CONFIRMED, SeriesKind::Confirmed, &mut data);

        assert_eq!(report.rows_read, 2);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(data.len(), 2);

        let foo = &data[&LocationKey::new(None, "Foo")];
        assert_eq!(foo.len(), 2);
        assert_eq!(foo[&d(2022, 1, 1)].confirmed, 10);
        assert_eq!(foo[&d(2022, 1, 2)].confirmed, 15);

        let hubei = &data[&LocationKey::new(Some("Hubei"), "China")];
        assert_eq!(hubei[&d(2022, 1, 2)].confirmed, 0);
        assert_eq!(report.invalid_cells, 0);
    }

    #[test]
    fn test_files_merge_into_one_triple() {
        let deaths = "\
Province/State,Country/Region,Lat,Long,1/1/22,1/2/22
,Foo,1.0,2.0,1,oops
";
        let mut data = SeriesMap::new();
        read(CONFIRMED, SeriesKind::Confirmed, &mut data);
        let report = read(deaths, SeriesKind::Deaths, &mut data);

        assert_eq!(report.invalid_cells, 1);
        let foo = &data[&LocationKey::new(None, "Foo")];
        assert_eq!(foo[&d(2022, 1, 1)], MetricTriple::new(10, 1, 0));
        // 死亡数无法解析时按 0 处理，行本身保留
        assert_eq!(foo[&d(2022, 1, 2)], MetricTriple::new(15, 0, 0));
    }

    #[test]
    fn test_missing_file_is_reported_not_fatal() {
        let mut data = SeriesMap::new();
        let report = load_time_series_file("/nonexistent/confirmed.csv", SeriesKind::Confirmed, &mut data);
        assert!(!report.found);
        assert_eq!(report.errors.len(), 1);
        assert!(data.is_empty());
    }
}
