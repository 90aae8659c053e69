//! CSV 导入管线
//!
//! 流程：预检源文件 -> 读取并合并时间序列 -> 落库 -> 读取快照 -> 落库。
//! 每个文件在写库前都已完整解析到内存；落库按地点分事务，单个地点失败只回滚该地点。

pub mod report;
pub mod snapshot;
pub mod time_series;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::config::ImportConfig;
use crate::errors::{CovidError, Result};
use crate::storage::{InsertOutcome, MetricTriple, NewLocation, SeaOrmStorage};

pub use report::{FileReport, ImportReport};
pub use snapshot::{SNAPSHOT_KIND, SnapshotMap, load_snapshot_file, parse_snapshot_date, read_snapshot};
pub use time_series::{
    SeriesKind, SeriesMap, load_time_series_file, parse_header_date, read_time_series,
};

/// 预检结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCheck {
    pub kind: String,
    pub path: String,
    pub found: bool,
}

/// 致命错误中止导入，附带中止前已经累积的报告
#[derive(Debug)]
pub struct ImportAborted {
    pub report: ImportReport,
    pub error: CovidError,
}

impl fmt::Display for ImportAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (aborted after {} file(s) read, {} locations created, {} metric rows inserted)",
            self.error,
            self.report.files.iter().filter(|file| file.found).count(),
            self.report.locations_created,
            self.report.metrics_inserted
        )
    }
}

impl std::error::Error for ImportAborted {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub struct Importer {
    storage: Arc<SeaOrmStorage>,
    config: ImportConfig,
}

impl Importer {
    pub fn new(storage: Arc<SeaOrmStorage>, config: ImportConfig) -> Self {
        Self { storage, config }
    }

    fn series_sources(&self) -> Vec<(SeriesKind, &str)> {
        [
            (SeriesKind::Confirmed, self.config.confirmed.as_deref()),
            (SeriesKind::Deaths, self.config.deaths.as_deref()),
            (SeriesKind::Recovered, self.config.recovered.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, path)| path.map(|p| (kind, p)))
        .collect()
    }

    /// 检查所有已配置的源文件是否存在
    pub fn preflight(&self) -> Vec<SourceCheck> {
        let mut checks: Vec<SourceCheck> = self
            .series_sources()
            .into_iter()
            .map(|(kind, path)| SourceCheck {
                kind: kind.to_string(),
                path: path.to_string(),
                found: Path::new(path).is_file(),
            })
            .collect();
        if let Some(path) = self.config.snapshot.as_deref() {
            checks.push(SourceCheck {
                kind: SNAPSHOT_KIND.to_string(),
                path: path.to_string(),
                found: Path::new(path).is_file(),
            });
        }

        for check in &checks {
            if check.found {
                info!("Found {} source: {}", check.kind, check.path);
            } else {
                warn!("Missing {} source: {}", check.kind, check.path);
            }
        }
        checks
    }

    /// 执行一次完整导入
    ///
    /// 只有存储不可用时返回错误，错误中带有中止前的报告；其余问题都记录在报告里。
    pub async fn run(&self) -> std::result::Result<ImportReport, ImportAborted> {
        let mut report = ImportReport::default();
        match self.run_into(&mut report).await {
            Ok(()) => Ok(report),
            Err(error) => Err(ImportAborted { report, error }),
        }
    }

    async fn run_into(&self, report: &mut ImportReport) -> Result<()> {
        let checks = self.preflight();
        let missing = checks.iter().filter(|c| !c.found).count();
        if missing > 0 {
            warn!("{} of {} configured source files are missing", missing, checks.len());
        }

        // 时间序列：三个文件先合并再落库
        let mut series = SeriesMap::new();
        for (kind, path) in self.series_sources() {
            let file_report = load_time_series_file(path, kind, &mut series);
            info!(
                "{}: {} rows processed, {} skipped",
                path, file_report.rows_read, file_report.rows_skipped
            );
            report.files.push(file_report);
        }
        info!("Time series merged: {} locations", series.len());
        for (key, metrics) in &series {
            self.persist(&NewLocation::bare(key.clone()), metrics, report)
                .await?;
        }

        // 单日快照
        if let Some(path) = self.config.snapshot.as_deref() {
            let mut snapshot = SnapshotMap::new();
            let file_report = load_snapshot_file(path, &mut snapshot);
            info!(
                "{}: {} rows imported, {} skipped",
                path, file_report.rows_read, file_report.rows_skipped
            );
            report.files.push(file_report);
            for entry in snapshot.values() {
                self.persist(&entry.location, &entry.metrics, report)
                    .await?;
            }
        }

        info!(
            "Import finished: {} locations created, {} metric rows inserted, {} already present, {} location failures",
            report.locations_created,
            report.metrics_inserted,
            report.metrics_existing,
            report.location_failures.len()
        );
        Ok(())
    }

    /// 写入一个地点；连接失败向上传播，其它错误记入报告后继续
    async fn persist(
        &self,
        location: &NewLocation,
        metrics: &BTreeMap<NaiveDate, MetricTriple>,
        report: &mut ImportReport,
    ) -> Result<()> {
        let result: Result<InsertOutcome> = async {
            let (location_id, created) = self.storage.get_or_insert_location(location).await?;
            if created {
                report.locations_created += 1;
            }
            self.storage
                .insert_location_metrics(location_id, metrics, self.config.batch_size)
                .await
        }
        .await;

        match result {
            Ok(outcome) => {
                report.metrics_inserted += outcome.inserted;
                report.metrics_existing += outcome.existing;
                Ok(())
            }
            Err(e @ CovidError::DatabaseConnection(_)) => {
                error!("Storage unavailable while importing {}: {}", location.key, e);
                Err(e)
            }
            Err(e) => {
                warn!("Skipping location {}: {}", location.key, e);
                report
                    .location_failures
                    .push(format!("{}: {}", location.key, e.message()));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborted_import_keeps_partial_counts() {
        let mut report = ImportReport::default();
        let mut file = FileReport::new("confirmed.csv", "Confirmed");
        file.found = true;
        file.rows_read = 280;
        report.files.push(file);
        report.files.push(FileReport::new("deaths.csv", "Deaths"));
        report.locations_created = 12;
        report.metrics_inserted = 340;

        let aborted = ImportAborted {
            report,
            error: CovidError::database_connection("pool timed out"),
        };
        let message = aborted.to_string();
        assert!(message.contains("pool timed out"));
        assert!(message.contains("after 1 file(s) read"));
        assert!(message.contains("12 locations created"));
        assert!(message.contains("340 metric rows inserted"));
        assert_eq!(aborted.report.files[0].rows_read, 280);
        assert!(std::error::Error::source(&aborted).is_some());
    }
}
