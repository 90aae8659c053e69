//! Import mode
//!
//! One-shot ingestion of the configured CSV files. Only a storage failure
//! aborts the run; per-file and per-row problems end up in the printed report,
//! which is printed even when the run is aborted.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::StaticConfig;
use crate::ingestion::{ImportReport, Importer};
use crate::storage::StorageFactory;

pub async fn run_import(config: &StaticConfig) -> Result<ImportReport> {
    let storage = StorageFactory::create(&config.database)
        .await
        .map_err(|e| {
            eprintln!("{}", e.format_colored());
            e
        })
        .context("Failed to open storage")?;

    let importer = Importer::new(storage, config.import.clone());
    let report = match importer.run().await {
        Ok(report) => report,
        Err(aborted) => {
            // 中止前已处理的文件与写入计数照样输出
            aborted.report.print();
            eprintln!("{}", aborted.error.format_colored());
            return Err(aborted).context("Import aborted");
        }
    };

    report.print();
    if report.has_failures() {
        warn!("Import finished with non-fatal errors");
    } else {
        info!("Import finished cleanly");
    }
    Ok(report)
}
