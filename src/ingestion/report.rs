//! 导入报告
//!
//! 非致命错误（缺失文件、坏行、单个地点写入失败）都累积在这里，运行结束时统一输出。

use colored::Colorize;

/// 单个源文件的处理结果
#[derive(Debug, Clone, Default)]
pub struct FileReport {
    pub path: String,
    pub kind: String,
    pub found: bool,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub invalid_cells: usize,
    pub errors: Vec<String>,
}

impl FileReport {
    pub fn new(path: &str, kind: &str) -> Self {
        Self {
            path: path.to_string(),
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    /// 跳过一行并记录原因
    pub fn skip_row(&mut self, reason: String) {
        tracing::warn!("{}: {}", self.path, reason);
        self.rows_skipped += 1;
        self.errors.push(reason);
    }

    /// 整个文件被跳过
    pub fn fail(&mut self, reason: String) {
        tracing::warn!("Skipping {} file: {}", self.kind, reason);
        self.errors.push(reason);
    }
}

/// 一次导入运行的汇总
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub files: Vec<FileReport>,
    pub locations_created: usize,
    pub metrics_inserted: usize,
    pub metrics_existing: usize,
    pub location_failures: Vec<String>,
}

impl ImportReport {
    pub fn missing_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.found)
    }

    pub fn has_failures(&self) -> bool {
        !self.location_failures.is_empty() || self.files.iter().any(|f| !f.errors.is_empty())
    }

    /// 输出到终端
    pub fn print(&self) {
        println!("{}", "Import summary".bold().cyan());
        for file in &self.files {
            let status = if file.found {
                "found".green()
            } else {
                "missing".red()
            };
            println!(
                "  {:<10} {} [{}]  read: {}  skipped: {}  invalid cells: {}",
                file.kind,
                file.path,
                status,
                file.rows_read.to_string().green(),
                file.rows_skipped.to_string().yellow(),
                file.invalid_cells.to_string().yellow()
            );
        }
        println!(
            "  locations created: {}  metric rows inserted: {}  already present: {}",
            self.locations_created.to_string().green(),
            self.metrics_inserted.to_string().green(),
            self.metrics_existing.to_string().cyan()
        );
        if !self.location_failures.is_empty() {
            println!(
                "  {} {} location(s) rolled back:",
                "!".red().bold(),
                self.location_failures.len()
            );
            for failure in &self.location_failures {
                println!("    - {}", failure);
            }
        }
    }
}
