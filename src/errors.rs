use std::fmt;

use actix_web::http::StatusCode;

/// 数据库层的 `DbErr` 统一经 `storage::backend::map_db_err` 转换，
/// 连接类故障保留为 `DatabaseConnection`，导入流程据此中止。
#[derive(Debug, Clone)]
pub enum CovidError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    DateParse(String),
}

impl CovidError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            CovidError::DatabaseConfig(_) => "E001",
            CovidError::DatabaseConnection(_) => "E002",
            CovidError::DatabaseOperation(_) => "E003",
            CovidError::DateParse(_) => "E004",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            CovidError::DatabaseConfig(_) => "Database Configuration Error",
            CovidError::DatabaseConnection(_) => "Database Connection Error",
            CovidError::DatabaseOperation(_) => "Database Operation Error",
            CovidError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            CovidError::DatabaseConfig(msg)
            | CovidError::DatabaseConnection(msg)
            | CovidError::DatabaseOperation(msg)
            | CovidError::DateParse(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            CovidError::DateParse(_) => StatusCode::BAD_REQUEST,
            CovidError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            CovidError::DatabaseConfig(_) | CovidError::DatabaseOperation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for CovidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CovidError {}

// 便捷的构造函数
impl CovidError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        CovidError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        CovidError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        CovidError::DatabaseOperation(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        CovidError::DateParse(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CovidError>;
