//! SeaORM storage backend
//!
//! Locations and daily metrics on SQLite, MySQL/MariaDB or PostgreSQL.

mod connection;
mod mutations;
mod query;
pub mod retry;

use sea_orm::{DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{CovidError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use retry::RetryPolicy;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(CovidError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 将 DbErr 转换为 CovidError
///
/// 连接类错误单独归为 DatabaseConnection，导入流程据此中止整个运行。
pub(crate) fn map_db_err(context: impl std::fmt::Display, err: DbErr) -> CovidError {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            CovidError::database_connection(format!("{}: {}", context, err))
        }
        other => CovidError::database_operation(format!("{}: {}", context, other)),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_policy: RetryPolicy,
}

impl SeaOrmStorage {
    /// 连接数据库并执行迁移
    ///
    /// 连接或迁移失败都属于致命错误，调用方应中止。
    pub async fn new(database_url: &str, backend_name: &str, config: &DatabaseConfig) -> Result<Self> {
        if database_url.is_empty() {
            return Err(CovidError::database_config("database_url 未设置"));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url, config).await?
        } else {
            connect_generic(database_url, backend_name, config).await?
        };

        run_migrations(&db).await?;

        info!("{} storage initialized", backend_name.to_uppercase());
        Ok(SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_policy: RetryPolicy::from(config),
        })
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }
}
