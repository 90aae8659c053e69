//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use super::types::TS_EXPORT_PATH;
use crate::errors::CovidError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，ts-rs 自动生成 TypeScript 类型。
/// - 1000-1099: 通用错误
/// - 6000-6099: 聚合查询错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    // 通用错误 1000-1099
    InternalServerError = 1005,
    InvalidDateFormat = 1012,
    ServiceUnavailable = 1030,

    // 聚合错误 6000-6099
    AggregationQueryFailed = 6000,
}

impl From<&CovidError> for ErrorCode {
    fn from(err: &CovidError) -> Self {
        match err {
            CovidError::DateParse(_) => ErrorCode::InvalidDateFormat,
            CovidError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            CovidError::DatabaseOperation(_) => ErrorCode::AggregationQueryFailed,
            CovidError::DatabaseConfig(_) => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::InvalidDateFormat).unwrap(), "1012");
        assert_eq!(
            ErrorCode::from(&CovidError::date_parse("x")),
            ErrorCode::InvalidDateFormat
        );
        assert_eq!(
            ErrorCode::from(&CovidError::database_connection("x")),
            ErrorCode::ServiceUnavailable
        );
    }
}
