//! API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use super::error_code::ErrorCode;
use super::types::ErrorBody;
use crate::errors::CovidError;

/// 解析 `date` 查询参数：`YYYY-MM-DD` 或 RFC3339（只取日期部分）
pub fn parse_date_param(raw: &str) -> Result<NaiveDate, CovidError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| {
            CovidError::date_parse(format!(
                "Invalid date: {}. Use YYYY-MM-DD or RFC3339 format",
                raw
            ))
        })
}

/// 200 OK + JSON
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok()
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(data)
}

/// 构建错误响应
pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ErrorBody {
            code,
            message: message.to_string(),
        })
}

/// 从 CovidError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_covid(err: &CovidError) -> HttpResponse {
    if err.http_status().is_server_error() {
        tracing::error!("Request failed: {}", err);
    }
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(result: Result<T, CovidError>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_covid(&e),
    }
}
