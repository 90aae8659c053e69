//! 聚合查询端点
//!
//! - `GET /aggregate/daily-increase?type=&date=`
//! - `GET /aggregate/daily-increase/dates`
//! - `GET /aggregate/summary?type=`

use actix_web::{HttpResponse, Responder, web};
use tracing::trace;

use super::helpers::{api_result, error_from_covid, parse_date_param};
use super::types::{
    DailyIncreaseQuery, DailyIncreaseRecord, DateEntry, SummaryQuery, SummaryRecord,
};
use crate::services::AggregationService;

pub struct AggregateApi;

impl AggregateApi {
    pub async fn daily_increase(
        service: web::Data<AggregationService>,
        query: web::Query<DailyIncreaseQuery>,
    ) -> impl Responder {
        let query = query.into_inner();
        trace!("daily-increase query: {:?}", query);

        let date = match query.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match parse_date_param(raw) {
                Ok(date) => Some(date),
                Err(e) => return error_from_covid(&e),
            },
            _ => None,
        };
        let metric_type = query.metric_type.unwrap_or_default();

        api_result(
            service
                .daily_increase(&metric_type, date)
                .await
                .map(|rows| {
                    rows.into_iter()
                        .map(DailyIncreaseRecord::from)
                        .collect::<Vec<_>>()
                }),
        )
    }

    pub async fn available_dates(service: web::Data<AggregationService>) -> impl Responder {
        api_result(service.available_dates().await.map(|dates| {
            dates
                .into_iter()
                .map(|date| DateEntry { date })
                .collect::<Vec<_>>()
        }))
    }

    pub async fn summary(
        service: web::Data<AggregationService>,
        query: web::Query<SummaryQuery>,
    ) -> HttpResponse {
        let summary_type = query.into_inner().summary_type.unwrap_or_default();
        api_result(service.summary(&summary_type).await.map(|rows| {
            rows.into_iter()
                .map(SummaryRecord::from)
                .collect::<Vec<_>>()
        }))
    }
}

/// Aggregate 路由配置
pub fn aggregate_routes() -> actix_web::Scope {
    web::scope("/aggregate")
        .route("/daily-increase", web::get().to(AggregateApi::daily_increase))
        .route(
            "/daily-increase/dates",
            web::get().to(AggregateApi::available_dates),
        )
        .route("/summary", web::get().to(AggregateApi::summary))
}
