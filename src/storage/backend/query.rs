//! Query operations for SeaOrmStorage
//!
//! 所有只读查询。按日期切分的查询都依赖 `idx_daily_metrics_date`。

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use tracing::debug;

use super::{SeaOrmStorage, map_db_err, retry};
use crate::errors::Result;
use crate::storage::models::{LocationKey, MetricRow, StorageStats};

use migration::entities::{daily_metric, location};

impl SeaOrmStorage {
    /// 按自然键精确查找地点 id
    pub async fn find_location(&self, key: &LocationKey) -> Result<Option<i32>> {
        let mut select = location::Entity::find()
            .select_only()
            .column(location::Column::LocationId)
            .filter(location::Column::CountryRegion.eq(key.country_region.as_str()));
        select = match &key.province_state {
            Some(province) => select.filter(location::Column::ProvinceState.eq(province.as_str())),
            None => select.filter(location::Column::ProvinceState.is_null()),
        };

        let db = &self.db;
        retry::with_retry(&format!("find_location({})", key), self.retry_policy, || {
            select.clone().into_tuple::<i32>().one(db)
        })
        .await
        .map_err(|e| map_db_err(format!("查询地点失败 {}", key), e))
    }

    /// 库中最新的日期；空库返回 None
    pub async fn latest_metric_date(&self) -> Result<Option<NaiveDate>> {
        let db = &self.db;
        retry::with_retry("latest_metric_date", self.retry_policy, || {
            daily_metric::Entity::find()
                .select_only()
                .column(daily_metric::Column::Date)
                .order_by_desc(daily_metric::Column::Date)
                .limit(1)
                .into_tuple::<NaiveDate>()
                .one(db)
        })
        .await
        .map_err(|e| map_db_err("查询最新日期失败", e))
    }

    /// 某一天的全部指标行（连同地点的国家与坐标），按 location_id 升序
    pub async fn metrics_on(&self, date: NaiveDate) -> Result<Vec<MetricRow>> {
        let db = &self.db;
        let rows = retry::with_retry(&format!("metrics_on({})", date), self.retry_policy, || {
            daily_metric::Entity::find()
                .select_only()
                .column(daily_metric::Column::LocationId)
                .column(location::Column::CountryRegion)
                .column(location::Column::Lat)
                .column(location::Column::Long)
                .column(daily_metric::Column::Confirmed)
                .column(daily_metric::Column::Deaths)
                .column(daily_metric::Column::Recovered)
                .join(JoinType::InnerJoin, daily_metric::Relation::Location.def())
                .filter(daily_metric::Column::Date.eq(date))
                .order_by_asc(daily_metric::Column::LocationId)
                .into_model::<MetricRow>()
                .all(db)
        })
        .await
        .map_err(|e| map_db_err(format!("查询 {} 的指标失败", date), e))?;

        debug!("Loaded {} metric rows for {}", rows.len(), date);
        Ok(rows)
    }

    /// 去重后的日期，倒序，最多 `limit` 个
    pub async fn distinct_dates(&self, limit: u64) -> Result<Vec<NaiveDate>> {
        let db = &self.db;
        retry::with_retry("distinct_dates", self.retry_policy, || {
            daily_metric::Entity::find()
                .select_only()
                .column(daily_metric::Column::Date)
                .distinct()
                .order_by_desc(daily_metric::Column::Date)
                .limit(limit)
                .into_tuple::<NaiveDate>()
                .all(db)
        })
        .await
        .map_err(|e| map_db_err("查询日期目录失败", e))
    }

    pub async fn count_locations(&self) -> Result<u64> {
        location::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| map_db_err("统计地点失败", e))
    }

    pub async fn count_metrics(&self) -> Result<u64> {
        daily_metric::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| map_db_err("统计指标失败", e))
    }

    /// 存储概况
    pub async fn stats(&self) -> Result<StorageStats> {
        Ok(StorageStats {
            backend: self.backend_name.clone(),
            locations: self.count_locations().await?,
            metrics: self.count_metrics().await?,
            latest_date: self.latest_metric_date().await?,
        })
    }
}
