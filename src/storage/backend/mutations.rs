//! Mutation operations for SeaOrmStorage
//!
//! 只有导入管线会写库：地点只插入不更新，指标按 (location, date) 只插入缺失的行。

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use tracing::{debug, info};

use super::{SeaOrmStorage, map_db_err, retry};
use crate::errors::Result;
use crate::storage::models::{InsertOutcome, MetricTriple, NewLocation};

use migration::entities::{daily_metric, location};

impl SeaOrmStorage {
    /// 查找地点，不存在则用当前来源提供的坐标创建
    ///
    /// 返回 (location_id, 是否新建)。已存在的地点不会被更新。
    pub async fn get_or_insert_location(&self, new: &NewLocation) -> Result<(i32, bool)> {
        if let Some(id) = self.find_location(&new.key).await? {
            return Ok((id, false));
        }

        let model = location::ActiveModel {
            province_state: Set(new.key.province_state.clone()),
            country_region: Set(new.key.country_region.clone()),
            lat: Set(new.lat),
            long: Set(new.long),
            iso3: Set(new.iso3.clone()),
            ..Default::default()
        };

        let db = &self.db;
        let inserted = retry::with_retry(
            &format!("insert_location({})", new.key),
            self.retry_policy,
            || model.clone().insert(db),
        )
        .await
        .map_err(|e| map_db_err(format!("创建地点失败 {}", new.key), e))?;

        debug!("Location created: {} -> {}", new.key, inserted.location_id);
        Ok((inserted.location_id, true))
    }

    /// 在单个事务中写入某地点的所有日期
    ///
    /// 已存在的 (location, date) 保持原值不动；失败时整个地点回滚。
    pub async fn insert_location_metrics(
        &self,
        location_id: i32,
        metrics: &BTreeMap<NaiveDate, MetricTriple>,
        batch_size: usize,
    ) -> Result<InsertOutcome> {
        if metrics.is_empty() {
            return Ok(InsertOutcome::default());
        }

        let outcome = retry::with_retry(
            &format!("insert_location_metrics({})", location_id),
            self.retry_policy,
            || self.insert_location_metrics_once(location_id, metrics, batch_size),
        )
        .await
        .map_err(|e| map_db_err(format!("写入地点 {} 的指标失败（已回滚）", location_id), e))?;

        if outcome.inserted > 0 {
            info!(
                "Location {}: {} metric rows inserted, {} already present",
                location_id, outcome.inserted, outcome.existing
            );
        }
        Ok(outcome)
    }

    async fn insert_location_metrics_once(
        &self,
        location_id: i32,
        metrics: &BTreeMap<NaiveDate, MetricTriple>,
        batch_size: usize,
    ) -> std::result::Result<InsertOutcome, DbErr> {
        let txn = self.db.begin().await?;

        let result = async {
            let existing: HashSet<NaiveDate> = daily_metric::Entity::find()
                .select_only()
                .column(daily_metric::Column::Date)
                .filter(daily_metric::Column::LocationId.eq(location_id))
                .into_tuple::<NaiveDate>()
                .all(&txn)
                .await?
                .into_iter()
                .collect();

            let fresh: Vec<daily_metric::ActiveModel> = metrics
                .iter()
                .filter(|(date, _)| !existing.contains(date))
                .map(|(date, triple)| daily_metric::ActiveModel {
                    location_id: Set(location_id),
                    date: Set(*date),
                    confirmed: Set(Some(triple.confirmed)),
                    deaths: Set(Some(triple.deaths)),
                    recovered: Set(Some(triple.recovered)),
                    ..Default::default()
                })
                .collect();

            let inserted = fresh.len();
            for chunk in fresh.chunks(batch_size.max(1)) {
                daily_metric::Entity::insert_many(chunk.to_vec())
                    .exec_without_returning(&txn)
                    .await?;
            }

            Ok::<_, DbErr>(InsertOutcome {
                inserted,
                existing: metrics.len() - inserted,
            })
        }
        .await;

        match result {
            Ok(outcome) => {
                txn.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    debug!("Rollback for location {} failed: {}", location_id, rollback_err);
                }
                Err(e)
            }
        }
    }
}
