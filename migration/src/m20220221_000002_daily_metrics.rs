//! 每日指标表迁移
//!
//! 创建 daily_metrics 表，每个 (location, date) 一行：
//! - confirmed / deaths / recovered 原始计数，默认 0
//! - active 不落库，查询时由 confirmed - deaths - recovered 计算
//! - location_id 外键，删除时 RESTRICT

use sea_orm_migration::prelude::*;

use super::m20220221_000001_locations::Locations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyMetrics::MetricId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DailyMetrics::LocationId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyMetrics::Date).date().not_null())
                    .col(
                        ColumnDef::new(DailyMetrics::Confirmed)
                            .big_integer()
                            .null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyMetrics::Deaths)
                            .big_integer()
                            .null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyMetrics::Recovered)
                            .big_integer()
                            .null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_metrics_location")
                            .from(DailyMetrics::Table, DailyMetrics::LocationId)
                            .to(Locations::Table, Locations::LocationId)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个地点每天最多一行，同时服务于相邻日期的自连接
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_daily_metrics_location_date")
                    .table(DailyMetrics::Table)
                    .col(DailyMetrics::LocationId)
                    .col(DailyMetrics::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按日期切分（当天 / 前一天）与日期目录查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_metrics_date")
                    .table(DailyMetrics::Table)
                    .col(DailyMetrics::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_daily_metrics_date").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("uq_daily_metrics_location_date").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DailyMetrics::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyMetrics {
    #[sea_orm(iden = "daily_metrics")]
    Table,
    MetricId,
    LocationId,
    Date,
    Confirmed,
    Deaths,
    Recovered,
}
