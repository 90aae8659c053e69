//! 地点实体：(province_state, country_region) 唯一

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub location_id: i32,
    pub province_state: Option<String>,
    pub country_region: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub lat: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub long: Option<f64>,
    pub iso3: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::daily_metric::Entity")]
    DailyMetric,
}

impl Related<super::daily_metric::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyMetric.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
