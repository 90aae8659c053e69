pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20220221_000001_locations;
mod m20220221_000002_daily_metrics;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220221_000001_locations::Migration),
            Box::new(m20220221_000002_daily_metrics::Migration),
        ]
    }
}
