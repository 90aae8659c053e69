pub mod daily_metric;
pub mod location;

pub use daily_metric::Entity as DailyMetricEntity;
pub use location::Entity as LocationEntity;
