//! 导入管线集成测试
//!
//! 覆盖三文件合并、快照导入、缺失文件、重复运行的幂等性，
//! 以及 NULL 省份的地点去重。

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database};
use tempfile::TempDir;

use covidmap::config::{DatabaseConfig, ImportConfig};
use covidmap::ingestion::Importer;
use covidmap::services::AggregationService;
use covidmap::storage::{LocationKey, SeaOrmStorage};

// =============================================================================
// Test Setup
// =============================================================================

const CONFIRMED: &str = "\
Province/State,Country/Region,Lat,Long,1/1/22,1/2/22
,Foo,10.0,20.0,10,15
Hubei,China,30.9,112.2,100,110
Guangdong,China,23.3,113.4,50,52
";

const DEATHS: &str = "\
Province/State,Country/Region,Lat,Long,1/1/22,1/2/22
,Foo,10.0,20.0,1,n/a
Hubei,China,30.9,112.2,4,5
";

const RECOVERED: &str = "\
Province/State,Country/Region,Lat,Long,1/1/22,1/2/22
,Foo,10.0,20.0,0,2
";

const SNAPSHOT: &str = "\
Province_State,Country_Region,Last_Update,Lat,Long_,Confirmed,Deaths,Recovered,Active,ISO3,Date
Alabama,US,2022-02-22 04:20:55,32.3182,-86.9023,1265880,17833,,,USA,2022-02-21
Alaska,US,2022-02-22 04:20:55,61.3707,-152.4044,230000,1100,,,USA,2022-02-21
";

fn database_url(dir: &TempDir) -> String {
    let p = dir.path().join("ingestion_test.db");
    format!("sqlite://{}?mode=rwc", p.display())
}

async fn create_temp_storage(dir: &TempDir) -> Arc<SeaOrmStorage> {
    let u = database_url(dir);
    let s = SeaOrmStorage::new(&u, "sqlite", &DatabaseConfig::default())
        .await
        .unwrap();
    Arc::new(s)
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

fn full_config(dir: &TempDir) -> ImportConfig {
    ImportConfig {
        confirmed: Some(write_file(dir, "confirmed.csv", CONFIRMED)),
        deaths: Some(write_file(dir, "deaths.csv", DEATHS)),
        recovered: Some(write_file(dir, "recovered.csv", RECOVERED)),
        snapshot: Some(write_file(dir, "02-21-2022.csv", SNAPSHOT)),
        batch_size: 2,
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_full_import_counts() {
    let dir = TempDir::new().unwrap();
    let storage = create_temp_storage(&dir).await;

    let report = Importer::new(storage.clone(), full_config(&dir))
        .run()
        .await
        .unwrap();

    // Foo, Hubei, Guangdong, Alabama, Alaska
    assert_eq!(report.locations_created, 5);
    assert_eq!(report.metrics_inserted, 3 * 2 + 2);
    assert_eq!(report.metrics_existing, 0);
    assert!(report.location_failures.is_empty());
    assert_eq!(report.files.len(), 4);
    assert!(report.files.iter().all(|f| f.found));

    assert_eq!(storage.count_locations().await.unwrap(), 5);
    assert_eq!(storage.count_metrics().await.unwrap(), 8);
}

#[tokio::test]
async fn test_import_twice_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let storage = create_temp_storage(&dir).await;
    let config = full_config(&dir);
    let service = AggregationService::new(storage.clone());

    let first = Importer::new(storage.clone(), config.clone())
        .run()
        .await
        .unwrap();
    let metrics_after_first = storage.count_metrics().await.unwrap();
    let locations_after_first = storage.count_locations().await.unwrap();
    let values_after_first = service
        .daily_increase("Active", Some(d(2022, 1, 2)))
        .await
        .unwrap();

    let second = Importer::new(storage.clone(), config).run().await.unwrap();

    assert_eq!(second.locations_created, 0);
    assert_eq!(second.metrics_inserted, 0);
    assert_eq!(second.metrics_existing, first.metrics_inserted);
    assert_eq!(storage.count_metrics().await.unwrap(), metrics_after_first);
    assert_eq!(storage.count_locations().await.unwrap(), locations_after_first);
    assert_eq!(
        service
            .daily_increase("Active", Some(d(2022, 1, 2)))
            .await
            .unwrap(),
        values_after_first
    );
}

#[tokio::test]
async fn test_null_province_location_is_reused() {
    let dir = TempDir::new().unwrap();
    let storage = create_temp_storage(&dir).await;
    let config = ImportConfig {
        confirmed: Some(write_file(&dir, "confirmed.csv", CONFIRMED)),
        ..ImportConfig::empty()
    };

    Importer::new(storage.clone(), config.clone()).run().await.unwrap();
    Importer::new(storage.clone(), config).run().await.unwrap();

    assert_eq!(storage.count_locations().await.unwrap(), 3);
    assert!(
        storage
            .find_location(&LocationKey::new(Some(""), "Foo"))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_unparseable_deaths_default_to_zero() {
    let dir = TempDir::new().unwrap();
    let storage = create_temp_storage(&dir).await;

    Importer::new(storage.clone(), full_config(&dir))
        .run()
        .await
        .unwrap();

    let rows = storage.metrics_on(d(2022, 1, 2)).await.unwrap();
    let foo = rows.iter().find(|r| r.country_region == "Foo").unwrap();
    assert_eq!(foo.confirmed, Some(15));
    assert_eq!(foo.deaths, Some(0));
    assert_eq!(foo.recovered, Some(2));

    // Guangdong 不在 deaths/recovered 文件里，行仍然存在
    let guangdong: Vec<_> = rows
        .iter()
        .filter(|r| r.country_region == "China" && r.confirmed == Some(52))
        .collect();
    assert_eq!(guangdong.len(), 1);
    assert_eq!(guangdong[0].deaths, Some(0));
    assert_eq!(guangdong[0].recovered, Some(0));
}

#[tokio::test]
async fn test_missing_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    let storage = create_temp_storage(&dir).await;
    let config = ImportConfig {
        confirmed: Some(write_file(&dir, "confirmed.csv", CONFIRMED)),
        deaths: Some(dir.path().join("nope.csv").display().to_string()),
        ..ImportConfig::empty()
    };

    let importer = Importer::new(storage.clone(), config);
    let checks = importer.preflight();
    assert_eq!(checks.iter().filter(|c| !c.found).count(), 1);

    let report = importer.run().await.unwrap();
    assert_eq!(report.missing_files().count(), 1);
    assert!(report.has_failures());
    assert_eq!(report.metrics_inserted, 6);

    let rows = storage.metrics_on(d(2022, 1, 1)).await.unwrap();
    assert!(rows.iter().all(|r| r.deaths == Some(0)));
}

#[tokio::test]
async fn test_snapshot_locations_keep_coordinates() {
    let dir = TempDir::new().unwrap();
    let storage = create_temp_storage(&dir).await;
    let config = ImportConfig {
        snapshot: Some(write_file(&dir, "02-21-2022.csv", SNAPSHOT)),
        ..ImportConfig::empty()
    };

    let report = Importer::new(storage.clone(), config).run().await.unwrap();
    assert_eq!(report.files[0].rows_read, 2);

    let rows = storage.metrics_on(d(2022, 2, 21)).await.unwrap();
    assert_eq!(rows.len(), 2);
    let alabama = rows.iter().find(|r| r.confirmed == Some(1265880)).unwrap();
    assert_eq!(alabama.lat, Some(32.3182));
    assert_eq!(alabama.long, Some(-86.9023));
    assert_eq!(alabama.recovered, Some(0));
}

#[tokio::test]
async fn test_single_file_daily_increase() {
    let dir = TempDir::new().unwrap();
    let storage = create_temp_storage(&dir).await;
    let config = ImportConfig {
        confirmed: Some(write_file(
            &dir,
            "confirmed.csv",
            "Province/State,Country/Region,Lat,Long,1/1/22,1/2/22\n,Foo,0,0,10,15\n",
        )),
        ..ImportConfig::empty()
    };
    Importer::new(storage.clone(), config).run().await.unwrap();

    let result = AggregationService::new(storage)
        .daily_increase("Confirmed", Some(d(2022, 1, 2)))
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].country, "Foo");
    assert_eq!(result[0].current_value, 15);
    assert_eq!(result[0].previous_value, 10);
    assert_eq!(result[0].daily_increase, 5);
}

#[tokio::test]
async fn test_failed_location_is_rolled_back_and_import_continues() {
    let dir = TempDir::new().unwrap();
    let storage = create_temp_storage(&dir).await;

    // 第三个日期的写入失败，此时第一批（两行）已在同一事务内写入
    let side = Database::connect(database_url(&dir)).await.unwrap();
    side.execute_unprepared(
        "CREATE TRIGGER reject_marked_metric BEFORE INSERT ON daily_metrics \
         WHEN NEW.confirmed = 999 \
         BEGIN SELECT RAISE(ABORT, 'rejected by trigger'); END;",
    )
    .await
    .unwrap();

    let config = ImportConfig {
        confirmed: Some(write_file(
            &dir,
            "confirmed.csv",
            "Province/State,Country/Region,Lat,Long,1/1/22,1/2/22,1/3/22\n\
             ,Bad,0,0,1,2,999\n\
             ,Good,0,0,4,5,6\n",
        )),
        batch_size: 2,
        ..ImportConfig::empty()
    };

    let report = Importer::new(storage.clone(), config).run().await.unwrap();

    assert_eq!(report.location_failures.len(), 1);
    assert!(report.location_failures[0].starts_with("Bad"));
    assert_eq!(report.metrics_inserted, 3);

    let bad_id = storage
        .find_location(&LocationKey::new(None, "Bad"))
        .await
        .unwrap()
        .unwrap();
    for day in 1..=3 {
        let rows = storage.metrics_on(d(2022, 1, day)).await.unwrap();
        assert!(rows.iter().all(|r| r.location_id != bad_id));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].country_region, "Good");
    }
    assert_eq!(storage.count_metrics().await.unwrap(), 3);
}
