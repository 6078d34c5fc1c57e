// ReportAssembler tests: payload content per granularity

mod common;

use common::*;
use hostwatch::analysis::{Effectiveness, OverallRating};
use hostwatch::metric_store::{MetricStore, TimeRange};
use hostwatch::models::*;
use hostwatch::report::{ReportAssembler, ReportGranularity};

const END: i64 = 200 * DAY;

/// /var climbs 70 -> 82 over four days; four disk alerts two days before END.
async fn seed(store: &MetricStore) {
    for (i, usage) in [70.0, 74.0, 78.0, 82.0].into_iter().enumerate() {
        let batch = SampleBatch {
            disk_usage: vec![disk("/var", usage), disk("/", 30.0)],
            system_health: vec![health(20.0 + i as f64, 50.0, 0.4)],
            ..Default::default()
        };
        store
            .insert_samples_at(&batch, END - (5 - i as i64) * DAY)
            .await
            .unwrap();
    }
    let drafts = vec![draft(AlertType::DiskUsage, Severity::Warning); 4];
    store.insert_alerts_at(&drafts, END - DAY).await.unwrap();
}

#[tokio::test]
async fn empty_store_yields_healthy_daily_report() {
    let (_dir, store, _path) = temp_store().await;
    let payload = ReportAssembler::new(&store)
        .build_report(TimeRange::last_days(END, 1), ReportGranularity::Daily)
        .await
        .unwrap();
    assert!(payload.cleanup.is_empty());
    assert!(payload.cleanup_rollup.is_none());
    assert_eq!(payload.alerts.total, 0);
    assert!(payload.statistics.is_none());
    assert_eq!(
        payload.recommendations,
        vec!["System appears healthy - continue regular monitoring"]
    );
    assert_eq!(payload.trend_window.since, END - 7 * DAY);
}

#[tokio::test]
async fn single_reading_path_gets_no_disk_advice() {
    let (_dir, store, _path) = temp_store().await;
    let batch = SampleBatch {
        disk_usage: vec![disk("/data", 90.0)],
        ..Default::default()
    };
    store.insert_samples_at(&batch, END - DAY / 2).await.unwrap();

    let payload = ReportAssembler::new(&store)
        .build_report(TimeRange::last_days(END, 1), ReportGranularity::Daily)
        .await
        .unwrap();
    assert!(payload.trends.disk_usage.is_empty());
    assert!(payload.cleanup.is_empty());
    assert_eq!(
        payload.recommendations,
        vec!["System appears healthy - continue regular monitoring"]
    );
}

#[tokio::test]
async fn weekly_report_covers_cleanup_trends_and_alerts() {
    let (_dir, store, _path) = temp_store().await;
    seed(&store).await;
    let payload = ReportAssembler::new(&store)
        .build_report(TimeRange::last_days(END, 7), ReportGranularity::Weekly)
        .await
        .unwrap();

    let var = &payload.cleanup["/var"];
    assert_eq!(var.trend, 12.0);
    assert_eq!(var.effectiveness, Effectiveness::Poor);
    assert_eq!(payload.cleanup["/"].effectiveness, Effectiveness::Stable);
    let rollup = payload.cleanup_rollup.as_ref().unwrap();
    assert_eq!(rollup.good_paths, 0);
    assert_eq!(rollup.total_paths, 2);
    assert_eq!(rollup.rating, OverallRating::NeedsImprovement);

    assert_eq!(payload.alerts.total, 4);
    assert_eq!(payload.alerts.count(Severity::Warning), 4);
    assert_eq!(payload.alerts.unresolved, 4);
    assert!(payload.statistics.is_none());

    assert_eq!(
        payload.recommendations,
        vec![
            "Monitor CPU usage - increasing trend detected",
            "Consider cleanup for /var - usage at 82%",
            "Address recurring disk_usage alerts (4 occurrences)",
        ]
    );
}

#[tokio::test]
async fn monthly_report_adds_statistics_and_long_horizon_advice() {
    let (_dir, store, _path) = temp_store().await;
    seed(&store).await;
    let payload = ReportAssembler::new(&store)
        .build_report(TimeRange::last_days(END, 30), ReportGranularity::Monthly)
        .await
        .unwrap();

    let stats = payload.statistics.as_ref().unwrap();
    assert_eq!(stats.data_points, 4);
    assert_eq!(stats.total_alerts, 4);
    let cpu = stats.cpu.as_ref().unwrap();
    assert_eq!(cpu.average, 21.5);
    assert_eq!(cpu.peak, 23.0);

    assert_eq!(
        payload.recommendations,
        vec![
            "Improve cleanup strategies for: /var",
            "Plan capacity expansion for: /var",
        ]
    );
    assert_eq!(payload.trend_window.since, END - 90 * DAY);
}

#[tokio::test]
async fn window_end_is_exclusive() {
    let (_dir, store, _path) = temp_store().await;
    seed(&store).await;
    // ends right where the alerts were written
    let payload = ReportAssembler::new(&store)
        .build_report(TimeRange::last_days(END - DAY, 7), ReportGranularity::Weekly)
        .await
        .unwrap();
    assert_eq!(payload.alerts.total, 0);
}

#[tokio::test]
async fn payload_serializes_to_json() {
    let (_dir, store, _path) = temp_store().await;
    seed(&store).await;
    let payload = ReportAssembler::new(&store)
        .build_report(TimeRange::last_days(END, 7), ReportGranularity::Weekly)
        .await
        .unwrap();
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["granularity"], "weekly");
    assert_eq!(json["trends"]["memory"]["status"], "available");
    assert_eq!(json["trends"]["memory"]["trend"], "stable");
    assert_eq!(json["trends"]["disk_usage"]["/var"]["trend"], "increasing");
    assert_eq!(json["cleanup"]["/var"]["effectiveness"], "poor");
    assert_eq!(json["cleanup_rollup"]["rating"], "Needs Improvement");
    assert_eq!(json["alerts"]["by_severity"]["warning"], 4);
    assert_eq!(json["alerts"]["by_type"]["disk_usage"], 4);
    assert_eq!(json["alerts"]["most_recent"].as_array().unwrap().len(), 4);
}
