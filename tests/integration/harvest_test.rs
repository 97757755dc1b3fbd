// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{index_table, mount_shift_jis_page, mount_status, use_case_for};
use press_harvester::domain::models::batch_report::HarvestOutcome;
use wiremock::MockServer;

#[tokio::test]
async fn test_batch_isolates_failed_month() {
    let server = MockServer::start().await;
    mount_shift_jis_page(
        &server,
        "2401m.html",
        &index_table(&[
            ("2024年1月9日", "情報通信白書の公表", "01tsushin01.html", "情報流通行政局"),
            ("2024年1月30日", "統計調査の結果", "/main_content/000001.pdf", "統計局"),
        ]),
    )
    .await;
    mount_status(&server, "2402m.html", 500).await;
    mount_shift_jis_page(
        &server,
        "2403m.html",
        &index_table(&[("2024年3月1日", "電波利用料の見直し", "02kiban.html", "総合通信基盤局")]),
    )
    .await;

    let use_case = use_case_for(&server);
    let endpoints: Vec<_> = (1..=3)
        .map(|m| use_case.planner().endpoint_for(2024, m))
        .collect();
    let outcome = use_case.run(endpoints, std::future::pending()).await;

    let HarvestOutcome::Harvested(report) = outcome else {
        panic!("expected harvested records");
    };
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_interrupted());

    let records = report.records();
    assert_eq!(records.len(), 3);
    // raw string order: "9日" sorts above "30日"
    let dates: Vec<_> = records.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2024年3月1日", "2024年1月9日", "2024年1月30日"]);

    let white_paper = records
        .iter()
        .find(|r| r.title == "情報通信白書の公表")
        .unwrap();
    assert_eq!(white_paper.department, "情報流通行政局");
    assert_eq!(white_paper.period, "2024年1月");
    assert_eq!(
        white_paper.link,
        format!("{}/menu_news/s-news/01tsushin01.html", server.uri())
    );

    let pdf = records.iter().find(|r| r.department == "統計局").unwrap();
    assert_eq!(pdf.link, format!("{}/main_content/000001.pdf", server.uri()));
    assert!(records.iter().all(|r| r.period != "2024年2月"));
}

#[tokio::test]
async fn test_single_month_without_table_is_empty() {
    let server = MockServer::start().await;
    mount_shift_jis_page(&server, "2310.html", "<html><body><p>掲載準備中</p></body></html>").await;

    let use_case = use_case_for(&server);
    let endpoint = use_case.planner().endpoint_for(2023, 10);
    let outcome = use_case.run_single_month(endpoint).await;

    assert!(matches!(outcome, HarvestOutcome::Empty(_)));
    let summary = outcome.summary();
    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.records, 0);
}

#[tokio::test]
async fn test_full_batch_counts_every_month() {
    let server = MockServer::start().await;
    mount_shift_jis_page(
        &server,
        "2310.html",
        &index_table(&[("2023年10月2日", "政策評価", "03hyouka.html", "行政評価局")]),
    )
    .await;

    let use_case = use_case_for(&server);
    let outcome = use_case
        .run_full_batch(2023, Some(2023), std::future::pending())
        .await;

    let summary = outcome.summary();
    assert_eq!(summary.planned, 12);
    assert_eq!(summary.attempted, 12);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 11);
    assert_eq!(outcome.report().records()[0].period, "2023年10月");
}
