// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{index_table, mount_shift_jis_page, use_case_for};
use encoding_rs::{EUC_JP, SHIFT_JIS};
use press_harvester::config::settings::ExportSettings;
use press_harvester::domain::models::batch_report::HarvestOutcome;
use press_harvester::infrastructure::export::Exporter;
use press_harvester::infrastructure::storage::LocalStorage;
use tempfile::tempdir;
use wiremock::MockServer;

#[tokio::test]
async fn test_harvest_then_export_all_targets() {
    let server = MockServer::start().await;
    mount_shift_jis_page(
        &server,
        "2501m.html",
        &index_table(&[
            ("2025年1月7日", "情報通信審議会\t答申", "04tsushin.html", "情報流通行政局"),
            ("2025年1月17日", "消防白書", "05shobo.html", "消防庁"),
        ]),
    )
    .await;

    let use_case = use_case_for(&server);
    let endpoint = use_case.planner().endpoint_for(2025, 1);
    let HarvestOutcome::Harvested(report) = use_case.run_single_month(endpoint).await else {
        panic!("expected records");
    };

    let dir = tempdir().unwrap();
    let settings = ExportSettings {
        output_dir: dir.path().to_string_lossy().into_owned(),
        write_summary: true,
        ..ExportSettings::default()
    };
    let exporter = Exporter::from_settings(&settings).unwrap();
    let storage = LocalStorage::new(dir.path());

    let export = exporter.export(report.records(), &storage, "run").await;
    assert!(export.all_written());
    assert_eq!(export.written().count(), 4);

    let utf8 = std::fs::read(dir.path().join("run.csv")).unwrap();
    assert!(utf8.starts_with(&[0xEF, 0xBB, 0xBF]));
    let utf8 = String::from_utf8(utf8[3..].to_vec()).unwrap();
    assert!(utf8.starts_with("発表日,内容,部局,リンクURL,対象期間"));
    assert!(utf8.contains("消防白書"));

    let sjis = std::fs::read(dir.path().join("run_shift_jis.csv")).unwrap();
    let (decoded, _, had_errors) = SHIFT_JIS.decode(&sjis);
    assert!(!had_errors);
    assert!(decoded.contains("消防庁"));

    let euc = std::fs::read(dir.path().join("run_euc_jp.csv")).unwrap();
    let (decoded, _, _) = EUC_JP.decode(&euc);
    assert!(decoded.starts_with("発表日,内容,部局,リンクURL,対象期間"));

    let text = std::fs::read_to_string(dir.path().join("run_text.txt")).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in &lines {
        assert_eq!(line.split('\t').count(), 5);
    }
    assert!(lines[1].starts_with("2025年1月7日\t情報通信審議会 答申\t"));

    let summary = exporter
        .export_summary(&report.summary(), &storage, "run")
        .await
        .unwrap()
        .unwrap();
    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join(summary)).unwrap()).unwrap();
    assert_eq!(json["records"], 2);
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["interrupted"], false);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty());
}
