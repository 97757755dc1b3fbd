// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Local;
use clap::{Parser, Subcommand};
use press_harvester::application::use_cases::harvest_use_case::HarvestUseCase;
use press_harvester::config::settings::Settings;
use press_harvester::domain::models::batch_report::HarvestOutcome;
use press_harvester::infrastructure::export::Exporter;
use press_harvester::infrastructure::storage::LocalStorage;
use press_harvester::utils::telemetry;
use tracing::{error, info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "press-harvester", about = "Harvest the monthly s-news press-release index")]
struct Cli {
    /// 输出JSON格式日志
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 抓取从起始年份到结束年份的全部月份
    Batch {
        /// 起始年份，缺省取配置中的 source.start_year
        #[arg(long)]
        start_year: Option<i32>,
        /// 结束年份，缺省为今年
        #[arg(long)]
        end_year: Option<i32>,
    },
    /// 只抓取一个月份，缺省为当前月份
    Month {
        #[arg(long, requires = "month")]
        year: Option<i32>,
        #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// 列出将要抓取的URL，不发起请求
    Plan {
        #[arg(long)]
        start_year: Option<i32>,
        #[arg(long)]
        end_year: Option<i32>,
    },
}

/// 主函数
///
/// 初始化日志与配置，执行子命令并导出结果
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    telemetry::init_telemetry(cli.json_logs);

    // 2. Load configuration
    let settings = Settings::new()?;
    info!(base_url = %settings.source.base_url, "Configuration loaded");

    let use_case = HarvestUseCase::from_settings(&settings)?;

    let (outcome, stem_prefix) = match cli.command {
        Command::Plan {
            start_year,
            end_year,
        } => {
            let start_year = start_year.unwrap_or(settings.source.start_year);
            let endpoints = use_case.planner().plan(start_year, end_year);
            info!(
                base_url = %use_case.planner().base_url(),
                endpoints = endpoints.len(),
                "Planned endpoints"
            );
            for endpoint in endpoints {
                println!("{}\t{}", endpoint.period(), endpoint.url());
            }
            return Ok(());
        }
        Command::Batch {
            start_year,
            end_year,
        } => {
            let start_year = start_year.unwrap_or(settings.source.start_year);
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {}", e);
                    std::future::pending::<()>().await;
                }
                warn!("Shutdown signal received");
            };
            let outcome = use_case
                .run_full_batch(start_year, end_year, shutdown)
                .await;
            (outcome, "soumu_press_releases_all")
        }
        Command::Month { year, month } => {
            let endpoint = match (year, month) {
                (Some(year), Some(month)) => use_case.planner().endpoint_for(year, month),
                _ => use_case.planner().current_month(),
            };
            let outcome = use_case.run_single_month(endpoint).await;
            (outcome, "soumu_press_releases_single")
        }
    };

    let summary = outcome.summary();
    let report = match outcome {
        HarvestOutcome::Harvested(report) => report,
        HarvestOutcome::Empty(report) => {
            warn!("No records were harvested; nothing to export");
            print_summary(&summary);
            return Ok(());
        }
    };
    if report.is_interrupted() {
        warn!(
            records = summary.records,
            "Exporting partial results from an interrupted run"
        );
    }

    // 3. Export
    let exporter = Exporter::from_settings(&settings.export)?;
    let storage = LocalStorage::new(&settings.export.output_dir);
    let stem = format!("{}_{}", stem_prefix, Local::now().format("%Y%m%d_%H%M%S"));

    let export = exporter.export(report.records(), &storage, &stem).await;
    for written in export.written() {
        println!("wrote {}", storage.full_path(&written.file_name).display());
    }
    for failed in export.failed() {
        if let Err(e) = &failed.result {
            eprintln!("failed {} ({}): {}", failed.file_name, failed.encoding, e);
        }
    }
    match exporter.export_summary(&summary, &storage, &stem).await {
        Some(Ok(file_name)) => println!("wrote {}", storage.full_path(&file_name).display()),
        Some(Err(e)) => eprintln!("failed summary: {}", e),
        None => {}
    }

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &press_harvester::domain::models::batch_report::BatchSummary) {
    println!(
        "attempted={} succeeded={} failed={} records={}{}",
        summary.attempted,
        summary.succeeded,
        summary.failed,
        summary.records,
        if summary.interrupted { " (interrupted)" } else { "" }
    );
}
