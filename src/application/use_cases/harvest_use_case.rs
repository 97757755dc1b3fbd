// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::models::batch_report::{
    BatchReport, HarvestOutcome, HarvestProgress, PageOutcome,
};
use crate::domain::models::endpoint::Endpoint;
use crate::domain::services::extraction_service::ExtractionService;
use crate::domain::services::rate_limiting_service::PolitenessLimiter;
use crate::domain::services::url_planner::UrlPlanner;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::PageFetcher;
use crate::utils::errors::HarvestError;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 进度回调
pub type ProgressCallback = Arc<dyn Fn(&HarvestProgress) + Send + Sync>;

/// 批处理编排用例
///
/// 驱动 规划 → 抓取 → 提取 的流水线。每个端点的失败都被隔离，
/// 批处理总会继续；所有抓取共享同一个限速器。
pub struct HarvestUseCase<F: PageFetcher> {
    fetcher: Arc<F>,
    planner: UrlPlanner,
    limiter: PolitenessLimiter,
    concurrency: usize,
    progress: Option<ProgressCallback>,
}

impl HarvestUseCase<ReqwestEngine> {
    /// 根据配置装配基于reqwest的用例
    pub fn from_settings(settings: &Settings) -> Result<Self, HarvestError> {
        let fetcher = Arc::new(ReqwestEngine::new(&settings.fetch)?);
        let planner = UrlPlanner::new(&settings.source.base_url)?;
        let limiter = PolitenessLimiter::from_millis(settings.harvest.delay_ms);
        Ok(Self::new(
            fetcher,
            planner,
            limiter,
            settings.harvest.concurrency,
        ))
    }
}

impl<F: PageFetcher> HarvestUseCase<F> {
    /// 创建新的用例实例
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面抓取引擎
    /// * `planner` - URL规划器
    /// * `limiter` - 共享的礼貌性限速器
    /// * `concurrency` - 同时进行的抓取数，0 按 1 处理
    pub fn new(
        fetcher: Arc<F>,
        planner: UrlPlanner,
        limiter: PolitenessLimiter,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            planner,
            limiter,
            concurrency: concurrency.max(1),
            progress: None,
        }
    }

    /// 注册进度回调，每个端点处理完成后调用
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn planner(&self) -> &UrlPlanner {
        &self.planner
    }

    /// 抓取 `start_year` 1月到 `end_year` 12月的全部月份
    ///
    /// `shutdown` 完成时停止处理后续端点，已完成的页面保留在报告中。
    pub async fn run_full_batch(
        &self,
        start_year: i32,
        end_year: Option<i32>,
        shutdown: impl Future<Output = ()>,
    ) -> HarvestOutcome {
        let endpoints = self.planner.plan(start_year, end_year);
        info!(
            start_year,
            end_year = ?end_year,
            endpoints = endpoints.len(),
            delay_ms = self.limiter.interval().as_millis() as u64,
            concurrency = self.concurrency,
            "Starting full batch"
        );
        self.run(endpoints, shutdown).await
    }

    /// 只抓取一个月份
    pub async fn run_single_month(&self, endpoint: Endpoint) -> HarvestOutcome {
        info!(period = endpoint.period(), url = %endpoint.url(), "Starting single month");
        self.run(vec![endpoint], std::future::pending()).await
    }

    /// 按顺序处理端点序列
    ///
    /// 结果按端点顺序累积，最终由报告按日期降序排序，与完成顺序无关。
    pub async fn run(
        &self,
        endpoints: Vec<Endpoint>,
        shutdown: impl Future<Output = ()>,
    ) -> HarvestOutcome {
        let planned = endpoints.len();
        let mut report = BatchReport::new(planned);
        let mut pages = stream::iter(endpoints)
            .map(|endpoint| self.process_endpoint(endpoint))
            .buffered(self.concurrency);
        tokio::pin!(pages);
        tokio::pin!(shutdown);

        let mut index = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!(
                        processed = index,
                        planned,
                        "Harvest interrupted, keeping completed pages"
                    );
                    report.mark_interrupted();
                    break;
                }
                next = pages.next() => {
                    let Some(outcome) = next else { break };
                    index += 1;
                    let page_records = outcome.record_count();
                    let period = outcome.endpoint().period().to_string();
                    report.record(outcome);
                    let progress = HarvestProgress {
                        index,
                        planned,
                        succeeded: report.succeeded(),
                        failed: report.failed(),
                        page_records,
                    };
                    self.notify(&period, progress);
                }
            }
        }

        let report = report.finalize();
        let summary = report.summary();
        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            records = summary.records,
            interrupted = summary.interrupted,
            "Harvest finished"
        );

        let outcome = HarvestOutcome::from_report(report);
        if matches!(outcome, HarvestOutcome::Empty(_)) {
            warn!(attempted = summary.attempted, failed = summary.failed, "No records harvested");
        }
        outcome
    }

    /// 处理单个端点：等待限速 → 抓取 → 提取
    ///
    /// 不会返回错误，失败被转换为 [`PageOutcome::Failed`]。
    pub async fn process_endpoint(&self, endpoint: Endpoint) -> PageOutcome {
        self.limiter.until_ready().await;
        debug!(period = endpoint.period(), url = %endpoint.url(), "Fetching");

        match self.fetcher.fetch(&endpoint).await {
            Ok(page) => {
                if page.fallback_applied {
                    debug!(
                        period = endpoint.period(),
                        encoding = page.encoding.name(),
                        "Encoding fallback applied"
                    );
                }
                let records =
                    ExtractionService::extract(&page.markup, endpoint.url(), endpoint.period());
                PageOutcome::Extracted { endpoint, records }
            }
            Err(error) => {
                warn!(
                    period = endpoint.period(),
                    url = %endpoint.url(),
                    kind = error.kind(),
                    error = %error,
                    "Fetch failed"
                );
                PageOutcome::Failed { endpoint, error }
            }
        }
    }

    fn notify(&self, period: &str, progress: HarvestProgress) {
        info!(
            period,
            "[{}/{}] succeeded={} failed={} page_records={}",
            progress.index,
            progress.planned,
            progress.succeeded,
            progress.failed,
            progress.page_records
        );
        if let Some(callback) = &self.progress {
            callback(&progress);
        }
    }
}

#[cfg(test)]
#[path = "harvest_use_case_test.rs"]
mod tests;
