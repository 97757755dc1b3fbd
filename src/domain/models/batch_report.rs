// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::endpoint::Endpoint;
use crate::domain::models::press_release::PressRelease;
use crate::domain::services::aggregation_service::AggregationService;
use crate::engines::traits::FetchError;
use serde::Serialize;

/// 单个端点的处理结果
#[derive(Debug)]
pub enum PageOutcome {
    /// 页面获取成功（记录可能为空）
    Extracted {
        endpoint: Endpoint,
        records: Vec<PressRelease>,
    },
    /// 页面获取失败，不产生任何记录
    Failed { endpoint: Endpoint, error: FetchError },
}

impl PageOutcome {
    pub fn endpoint(&self) -> &Endpoint {
        match self {
            PageOutcome::Extracted { endpoint, .. } | PageOutcome::Failed { endpoint, .. } => {
                endpoint
            }
        }
    }

    /// 本页提取的记录数，失败时为0
    pub fn record_count(&self) -> usize {
        match self {
            PageOutcome::Extracted { records, .. } => records.len(),
            PageOutcome::Failed { .. } => 0,
        }
    }
}

/// 每个端点处理完成后的进度快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestProgress {
    /// 已处理的端点序号（从1开始）
    pub index: usize,
    pub planned: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 当前端点提取的记录数
    pub page_records: usize,
}

/// 运行摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub planned: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub records: usize,
    pub interrupted: bool,
}

/// 批处理报告
///
/// 由编排器逐页累积。记录按端点顺序追加，调用 [`BatchReport::finalize`]
/// 之后才按日期降序排列。
#[derive(Debug, Default)]
pub struct BatchReport {
    records: Vec<PressRelease>,
    succeeded: usize,
    failed: usize,
    planned: usize,
    interrupted: bool,
}

impl BatchReport {
    pub fn new(planned: usize) -> Self {
        Self {
            planned,
            ..Default::default()
        }
    }

    /// 记录一个端点的处理结果
    pub fn record(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Extracted { records, .. } => {
                self.succeeded += 1;
                self.records.extend(records);
            }
            PageOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    /// 排序并返回不可变的最终报告
    pub fn finalize(mut self) -> Self {
        AggregationService::sort_by_date_desc(&mut self.records);
        self
    }

    pub fn records(&self) -> &[PressRelease] {
        &self.records
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn planned(&self) -> usize {
        self.planned
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            planned: self.planned,
            attempted: self.attempted(),
            succeeded: self.succeeded,
            failed: self.failed,
            records: self.records.len(),
            interrupted: self.interrupted,
        }
    }
}

/// 批处理的最终结果
///
/// 整批没有任何记录时返回 `Empty`，这是唯一对外可见的失败形态。
#[derive(Debug)]
pub enum HarvestOutcome {
    Harvested(BatchReport),
    Empty(BatchReport),
}

impl HarvestOutcome {
    pub fn from_report(report: BatchReport) -> Self {
        if report.is_empty() {
            HarvestOutcome::Empty(report)
        } else {
            HarvestOutcome::Harvested(report)
        }
    }

    pub fn report(&self) -> &BatchReport {
        match self {
            HarvestOutcome::Harvested(report) | HarvestOutcome::Empty(report) => report,
        }
    }

    pub fn summary(&self) -> BatchSummary {
        self.report().summary()
    }
}
