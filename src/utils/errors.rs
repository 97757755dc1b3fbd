// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::reqwest_engine::EngineBuildError;
use crate::infrastructure::export::ExportError;
use thiserror::Error;

/// 批处理装配错误类型
///
/// 只在启动阶段出现；单个页面的错误不会以这种形式传出。
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("无效的源站URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("抓取引擎初始化失败: {0}")]
    Engine(#[from] EngineBuildError),

    #[error("导出配置无效: {0}")]
    Export(#[from] ExportError),
}
