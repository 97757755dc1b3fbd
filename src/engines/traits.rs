// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::endpoint::Endpoint;
use crate::utils::text_encoding::CharsetSource;
use async_trait::async_trait;
use encoding_rs::Encoding;
use thiserror::Error;

/// 引擎错误类型
///
/// 所有变体都属于网络错误，只影响对应的端点。
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求超时
    #[error("Timeout fetching {url}")]
    Timeout { url: String },
    /// 非2xx响应
    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },
    /// 传输层错误
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

impl FetchError {
    /// 失败类别，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "timeout",
            FetchError::Status { .. } => "status",
            FetchError::RequestFailed(_) => "transport",
        }
    }
}

/// 抓取到的页面
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// 解码后的HTML
    pub markup: String,
    pub status_code: u16,
    pub encoding: &'static Encoding,
    pub charset_source: CharsetSource,
    /// 是否放弃了声明的字符集而改用旧编码
    pub fallback_applied: bool,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 抓取结果
pub type FetchResult = Result<FetchedPage, FetchError>;

/// 页面抓取引擎特质
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 对端点发起一次GET请求
    async fn fetch(&self, endpoint: &Endpoint) -> FetchResult;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
