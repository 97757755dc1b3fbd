// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::FetchSettings;
use crate::domain::models::endpoint::Endpoint;
use crate::engines::traits::{FetchError, FetchResult, FetchedPage, PageFetcher};
use crate::utils::text_encoding::{CharsetPolicy, TextEncodingError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// 引擎构建错误
#[derive(Error, Debug)]
pub enum EngineBuildError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Encoding(#[from] TextEncodingError),
}

/// 抓取引擎
///
/// 基于reqwest实现的HTTP抓取引擎。响应体按字节读取，再由
/// [`CharsetPolicy`] 决定解码使用的编码。
pub struct ReqwestEngine {
    client: reqwest::Client,
    charset: CharsetPolicy,
    timeout: Duration,
}

impl ReqwestEngine {
    /// 根据抓取配置创建引擎
    ///
    /// # 参数
    ///
    /// * `settings` - 超时、User-Agent 与编码配置
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestEngine)` - 创建成功
    /// * `Err(EngineBuildError)` - 客户端或编码配置无效
    pub fn new(settings: &FetchSettings) -> Result<Self, EngineBuildError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(timeout)
            .build()?;
        let charset = CharsetPolicy::new(&settings.fallback_encoding, settings.sniff_undeclared)?;

        Ok(Self {
            client,
            charset,
            timeout,
        })
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// 传输错误、超时和非2xx状态都作为 [`FetchError`] 返回。
    async fn fetch(&self, endpoint: &Endpoint) -> FetchResult {
        let url = endpoint.url().as_str();
        let start = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::RequestFailed(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::RequestFailed(e)
            }
        })?;

        let decoded = self.charset.decode(content_type.as_deref(), &body);
        let response_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            url,
            encoding = decoded.encoding.name(),
            bytes = body.len(),
            response_time_ms,
            timeout_secs = self.timeout.as_secs(),
            "Page fetched"
        );

        Ok(FetchedPage {
            markup: decoded.text,
            status_code: status.as_u16(),
            encoding: decoded.encoding,
            charset_source: decoded.source,
            fallback_applied: decoded.fallback_applied,
            response_time_ms,
        })
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
