// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// 礼貌性限速器
///
/// 对源站的请求速率上限。所有抓取协程共享同一个实例，
/// 因此无论并发数多少，整体请求间隔都不小于配置的间隔。
#[derive(Clone)]
pub struct PolitenessLimiter {
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    interval: Duration,
}

impl PolitenessLimiter {
    /// 创建新的限速器
    ///
    /// # 参数
    ///
    /// * `interval` - 相邻请求之间的最小间隔；为零时不限速
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval)
            .map(|quota| quota.allow_burst(NonZeroU32::MIN))
            .map(|quota| Arc::new(RateLimiter::direct(quota)));
        Self { limiter, interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// 等待直到允许发出下一个请求
    pub async fn until_ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl std::fmt::Debug for PolitenessLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolitenessLimiter")
            .field("interval", &self.interval)
            .finish()
    }
}
