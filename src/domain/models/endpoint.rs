// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use url::Url;

/// 抓取端点
///
/// 一个月份的报道资料索引页面，由URL规划器生成，生成后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    year: i32,
    month: u32,
    period: String,
}

impl Endpoint {
    /// 创建新的端点
    ///
    /// 期间标签按 `YYYY年M月` 的格式生成。
    pub(crate) fn new(url: Url, year: i32, month: u32) -> Self {
        Self {
            url,
            year,
            month,
            period: format!("{}年{}月", year, month),
        }
    }

    /// 目标URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 期间标签，例如 `2025年1月`
    pub fn period(&self) -> &str {
        &self.period
    }

    /// 以 (年, 月) 作为排序键
    pub fn sort_key(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.period, self.url)
    }
}
