// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::endpoint::Endpoint;
use chrono::{Datelike, Local};
use url::{ParseError, Url};

/// 2023年10月的页面没有末尾的 `m`，这是源站一次未公开的改版
const SUFFIX_EXCEPTION: (i32, u32) = (2023, 10);

/// URL规划器
///
/// 把年份区间映射为按 (年, 月) 升序排列的端点序列，每月一个。
#[derive(Debug, Clone)]
pub struct UrlPlanner {
    base_url: Url,
}

impl UrlPlanner {
    /// 创建新的规划器
    ///
    /// 无法作为基准的URL（例如 `mailto:`）会被拒绝，查询串和片段被丢弃。
    ///
    /// # 参数
    ///
    /// * `base_url` - 月度索引页面所在目录，例如 `https://www.soumu.go.jp/menu_news/s-news/`
    pub fn new(base_url: &str) -> Result<Self, ParseError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        base_url.set_query(None);
        base_url.set_fragment(None);
        // always a directory URL
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 生成从 `start_year` 1月到 `end_year` 12月的全部端点
    ///
    /// `end_year` 缺省为当前年份。未来月份不会被过滤。
    /// `start_year > end_year` 时返回空序列。
    pub fn plan(&self, start_year: i32, end_year: Option<i32>) -> Vec<Endpoint> {
        let end_year = end_year.unwrap_or_else(|| Local::now().year());
        if start_year > end_year {
            return Vec::new();
        }

        (start_year..=end_year)
            .flat_map(|year| (1..=12).map(move |month| (year, month)))
            .map(|(year, month)| self.endpoint_for(year, month))
            .collect()
    }

    /// 单个月份的端点
    pub fn endpoint_for(&self, year: i32, month: u32) -> Endpoint {
        let mut url = self.base_url.clone();
        // base is checked in new(), so the segments are always available
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&page_name(year, month));
        }
        Endpoint::new(url, year, month)
    }

    /// 当前月份的端点
    pub fn current_month(&self) -> Endpoint {
        let today = Local::now();
        self.endpoint_for(today.year(), today.month())
    }
}

/// 页面文件名：两位年份 + 两位月份 + 后缀
pub fn page_name(year: i32, month: u32) -> String {
    let short_year = year.rem_euclid(100);
    if (year, month) == SUFFIX_EXCEPTION {
        format!("{:02}{:02}.html", short_year, month)
    } else {
        format!("{:02}{:02}m.html", short_year, month)
    }
}
